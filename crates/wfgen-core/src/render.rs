//! Rendering package descriptors through templates.
//!
//! The template engine sits behind a narrow trait so the pipeline is not
//! coupled to one expression syntax; the shipped implementation is Tera.

use crate::error::{Result, WfgenError};
use crate::package::PackageDescriptor;
use crate::paths;
use crate::template::TemplateSet;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Engine abstraction
// ---------------------------------------------------------------------------

pub trait TemplateEngine {
    fn render(&self, template: &str, context: &RenderContext<'_>) -> Result<String>;
}

pub struct TeraEngine;

impl TemplateEngine for TeraEngine {
    fn render(&self, template: &str, context: &RenderContext<'_>) -> Result<String> {
        let ctx = tera::Context::from_serialize(context)?;
        let out = tera::Tera::one_off(template, &ctx, false)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Workspace-wide values templates may need beyond the package itself.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceValues {
    /// Branch that push/pull-request triggers target.
    pub default_branch: String,
}

impl Default for WorkspaceValues {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
        }
    }
}

/// Everything a template sees. `package.path` lets templates scope trigger
/// path filters to the package's own subtree.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    pub package: &'a PackageDescriptor,
    pub workspace: &'a WorkspaceValues,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// One rendered output: filename within the workflows directory plus the
/// full file content (marker header included).
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub filename: String,
    pub content: String,
}

/// Render one package through every variant of its template set.
///
/// All-or-nothing per package: the first failing variant aborts the whole
/// package and no artifact from it survives.
pub fn render_package(
    engine: &dyn TemplateEngine,
    set: &TemplateSet,
    descriptor: &PackageDescriptor,
    workspace: &WorkspaceValues,
) -> Result<Vec<GeneratedArtifact>> {
    let context = RenderContext {
        package: descriptor,
        workspace,
    };

    let mut artifacts = Vec::with_capacity(set.variants.len());
    for variant in &set.variants {
        let body = engine
            .render(&variant.body, &context)
            .map_err(|e| WfgenError::Render {
                package: descriptor.name.clone(),
                template_type: set.template_type.clone(),
                reason: e.to_string(),
            })?;
        artifacts.push(GeneratedArtifact {
            filename: descriptor.artifact_filename(&variant.suffix),
            content: format!("{}{}", paths::generated_header(), body),
        });
    }
    Ok(artifacts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
