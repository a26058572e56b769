//! The full scan → resolve → render → sync cycle.
//!
//! One call per invocation, a pure function of (workspace root, filesystem
//! contents). In default mode per-package failures are collected and the
//! rest of the workspace still generates; in strict mode the first failure
//! aborts before any output synchronization.

use crate::config::WorkspaceConfig;
use crate::error::{Result, WfgenError};
use crate::render::{self, TemplateEngine, TeraEngine, WorkspaceValues};
use crate::scanner;
use crate::sync::{self, SyncReport};
use crate::template::TemplateResolver;
use crate::paths;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Options / summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Abort on the first per-package error (also enabled by workspace
    /// config).
    pub strict: bool,
    /// Report what would change without writing or deleting anything.
    pub check: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    pub package: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// All discovered descriptors, enabled or not.
    pub discovered: usize,
    /// Packages that rendered successfully.
    pub generated: usize,
    pub failures: Vec<FailureSummary>,
    pub sync: SyncReport,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failures.is_empty() && !self.sync.has_failures()
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn run(root: &Path, options: &RunOptions) -> Result<RunSummary> {
    let workspace = WorkspaceConfig::load(root)?;
    let strict = options.strict || workspace.strict;

    let outcome = scanner::scan(root, &workspace)?;
    let discovered = outcome.descriptors.len();

    let mut failures: Vec<FailureSummary> = Vec::new();
    for failure in outcome.failures {
        if strict {
            return Err(failure.error);
        }
        failures.push(FailureSummary {
            package: failure.package,
            reason: failure.error.to_string(),
        });
    }

    let resolver = TemplateResolver::new(root.join(&workspace.template_dir));
    let engine = TeraEngine;
    let values = WorkspaceValues::default();

    let mut artifacts = Vec::new();
    let mut generated = 0usize;
    // Filename -> owning package path. Normalization can map two distinct
    // paths to the same filename; the second claimant fails rather than
    // silently shadowing the first.
    let mut claimed: BTreeMap<String, String> = BTreeMap::new();

    for descriptor in outcome.descriptors.iter().filter(|d| d.generate) {
        let result = resolver
            .resolve(&descriptor.template_type)
            .and_then(|set| render_one(&engine, &set, descriptor, &values));
        match result {
            Ok(mut package_artifacts) => {
                if let Some((filename, owner)) = package_artifacts
                    .iter()
                    .find_map(|a| claimed.get_key_value(&a.filename))
                {
                    let error = WfgenError::Validation {
                        package: descriptor.path.clone(),
                        reason: format!(
                            "workflow filename '{filename}' collides with package '{owner}'"
                        ),
                    };
                    if strict {
                        return Err(error);
                    }
                    failures.push(FailureSummary {
                        package: descriptor.path.clone(),
                        reason: error.to_string(),
                    });
                    continue;
                }
                for artifact in &package_artifacts {
                    claimed.insert(artifact.filename.clone(), descriptor.path.clone());
                }
                artifacts.append(&mut package_artifacts);
                generated += 1;
            }
            Err(error) => {
                if strict {
                    return Err(error);
                }
                failures.push(FailureSummary {
                    package: descriptor.name.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    // A failed package is still configured to generate, so its previous
    // output is not stale; with its filename unknowable, no deletion is
    // safe until the whole workspace resolves cleanly.
    let delete_stale = failures.is_empty();

    let output_dir = paths::workflows_dir(root);
    let sync_report = if options.check {
        sync::plan(&artifacts, &output_dir, delete_stale)?
    } else {
        sync::sync(&artifacts, &output_dir, delete_stale)?
    };

    Ok(RunSummary {
        discovered,
        generated,
        failures,
        sync: sync_report,
    })
}

fn render_one(
    engine: &dyn TemplateEngine,
    set: &crate::template::TemplateSet,
    descriptor: &crate::package::PackageDescriptor,
    values: &WorkspaceValues,
) -> Result<Vec<render::GeneratedArtifact>> {
    render::render_package(engine, set, descriptor, values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
