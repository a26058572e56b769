use crate::error::Result;
use crate::package::Typechecker;
use crate::paths;
use serde::Deserialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// WorkspaceConfig
// ---------------------------------------------------------------------------

/// Workspace-level settings, read once per run from `[tool.wfgen]` in the
/// root `pyproject.toml`. Every field has a safe default, so a workspace
/// without the section still works.
///
/// The root section may also hold package keys (the workspace root can
/// itself be a generated package), so unknown keys are not an error here.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    /// Where template resources are looked up, relative to the root.
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
    /// Template type used when a package omits `template_type`.
    #[serde(default = "default_template_type")]
    pub default_template_type: String,
    /// Workspace-wide typechecker default (package value overrides).
    #[serde(default)]
    pub typechecker: Option<Typechecker>,
    /// Abort the whole run on the first per-package error.
    #[serde(default)]
    pub strict: bool,
}

fn default_template_dir() -> String {
    paths::DEFAULT_TEMPLATE_DIR.to_string()
}

fn default_template_type() -> String {
    paths::DEFAULT_TEMPLATE_TYPE.to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            default_template_type: default_template_type(),
            typechecker: None,
            strict: false,
        }
    }
}

impl WorkspaceConfig {
    /// Load from the workspace root. A missing file or missing section
    /// yields the defaults; a malformed section is a fatal setup error.
    pub fn load(root: &Path) -> Result<Self> {
        let pyproject = paths::pyproject_path(root);
        if !pyproject.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&pyproject)?;
        let doc: toml::Table = raw.parse()?;
        let Some(section) = doc
            .get("tool")
            .and_then(|t| t.get(paths::TOOL_SECTION))
            .and_then(|s| s.as_table())
        else {
            return Ok(Self::default());
        };
        let cfg = toml::Value::Table(section.clone()).try_into()?;
        Ok(cfg)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
