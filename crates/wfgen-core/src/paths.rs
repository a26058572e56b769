use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Conventions
// ---------------------------------------------------------------------------

pub const PYPROJECT_FILE: &str = "pyproject.toml";
pub const TOOL_SECTION: &str = "wfgen";

pub const DEFAULT_TEMPLATE_DIR: &str = ".github/workflow-templates";
pub const DEFAULT_TEMPLATE_TYPE: &str = "default";
pub const WORKFLOWS_DIR: &str = ".github/workflows";

pub const TEMPLATE_EXTENSION: &str = "template.yml";

/// First line of every file this tool owns. The synchronizer only ever
/// deletes files carrying this marker.
pub const GENERATED_MARKER: &str = "# This file was automatically generated by wfgen";

pub fn generated_header() -> String {
    format!("{GENERATED_MARKER}\n# Do not edit this file manually - changes will be overwritten\n\n")
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn pyproject_path(dir: &Path) -> PathBuf {
    dir.join(PYPROJECT_FILE)
}

pub fn workflows_dir(root: &Path) -> PathBuf {
    root.join(WORKFLOWS_DIR)
}

pub fn template_path(template_dir: &Path, template_type: &str) -> PathBuf {
    template_dir.join(format!("{template_type}.{TEMPLATE_EXTENSION}"))
}

// ---------------------------------------------------------------------------
// Workflow filenames
// ---------------------------------------------------------------------------

static UNSAFE_RE: OnceLock<Regex> = OnceLock::new();

fn unsafe_re() -> &'static Regex {
    UNSAFE_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap())
}

/// Collapse a workspace-relative package path into a single filename
/// component: separators become `-`, anything else unsafe is dropped.
pub fn normalize_identity(path: &str) -> String {
    let flat = path.replace(['/', '\\'], "-");
    unsafe_re().replace_all(&flat, "").into_owned()
}

/// Filename for one generated artifact. `identity` is the normalized package
/// identity; `suffix` is empty for the main template variant. Normalization
/// is not injective, so the pipeline checks claimed filenames for collisions.
pub fn workflow_filename(template_type: &str, suffix: &str, identity: &str) -> String {
    if suffix.is_empty() {
        format!("{template_type}-{identity}.yml")
    } else {
        format!("{template_type}-{suffix}-{identity}.yml")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
