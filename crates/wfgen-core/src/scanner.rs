//! Workspace scanning.
//!
//! Walks the workspace tree, finds every directory carrying a
//! `pyproject.toml` with a `[tool.wfgen]` section, and yields validated
//! package descriptors. One package's bad metadata never hides the others;
//! failures are collected alongside the descriptors and attributed to the
//! offending package.

use crate::config::WorkspaceConfig;
use crate::error::{Result, WfgenError};
use crate::package::{PackageDescriptor, PackageSection};
use crate::paths;
use std::path::Path;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PackageFailure {
    /// Package identity: workspace-relative path of the offending directory.
    pub package: String,
    pub error: WfgenError,
}

#[derive(Debug)]
pub struct ScanOutcome {
    /// Valid descriptors, sorted lexicographically by path. Inert packages
    /// (`generate = false`) are included; downstream stages filter them.
    pub descriptors: Vec<PackageDescriptor>,
    pub failures: Vec<PackageFailure>,
}

// ---------------------------------------------------------------------------
// scan
// ---------------------------------------------------------------------------

/// Walk the tree rooted at `root` and collect package descriptors.
///
/// Hidden directories and `__pycache__` subtrees are never entered.
/// Unreadable subtrees are skipped with a warning; a root that cannot be
/// read at all is fatal.
pub fn scan(root: &Path, workspace: &WorkspaceConfig) -> Result<ScanOutcome> {
    let mut descriptors = Vec::new();
    let mut failures = Vec::new();

    // walkdir attributes a read-dir failure to the children, so an
    // unreadable root must be caught before the walk starts.
    std::fs::read_dir(root)?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if !paths::pyproject_path(dir).is_file() {
            continue;
        }

        let rel = relative_path(dir, root);
        match read_package(dir, &rel, workspace) {
            Ok(Some(descriptor)) => descriptors.push(descriptor),
            Ok(None) => {}
            Err(error) => failures.push(PackageFailure { package: rel, error }),
        }
    }

    // Deterministic emission order: required for reproducible output.
    descriptors.sort_by(|a, b| a.path.cmp(&b.path));
    failures.sort_by(|a, b| a.package.cmp(&b.package));

    Ok(ScanOutcome {
        descriptors,
        failures,
    })
}

fn is_skipped(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "__pycache__"
}

fn relative_path(dir: &Path, root: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => dir.to_string_lossy().into_owned(),
    }
}

// ---------------------------------------------------------------------------
// Per-directory parse
// ---------------------------------------------------------------------------

/// Parse one candidate directory. `Ok(None)` means "not a codegen-managed
/// package" (no `[tool.wfgen]` section) and is not an error.
fn read_package(
    dir: &Path,
    rel: &str,
    workspace: &WorkspaceConfig,
) -> Result<Option<PackageDescriptor>> {
    let raw = std::fs::read_to_string(paths::pyproject_path(dir))?;
    let doc: toml::Table = raw.parse().map_err(|e: toml::de::Error| {
        WfgenError::Validation {
            package: rel.to_string(),
            reason: format!("invalid pyproject.toml: {e}"),
        }
    })?;

    let Some(section) = doc.get("tool").and_then(|t| t.get(paths::TOOL_SECTION)) else {
        return Ok(None);
    };

    let section: PackageSection =
        section
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| WfgenError::Validation {
                package: rel.to_string(),
                reason: format!("invalid [tool.{}] section: {e}", paths::TOOL_SECTION),
            })?;

    let name = doc
        .get("project")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| rel.to_string())
        });

    let descriptor = section.merge(workspace, &name, rel)?;
    Ok(Some(descriptor))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
