//! Workspace root discovery.
//!
//! A directory is a workspace root when its `pyproject.toml` declares a
//! `[tool.uv.workspace]` table. The root is resolved once at startup and
//! passed down explicitly — the pipeline itself never consults ambient state.

use crate::error::{Result, WfgenError};
use crate::paths;
use std::path::{Path, PathBuf};

pub fn is_workspace_root(dir: &Path) -> bool {
    let pyproject = paths::pyproject_path(dir);
    let Ok(raw) = std::fs::read_to_string(&pyproject) else {
        return false;
    };
    let Ok(doc) = raw.parse::<toml::Table>() else {
        return false;
    };
    doc.get("tool")
        .and_then(|t| t.get("uv"))
        .and_then(|uv| uv.get("workspace"))
        .is_some()
}

/// Walk upward from `start` until a workspace marker is found.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if is_workspace_root(&dir) {
            return Ok(dir);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }
    Err(WfgenError::WorkspaceNotFound(start.to_path_buf()))
}
