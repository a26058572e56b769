//! Output synchronization.
//!
//! Reconciles the workflows directory against the desired artifact set:
//! marked files with no backing package are deleted first, then the desired
//! set is written. Byte-identical content is left untouched so repeated
//! runs are a filesystem no-op. Per-file I/O failures are recorded and do
//! not abort the remaining operations.
//!
//! The caller decides whether stale files may be deleted at all. A package
//! that failed to render still backs its previous output, and its filename
//! is unknown here, so a run with failures must pass `delete_stale = false`
//! to keep that output alive.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::render::GeneratedArtifact;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<SyncFailure>,
}

impl SyncReport {
    /// Number of filesystem mutations (performed or, in a plan, pending).
    pub fn changes(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Apply the desired set to `output_dir`. Fails outright only if the
/// directory cannot be created or enumerated.
pub fn sync(
    artifacts: &[GeneratedArtifact],
    output_dir: &Path,
    delete_stale: bool,
) -> Result<SyncReport> {
    io::ensure_dir(output_dir)?;
    reconcile(artifacts, output_dir, delete_stale, true)
}

/// Compute the same report without touching the filesystem.
pub fn plan(
    artifacts: &[GeneratedArtifact],
    output_dir: &Path,
    delete_stale: bool,
) -> Result<SyncReport> {
    reconcile(artifacts, output_dir, delete_stale, false)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

fn reconcile(
    artifacts: &[GeneratedArtifact],
    output_dir: &Path,
    delete_stale: bool,
    apply: bool,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    let desired: BTreeMap<&str, &GeneratedArtifact> = artifacts
        .iter()
        .map(|a| (a.filename.as_str(), a))
        .collect();

    // Phase 1: delete stale files first, so no orphaned workflow survives
    // even if a later write fails.
    if delete_stale {
        for filename in existing_generated(output_dir)? {
            if desired.contains_key(filename.as_str()) {
                continue;
            }
            debug!(file = %filename, "stale generated file");
            if apply {
                if let Err(e) = std::fs::remove_file(output_dir.join(&filename)) {
                    warn!(file = %filename, error = %e, "failed to delete stale file");
                    report.failed.push(SyncFailure {
                        filename,
                        reason: format!("delete failed: {e}"),
                    });
                    continue;
                }
            }
            report.deleted.push(filename);
        }
    }

    // Phase 2: write the desired set.
    for (filename, artifact) in desired {
        let target = output_dir.join(filename);
        match std::fs::read_to_string(&target) {
            Ok(existing) if existing == artifact.content => {
                // Byte-identical: skip the write to keep mtimes stable.
                report.unchanged.push(filename.to_string());
                continue;
            }
            Ok(_) => {
                if apply {
                    if let Err(e) = io::atomic_write(&target, artifact.content.as_bytes()) {
                        warn!(file = %filename, error = %e, "failed to write workflow");
                        report.failed.push(SyncFailure {
                            filename: filename.to_string(),
                            reason: format!("write failed: {e}"),
                        });
                        continue;
                    }
                }
                report.updated.push(filename.to_string());
            }
            Err(_) => {
                if apply {
                    if let Err(e) = io::atomic_write(&target, artifact.content.as_bytes()) {
                        warn!(file = %filename, error = %e, "failed to write workflow");
                        report.failed.push(SyncFailure {
                            filename: filename.to_string(),
                            reason: format!("write failed: {e}"),
                        });
                        continue;
                    }
                }
                report.created.push(filename.to_string());
            }
        }
    }

    Ok(report)
}

/// Workflow files in `output_dir` that this tool owns, recognized by the
/// generated marker in their leading bytes. Hand-written workflows are
/// never candidates for deletion.
fn existing_generated(output_dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if !output_dir.is_dir() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(output_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".yml") && !name.ends_with(".yaml") {
            continue;
        }
        match std::fs::read_to_string(entry.path()) {
            Ok(content) if content.starts_with(paths::GENERATED_MARKER) => files.push(name),
            Ok(_) => {}
            Err(e) => {
                warn!(file = %name, error = %e, "failed to inspect possibly-stale file");
            }
        }
    }
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
