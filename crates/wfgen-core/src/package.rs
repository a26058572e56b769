use crate::config::WorkspaceConfig;
use crate::error::{Result, WfgenError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Typechecker
// ---------------------------------------------------------------------------

/// Recognized typecheckers. Anything else in the metadata is a validation
/// error, never silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Typechecker {
    Mypy,
    Ty,
}

impl Typechecker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Typechecker::Mypy => "mypy",
            Typechecker::Ty => "ty",
        }
    }
}

// ---------------------------------------------------------------------------
// CustomStep
// ---------------------------------------------------------------------------

/// One step from the embedded `custom_steps` YAML list. `name` is required;
/// the rest is optional. Rendered between the install phase and the
/// standard test phase, in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomStep {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

// ---------------------------------------------------------------------------
// PackageSection (raw metadata)
// ---------------------------------------------------------------------------

/// The `[tool.wfgen]` section of a package's `pyproject.toml`, as written on
/// disk. Booleans must be literal TOML booleans; type mismatches surface as
/// deserialization errors attributed to the package by the scanner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSection {
    #[serde(default)]
    pub generate: bool,
    #[serde(default)]
    pub template_type: Option<String>,
    #[serde(default)]
    pub generate_standard_pytest_step: Option<bool>,
    #[serde(default)]
    pub typechecker: Option<Typechecker>,
    /// A YAML document (list of steps) embedded as a string.
    #[serde(default)]
    pub custom_steps: Option<String>,
}

impl PackageSection {
    /// Merge this section with workspace defaults into an immutable
    /// descriptor. Precedence is package value, then workspace default,
    /// then built-in default, field by field.
    pub fn merge(
        self,
        workspace: &WorkspaceConfig,
        name: &str,
        path: &str,
    ) -> Result<PackageDescriptor> {
        let template_type = self
            .template_type
            .unwrap_or_else(|| workspace.default_template_type.clone());

        if self.generate && template_type.trim().is_empty() {
            return Err(WfgenError::Validation {
                package: name.to_string(),
                reason: "generate = true but template_type is empty and the workspace \
                         sets no default_template_type"
                    .to_string(),
            });
        }

        // Inert packages skip the nested parse entirely; their metadata is
        // never consumed downstream.
        let custom_steps = if self.generate {
            parse_custom_steps(self.custom_steps.as_deref()).map_err(|e| {
                WfgenError::Validation {
                    package: name.to_string(),
                    reason: format!("invalid custom_steps YAML: {e}"),
                }
            })?
        } else {
            Vec::new()
        };

        Ok(PackageDescriptor {
            package_name: name.replace('-', "_"),
            name: name.to_string(),
            path: path.to_string(),
            generate: self.generate,
            template_type,
            generate_standard_test_step: self.generate_standard_pytest_step.unwrap_or(true),
            typechecker: self.typechecker.or(workspace.typechecker),
            custom_steps,
        })
    }
}

/// Second-stage parse of the embedded YAML list. An empty or absent string
/// is an empty sequence; a step without `name` is rejected.
fn parse_custom_steps(
    raw: Option<&str>,
) -> std::result::Result<Vec<CustomStep>, serde_yaml::Error> {
    match raw {
        Some(s) if !s.trim().is_empty() => {
            let steps: Option<Vec<CustomStep>> = serde_yaml::from_str(s)?;
            Ok(steps.unwrap_or_default())
        }
        _ => Ok(Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// PackageDescriptor
// ---------------------------------------------------------------------------

/// One discovered package, fully resolved against workspace defaults.
/// Constructed during scanning, immutable thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDescriptor {
    pub name: String,
    /// Importable module name: `name` with `-` replaced by `_`.
    pub package_name: String,
    /// Directory path relative to the workspace root; `.` for the root
    /// itself. Unique across a run.
    pub path: String,
    pub generate: bool,
    pub template_type: String,
    pub generate_standard_test_step: bool,
    pub typechecker: Option<Typechecker>,
    pub custom_steps: Vec<CustomStep>,
}

impl PackageDescriptor {
    /// Normalized, collision-free identity used in generated filenames.
    /// Derived from the package path; the workspace root package falls back
    /// to its package name.
    pub fn identity(&self) -> String {
        if self.path == "." {
            paths::normalize_identity(&self.package_name)
        } else {
            paths::normalize_identity(&self.path)
        }
    }

    pub fn artifact_filename(&self, suffix: &str) -> String {
        paths::workflow_filename(&self.template_type, suffix, &self.identity())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
