use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WfgenError {
    #[error("workspace root not found: no pyproject.toml with [tool.uv.workspace] at or above {0}")]
    WorkspaceNotFound(PathBuf),

    #[error("{0} is not a workspace root (missing [tool.uv.workspace] in pyproject.toml)")]
    NotAWorkspaceRoot(PathBuf),

    #[error("invalid configuration for package '{package}': {reason}")]
    Validation { package: String, reason: String },

    #[error("no templates found for type '{template_type}' in {dir}")]
    TemplateNotFound { template_type: String, dir: PathBuf },

    #[error("failed to render template '{template_type}' for package '{package}': {reason}")]
    Render {
        package: String,
        template_type: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Template(#[from] tera::Error),
}

pub type Result<T> = std::result::Result<T, WfgenError>;
