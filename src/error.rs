use std::path::PathBuf;

use thiserror::Error;

/// Every failure is terminal: the first one aborts the remaining steps.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{tool} was not found on PATH. {hint}")]
    MissingDependency { tool: String, hint: String },

    #[error("failed to launch container '{name}': {reason}")]
    ContainerLaunch { name: String, reason: String },

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to launch '{program}': {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0:#}")]
    Config(#[from] anyhow::Error),
}

impl BootstrapError {
    pub fn download(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Download {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn container(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::ContainerLaunch {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;
