//! Error types for agconf-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading, validating, or saving a project
/// document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse project document at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document did not exist at the expected path.
    #[error("project document not found at {path}")]
    DocumentNotFound { path: PathBuf },

    /// Refused to overwrite an existing document.
    #[error("refusing to overwrite existing project document at {path}")]
    AlreadyExists { path: PathBuf },

    /// Two entries at the same level share an identity key.
    #[error("duplicate {level} \"{name}\" in project document")]
    DuplicateName { level: &'static str, name: String },
}

/// A feedback preset name that is neither built in nor declared by the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feedback preset \"{name}\" not found")]
pub struct UnknownPresetError {
    pub name: String,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
