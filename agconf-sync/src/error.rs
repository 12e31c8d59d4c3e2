//! Error types for agconf-sync.

use std::path::PathBuf;

use thiserror::Error;

use agconf_client::{ClientError, Method};
use agconf_core::{ConfigError, UnknownPresetError};
use agconf_renderer::RenderError;

/// All errors that can arise from a save run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The document could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `repeat` expansion failed.
    #[error("template expansion failed: {0}")]
    Render(#[from] RenderError),

    /// Building a request body failed.
    #[error("request body JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A read of remote state failed. Fatal to the run.
    #[error("failed to fetch {url}: {source}")]
    RemoteFetch {
        url: String,
        #[source]
        source: ClientError,
    },

    /// A create or update was rejected. Fatal to the run; the server's
    /// response body is part of `source`.
    #[error("{method} {url} failed: {source}")]
    RemoteWrite {
        method: Method,
        url: String,
        #[source]
        source: ClientError,
    },

    /// A suite or command names a file, pattern or image that does not exist.
    #[error("{entity}: {kind} \"{name}\" does not exist")]
    UnresolvedReference {
        kind: &'static str,
        name: String,
        entity: String,
    },

    /// A feedback reference names an undeclared preset.
    #[error("{entity}: {source}")]
    UnknownPreset {
        entity: String,
        #[source]
        source: UnknownPresetError,
    },

    /// Reading a local instructor file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote object came back without a usable `pk`.
    #[error("object returned by {url} has no pk")]
    MissingPk { url: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
