//! Error types for agconf-client.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::Method;

/// All errors that can arise from token discovery or an API request.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The token file could not be found on the search path.
    #[error("requested token file {filename} not found")]
    TokenNotFound { filename: PathBuf },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// Reading a local file (token, upload) failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced an HTTP response.
    #[error("{method} {url}: {message}")]
    Transport {
        method: Method,
        url: String,
        message: String,
    },

    /// The server answered with a non-2xx status. `body` is the raw payload.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A collection response was neither a list nor a `{results, next}` page.
    #[error("unexpected collection payload from {url}")]
    MalformedPage { url: String },
}

impl ClientError {
    /// HTTP status of a rejected request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ClientError {
    ClientError::Io {
        path: path.into(),
        source,
    }
}
