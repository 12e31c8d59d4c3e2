//! # agconf-client
//!
//! Authenticated access to the grading service: token discovery, the
//! [`ApiClient`] capability, and its `ureq` implementation [`HttpClient`].

pub mod api;
pub mod error;
pub mod http;
pub mod token;

pub use api::{ApiClient, Method, Upload};
pub use error::ClientError;
pub use http::{HttpClient, DEFAULT_BASE_URL};
pub use token::{find_token, find_token_at, DEFAULT_TOKEN_FILE};
