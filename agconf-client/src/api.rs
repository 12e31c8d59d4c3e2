//! The [`ApiClient`] capability consumed by the reconciler.
//!
//! Implementations only need to provide single requests; [`ApiClient::get_all`]
//! follows pagination on top of [`ApiClient::get`].

use std::fmt;

use serde_json::Value;

use crate::error::ClientError;

/// HTTP methods used against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file sent as the `file_obj` field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Authenticated access to the grading service.
///
/// URLs may be relative to the client's base URL (`/api/...`) or absolute,
/// as returned in a page's `next` link.
pub trait ApiClient {
    /// `GET` a single resource or one page of a collection.
    fn get(&self, url: &str) -> Result<Value, ClientError>;

    /// Send `body` as JSON and return the resulting object.
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, ClientError>;

    /// Send `file` as multipart form data and return the resulting object.
    fn upload(&self, method: Method, url: &str, file: &Upload) -> Result<Value, ClientError>;

    /// Fetch every item of a collection, following `next` links.
    ///
    /// A bare JSON array is a complete, single-page collection.
    fn get_all(&self, url: &str) -> Result<Vec<Value>, ClientError> {
        let mut items = Vec::new();
        let mut next = Some(url.to_owned());
        while let Some(page_url) = next.take() {
            match self.get(&page_url)? {
                Value::Array(page) => items.extend(page),
                Value::Object(mut page) => {
                    match page.remove("results") {
                        Some(Value::Array(results)) => items.extend(results),
                        _ => return Err(ClientError::MalformedPage { url: page_url }),
                    }
                    next = match page.remove("next") {
                        Some(Value::String(link)) if !link.is_empty() => Some(link),
                        _ => None,
                    };
                    if let Some(link) = &next {
                        tracing::debug!(next = %link, "following page link");
                    }
                }
                _ => return Err(ClientError::MalformedPage { url: page_url }),
            }
        }
        Ok(items)
    }

    fn post(&self, url: &str, body: &Value) -> Result<Value, ClientError> {
        self.send(Method::Post, url, body)
    }

    fn patch(&self, url: &str, body: &Value) -> Result<Value, ClientError> {
        self.send(Method::Patch, url, body)
    }
}
