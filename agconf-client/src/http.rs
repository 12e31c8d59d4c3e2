//! `ureq`-backed [`ApiClient`].
//!
//! Every request carries `Authorization: Token <token>`. Non-2xx responses
//! become [`ClientError::Status`] with the raw response body, so callers can
//! surface the server's message verbatim.

use std::time::Duration;

use serde_json::Value;

use crate::api::{ApiClient, Method, Upload};
use crate::error::ClientError;

/// Service used when no `--base-url` is given.
pub const DEFAULT_BASE_URL: &str = "https://autograder.io/";

/// Upper bound on a single request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const MULTIPART_BOUNDARY_PREFIX: &str = "agconf-form-boundary-5c1e0f9a7b3d";

/// Blocking HTTP client for the grading service API.
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Absolute URL for `url`; absolute inputs are returned unchanged.
    pub fn url(&self, url: &str) -> String {
        join_url(&self.base_url, url)
    }

    fn request(&self, method: Method, url: &str) -> ureq::Request {
        tracing::debug!(%method, %url, "request");
        self.agent
            .request(method.as_str(), url)
            .set("Authorization", &format!("Token {}", self.token))
    }
}

impl ApiClient for HttpClient {
    fn get(&self, url: &str) -> Result<Value, ClientError> {
        let url = self.url(url);
        let result = self.request(Method::Get, &url).call();
        finish(Method::Get, &url, result)
    }

    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, ClientError> {
        let url = self.url(url);
        let result = self.request(method, &url).send_json(body);
        finish(method, &url, result)
    }

    fn upload(&self, method: Method, url: &str, file: &Upload) -> Result<Value, ClientError> {
        let url = self.url(url);
        let (boundary, body) = multipart_body(file);
        let content_type = format!("multipart/form-data; boundary={boundary}");
        let result = self
            .request(method, &url)
            .set("Content-Type", &content_type)
            .send_bytes(&body);
        finish(method, &url, result)
    }
}

fn finish(
    method: Method,
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<Value, ClientError> {
    match result {
        Ok(response) => {
            let text = response.into_string().map_err(|e| ClientError::Transport {
                method,
                url: url.to_owned(),
                message: e.to_string(),
            })?;
            decode(url, &text)
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(ClientError::Status {
                method,
                url: url.to_owned(),
                status,
                body,
            })
        }
        Err(ureq::Error::Transport(transport)) => Err(ClientError::Transport {
            method,
            url: url.to_owned(),
            message: transport.to_string(),
        }),
    }
}

/// An empty body (e.g. `204 No Content`) decodes to `null`.
fn decode(url: &str, text: &str) -> Result<Value, ClientError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|source| ClientError::Decode {
        url: url.to_owned(),
        source,
    })
}

fn join_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

/// A boundary that does not occur anywhere in `contents`.
fn boundary_for(contents: &[u8]) -> String {
    let mut attempt = 0u32;
    loop {
        let boundary = format!("{MULTIPART_BOUNDARY_PREFIX}-{attempt:x}");
        let needle = boundary.as_bytes();
        if !contents.windows(needle.len()).any(|window| window == needle) {
            return boundary;
        }
        attempt += 1;
    }
}

/// The form body and the boundary it was built with.
fn multipart_body(file: &Upload) -> (String, Vec<u8>) {
    let boundary = boundary_for(&file.contents);
    let header = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file_obj\"; filename=\"{}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n",
        file.file_name.replace('"', "%22")
    );
    let footer = format!("\r\n--{boundary}--\r\n");

    let mut body = Vec::with_capacity(header.len() + file.contents.len() + footer.len());
    body.extend_from_slice(header.as_bytes());
    body.extend_from_slice(&file.contents);
    body.extend_from_slice(footer.as_bytes());
    (boundary, body)
}
