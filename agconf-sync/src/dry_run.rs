//! Plan mode: an [`ApiClient`] wrapper that reads but never writes.
//!
//! Creates return a placeholder object with a negative `pk` so the
//! reconciler can keep walking into its children. Reads below a placeholder
//! (any URL with a negative path segment) return an empty collection without
//! touching the network.

use std::cell::Cell;

use serde_json::{Map, Value};

use agconf_client::{ApiClient, ClientError, Method, Upload};

pub struct DryRunClient<'a> {
    inner: &'a dyn ApiClient,
    last_placeholder: Cell<i64>,
}

impl<'a> DryRunClient<'a> {
    pub fn new(inner: &'a dyn ApiClient) -> Self {
        Self {
            inner,
            last_placeholder: Cell::new(0),
        }
    }

    fn placeholder(&self, url: &str, mut object: Map<String, Value>) -> Value {
        let pk = self.last_placeholder.get() - 1;
        self.last_placeholder.set(pk);
        object.insert("pk".to_owned(), Value::from(pk));
        if url.ends_with("/ag_test_suites/") {
            object.insert("ag_test_cases".to_owned(), Value::Array(vec![]));
        } else if url.ends_with("/ag_test_cases/") {
            object.insert("ag_test_commands".to_owned(), Value::Array(vec![]));
        }
        Value::Object(object)
    }
}

/// Whether `url` addresses something under a placeholder object.
pub fn is_placeholder_url(url: &str) -> bool {
    url.split('/')
        .any(|segment| segment.parse::<i64>().is_ok_and(|n| n < 0))
}

impl ApiClient for DryRunClient<'_> {
    fn get(&self, url: &str) -> Result<Value, ClientError> {
        if is_placeholder_url(url) {
            tracing::debug!(url, "[dry-run] empty collection under placeholder");
            return Ok(Value::Array(vec![]));
        }
        self.inner.get(url)
    }

    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, ClientError> {
        tracing::debug!("[dry-run] would {method} {url}");
        let object = body.as_object().cloned().unwrap_or_default();
        match method {
            Method::Post => Ok(self.placeholder(url, object)),
            _ => Ok(Value::Object(object)),
        }
    }

    fn upload(&self, method: Method, url: &str, file: &Upload) -> Result<Value, ClientError> {
        tracing::debug!("[dry-run] would {method} {url} ({})", file.file_name);
        let mut object = Map::new();
        object.insert("name".to_owned(), Value::String(file.file_name.clone()));
        match method {
            Method::Post => Ok(self.placeholder(url, object)),
            _ => Ok(Value::Object(object)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct NoNetwork;

    impl ApiClient for NoNetwork {
        fn get(&self, url: &str) -> Result<Value, ClientError> {
            Ok(json!([{"pk": 1, "name": url}]))
        }

        fn send(&self, method: Method, url: &str, _body: &Value) -> Result<Value, ClientError> {
            panic!("unexpected {method} {url}")
        }

        fn upload(&self, method: Method, url: &str, _file: &Upload) -> Result<Value, ClientError> {
            panic!("unexpected {method} {url}")
        }
    }

    #[test]
    fn creates_get_distinct_negative_pks() {
        let client = DryRunClient::new(&NoNetwork);
        let a = client.post("/api/projects/3/ag_test_suites/", &json!({"name": "A"})).unwrap();
        let b = client.post("/api/projects/3/ag_test_suites/", &json!({"name": "B"})).unwrap();
        assert_eq!(a["pk"], -1);
        assert_eq!(b["pk"], -2);
        assert_eq!(a["ag_test_cases"], json!([]));
        assert_eq!(a["name"], "A");
    }

    #[test]
    fn reads_under_placeholder_are_empty() {
        let client = DryRunClient::new(&NoNetwork);
        assert_eq!(client.get_all("/api/projects/-1/instructor_files/").unwrap(), Vec::<serde_json::Value>::new());
        assert_eq!(client.get_all("/api/projects/7/instructor_files/").unwrap().len(), 1);
    }

    #[test]
    fn case_placeholder_carries_empty_commands() {
        let client = DryRunClient::new(&NoNetwork);
        let case = client.post("/api/ag_test_suites/-1/ag_test_cases/", &json!({"name": "C"})).unwrap();
        assert_eq!(case["ag_test_commands"], json!([]));
        let upload = client
            .upload(
                Method::Put,
                "/api/instructor_files/5/content/",
                &Upload {
                    file_name: "a.txt".to_owned(),
                    contents: vec![],
                },
            )
            .unwrap();
        assert_eq!(upload["name"], "a.txt");
    }
}
