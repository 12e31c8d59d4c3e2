//! Read-only view of a project's suites, cases and commands.

use serde::Serialize;
use serde_json::Value;

use agconf_client::ApiClient;

use crate::error::SyncError;
use crate::index::pk_of;

/// One node of the test tree: a suite, case or command with its `pk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestNode {
    pub name: String,
    pub pk: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TestNode>,
}

/// Raw suite objects of `project_pk`, each embedding its cases and commands.
pub fn fetch_suites(client: &dyn ApiClient, project_pk: i64) -> Result<Vec<Value>, SyncError> {
    let url = format!("/api/projects/{project_pk}/ag_test_suites/");
    client
        .get_all(&url)
        .map_err(|source| SyncError::RemoteFetch { url, source })
}

/// Suites → cases → commands, in the order the service lists them.
pub fn test_tree(suites: &[Value]) -> Vec<TestNode> {
    suites
        .iter()
        .map(|suite| node(suite, Some(("ag_test_cases", Some("ag_test_commands")))))
        .collect()
}

fn node(item: &Value, children: Option<(&str, Option<&str>)>) -> TestNode {
    let children = match children {
        Some((field, grandchildren)) => item
            .get(field)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|child| node(child, grandchildren.map(|g| (g, None))))
                    .collect()
            })
            .unwrap_or_default(),
        None => vec![],
    };
    TestNode {
        name: item
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        pk: pk_of(item).unwrap_or_default(),
        children,
    }
}
