//! Name-keyed lookup tables over remote objects.
//!
//! One [`ResourceIndex`] holds the objects of a single hierarchy level under a
//! single parent (the suites of one project, the commands of one test case).
//! Entries are only ever added, never replaced or removed.

use indexmap::IndexMap;
use serde_json::Value;

use agconf_client::ApiClient;

use crate::error::SyncError;

/// The identifier of a remote object, if it carries an integer `pk`.
pub fn pk_of(item: &Value) -> Option<i64> {
    item.get("pk").and_then(Value::as_i64)
}

#[derive(Debug, Clone)]
pub struct ResourceIndex {
    kind: &'static str,
    key_field: &'static str,
    items: IndexMap<String, Value>,
}

impl ResourceIndex {
    /// An empty index of `kind` objects keyed by `key_field`.
    pub fn new(kind: &'static str, key_field: &'static str) -> Self {
        Self {
            kind,
            key_field,
            items: IndexMap::new(),
        }
    }

    /// Key `items` by `key_field`.
    ///
    /// If two items share a key, the first one listed wins. Items without a
    /// string key are skipped.
    pub fn from_items(kind: &'static str, key_field: &'static str, items: Vec<Value>) -> Self {
        let mut index = Self::new(kind, key_field);
        for item in items {
            let Some(key) = item.get(key_field).and_then(Value::as_str).map(str::to_owned) else {
                tracing::debug!(kind, key_field, "skipping remote object without key");
                continue;
            };
            if index.items.contains_key(&key) {
                tracing::warn!(kind, name = %key, "remote holds duplicate objects; using the first");
                continue;
            }
            index.items.insert(key, item);
        }
        index
    }

    /// Fetch every page of the collection at `url` and key it.
    pub fn fetch(
        client: &dyn ApiClient,
        url: &str,
        kind: &'static str,
        key_field: &'static str,
    ) -> Result<Self, SyncError> {
        let items = client.get_all(url).map_err(|source| SyncError::RemoteFetch {
            url: url.to_owned(),
            source,
        })?;
        tracing::debug!(kind, url, count = items.len(), "fetched remote collection");
        Ok(Self::from_items(kind, key_field, items))
    }

    /// Key the child array `field` embedded in `parent`. A missing or
    /// non-array field yields an empty index.
    pub fn from_embedded(
        parent: &Value,
        field: &str,
        kind: &'static str,
        key_field: &'static str,
    ) -> Self {
        let items = match parent.get(field) {
            Some(Value::Array(items)) => items.clone(),
            _ => vec![],
        };
        Self::from_items(kind, key_field, items)
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Record a newly created object. An existing entry under `key` is kept.
    pub fn insert(&mut self, key: impl Into<String>, item: Value) {
        self.items.entry(key.into()).or_insert(item);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
