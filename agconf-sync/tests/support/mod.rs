//! In-memory stand-in for the grading service.
//!
//! Objects live in flat collections keyed by the URL they were created at.
//! Suites and test cases are served with their children embedded, the way
//! the real service returns them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;

use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};

use agconf_client::{ApiClient, ClientError, Method, Upload};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub url: String,
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Stored {
    collection: String,
    object: Map<String, Value>,
}

#[derive(Default)]
struct State {
    next_pk: i64,
    courses: Vec<Value>,
    objects: Vec<Stored>,
    calls: Vec<Call>,
    fail_on: Option<(Method, String)>,
    page_size: Option<usize>,
}

pub struct FakeAutograder {
    state: RefCell<State>,
}

pub const COURSE_PK: i64 = 1;

impl FakeAutograder {
    /// A service holding the course `EECS 280 / Fall / 2024` and nothing else.
    pub fn new() -> Self {
        let state = State {
            next_pk: 100,
            courses: vec![json!({
                "pk": COURSE_PK,
                "name": "EECS 280",
                "semester": "Fall",
                "year": 2024,
            })],
            ..State::default()
        };
        Self {
            state: RefCell::new(state),
        }
    }

    /// Add another course; returns its pk.
    pub fn add_course(&self, name: &str, semester: &str, year: i64) -> i64 {
        let mut state = self.state.borrow_mut();
        let pk = state.allocate();
        state
            .courses
            .push(json!({"pk": pk, "name": name, "semester": semester, "year": year}));
        pk
    }

    /// Serve collections in pages of `size` items.
    pub fn paginate(self, size: usize) -> Self {
        self.state.borrow_mut().page_size = Some(size);
        self
    }

    /// Reject the first `method` request whose URL starts with `url_prefix`.
    pub fn fail_on(&self, method: Method, url_prefix: &str) {
        self.state.borrow_mut().fail_on = Some((method, url_prefix.to_owned()));
    }

    /// Seed an object into the collection at `collection`; returns its pk.
    pub fn seed(&self, collection: &str, object: Value) -> i64 {
        let mut state = self.state.borrow_mut();
        let pk = state.allocate();
        let mut object = object.as_object().cloned().unwrap_or_default();
        object.insert("pk".to_owned(), json!(pk));
        state.objects.push(Stored {
            collection: collection.to_owned(),
            object,
        });
        pk
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Every non-GET request, in order.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.method != Method::Get)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Stored objects of `collection`, children embedded.
    pub fn list(&self, collection: &str) -> Vec<Value> {
        self.state.borrow().list(collection)
    }

    pub fn object(&self, pk: i64) -> Option<Value> {
        let state = self.state.borrow();
        state
            .objects
            .iter()
            .find(|stored| stored.object.get("pk") == Some(&json!(pk)))
            .map(|stored| state.render(stored))
    }

    fn check_failure(&self, method: Method, url: &str) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        let matches = state
            .fail_on
            .as_ref()
            .is_some_and(|(m, prefix)| *m == method && url.starts_with(prefix.as_str()));
        if matches {
            state.fail_on = None;
            return Err(ClientError::Status {
                method,
                url: url.to_owned(),
                status: 400,
                body: r#"{"cmd":["This field may not be blank."]}"#.to_owned(),
            });
        }
        Ok(())
    }

    fn log(&self, method: Method, url: &str, body: Value) {
        self.state.borrow_mut().calls.push(Call {
            method,
            url: url.to_owned(),
            body,
        });
    }
}

impl State {
    fn allocate(&mut self) -> i64 {
        self.next_pk += 1;
        self.next_pk
    }

    fn list(&self, collection: &str) -> Vec<Value> {
        self.objects
            .iter()
            .filter(|stored| stored.collection == collection)
            .map(|stored| self.render(stored))
            .collect()
    }

    fn render(&self, stored: &Stored) -> Value {
        let mut object = stored.object.clone();
        let pk = object.get("pk").and_then(Value::as_i64).unwrap_or_default();
        if stored.collection.ends_with("/ag_test_suites/") {
            let cases = self.list(&format!("/api/ag_test_suites/{pk}/ag_test_cases/"));
            object.insert("ag_test_cases".to_owned(), Value::Array(cases));
        } else if stored.collection.ends_with("/ag_test_cases/") {
            let commands = self.list(&format!("/api/ag_test_cases/{pk}/ag_test_commands/"));
            object.insert("ag_test_commands".to_owned(), Value::Array(commands));
        }
        Value::Object(object)
    }

    fn find_mut(&mut self, pk: i64) -> Option<&mut Stored> {
        self.objects
            .iter_mut()
            .find(|stored| stored.object.get("pk") == Some(&json!(pk)))
    }

    fn create(&mut self, collection: &str, fields: Map<String, Value>) -> Value {
        let pk = self.allocate();
        let mut object = fields;
        object.insert("pk".to_owned(), json!(pk));
        let stored = Stored {
            collection: collection.to_owned(),
            object,
        };
        let rendered = self.render(&stored);
        self.objects.push(stored);
        rendered
    }
}

fn not_found(method: Method, url: &str) -> ClientError {
    ClientError::Status {
        method,
        url: url.to_owned(),
        status: 404,
        body: r#"{"detail":"Not found."}"#.to_owned(),
    }
}

/// The integer segment of `/api/<kind>/<pk>/...`.
fn pk_segment(url: &str) -> Option<i64> {
    url.split('/').nth(3).and_then(|segment| segment.parse().ok())
}

impl ApiClient for FakeAutograder {
    fn get(&self, url: &str) -> Result<Value, ClientError> {
        self.log(Method::Get, url, Value::Null);
        self.check_failure(Method::Get, url)?;
        let state = self.state.borrow();

        if let Some(rest) = url.strip_prefix("/api/course/") {
            let parts: Vec<String> = rest
                .trim_end_matches('/')
                .split('/')
                .map(|part| percent_decode_str(part).decode_utf8_lossy().into_owned())
                .collect();
            return state
                .courses
                .iter()
                .find(|course| {
                    parts.len() == 3
                        && course["name"] == parts[0].as_str()
                        && course["semester"] == parts[1].as_str()
                        && course["year"].to_string() == parts[2]
                })
                .cloned()
                .ok_or_else(|| not_found(Method::Get, url));
        }

        let (collection, page) = match url.split_once("?page=") {
            Some((collection, page)) => (collection, page.parse::<usize>().unwrap_or(1)),
            None => (url, 1),
        };
        let items = state.list(collection);
        match state.page_size {
            None => Ok(Value::Array(items)),
            Some(size) => {
                let start = (page - 1) * size;
                let results: Vec<Value> = items.iter().skip(start).take(size).cloned().collect();
                let next = if start + size < items.len() {
                    json!(format!("{collection}?page={}", page + 1))
                } else {
                    Value::Null
                };
                Ok(json!({"count": items.len(), "results": results, "next": next}))
            }
        }
    }

    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, ClientError> {
        self.log(method, url, body.clone());
        self.check_failure(method, url)?;
        let fields = body.as_object().cloned().unwrap_or_default();
        let mut state = self.state.borrow_mut();
        match method {
            Method::Post => Ok(state.create(url, fields)),
            Method::Patch => {
                let pk = pk_segment(url).ok_or_else(|| not_found(method, url))?;
                let stored = state.find_mut(pk).ok_or_else(|| not_found(method, url))?;
                stored.object.extend(fields);
                let stored = stored.clone();
                Ok(state.render(&stored))
            }
            _ => Err(not_found(method, url)),
        }
    }

    fn upload(&self, method: Method, url: &str, file: &Upload) -> Result<Value, ClientError> {
        let contents = String::from_utf8_lossy(&file.contents).into_owned();
        self.log(
            method,
            url,
            json!({"file_obj": file.file_name, "contents": contents}),
        );
        self.check_failure(method, url)?;
        let mut state = self.state.borrow_mut();
        match method {
            Method::Post => {
                let mut fields = Map::new();
                fields.insert("name".to_owned(), json!(file.file_name));
                fields.insert("contents".to_owned(), json!(contents));
                Ok(state.create(url, fields))
            }
            Method::Put => {
                let pk = pk_segment(url).ok_or_else(|| not_found(method, url))?;
                let stored = state.find_mut(pk).ok_or_else(|| not_found(method, url))?;
                stored.object.insert("contents".to_owned(), json!(contents));
                let stored = stored.clone();
                Ok(state.render(&stored))
            }
            _ => Err(not_found(method, url)),
        }
    }
}

/// Write `files` (relative path, contents) under `dir`.
pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = dir.join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, contents).expect("write");
    }
}
