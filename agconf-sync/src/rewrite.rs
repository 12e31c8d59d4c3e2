//! Turns local names inside suite and command bodies into remote objects.
//!
//! The document refers to instructor files by base name, student files by
//! pattern and sandbox images by display name. The service expects the full
//! remote object in their place.

use serde_json::{Map, Value};

use crate::error::SyncError;
use crate::index::ResourceIndex;

/// Command fields that name a single instructor file (or `null`).
pub const COMMAND_FILE_FIELDS: [&str; 3] = [
    "stdin_instructor_file",
    "expected_stdout_instructor_file",
    "expected_stderr_instructor_file",
];

/// The indexes a body's references resolve against.
#[derive(Debug, Clone, Copy)]
pub struct References<'a> {
    pub instructor_files: &'a ResourceIndex,
    pub student_files: &'a ResourceIndex,
    /// Global and course images by display name; fetched only when some
    /// suite names an image.
    pub sandbox_images: Option<&'a ResourceIndex>,
}

impl<'a> References<'a> {
    /// Rewrite `instructor_files_needed`, `student_files_needed` and
    /// `sandbox_docker_image` of a suite body in place.
    pub fn rewrite_suite(&self, body: &mut Map<String, Value>, entity: &str) -> Result<(), SyncError> {
        for (field, index) in [
            ("instructor_files_needed", self.instructor_files),
            ("student_files_needed", self.student_files),
        ] {
            if let Some(Value::Array(names)) = body.get(field) {
                let resolved = names
                    .iter()
                    .map(|name| resolve(index, name, entity))
                    .collect::<Result<Vec<_>, _>>()?;
                body.insert(field.to_owned(), Value::Array(resolved));
            }
        }

        if let Some(image) = body.get("sandbox_docker_image") {
            let resolved = match self.sandbox_images {
                Some(images) => resolve(images, image, entity)?,
                None if image.is_null() => Value::Null,
                None => {
                    return Err(SyncError::UnresolvedReference {
                        kind: "sandbox image",
                        name: name_text(image),
                        entity: entity.to_owned(),
                    })
                }
            };
            body.insert("sandbox_docker_image".to_owned(), resolved);
        }
        Ok(())
    }

    /// Rewrite whichever of the three instructor-file fields a command body
    /// carries. Absent fields stay absent.
    pub fn rewrite_command(&self, body: &mut Map<String, Value>, entity: &str) -> Result<(), SyncError> {
        for field in COMMAND_FILE_FIELDS {
            if let Some(name) = body.get(field) {
                let resolved = resolve(self.instructor_files, name, entity)?;
                body.insert(field.to_owned(), resolved);
            }
        }
        Ok(())
    }
}

/// Look `name` up in `index`. `null` resolves to `null`.
fn resolve(index: &ResourceIndex, name: &Value, entity: &str) -> Result<Value, SyncError> {
    if name.is_null() {
        return Ok(Value::Null);
    }
    name.as_str()
        .and_then(|key| index.get(key))
        .cloned()
        .ok_or_else(|| SyncError::UnresolvedReference {
            kind: index.kind(),
            name: name_text(name),
            entity: entity.to_owned(),
        })
}

fn name_text(name: &Value) -> String {
    match name {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
