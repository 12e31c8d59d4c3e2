//! Template context for the starter document written by `agconf init`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agconf_core::Semester;

use crate::error::RenderError;

/// Rendering payload for `ag_project.yml.tera`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldContext {
    pub project_name: String,
    pub course_name: String,
    pub semester: Semester,
    pub year: u32,
    pub generated_at: DateTime<Utc>,
    /// Version of the tool that wrote the document.
    pub version: String,
}

impl ScaffoldContext {
    /// Context stamped with the current time and this crate's version.
    pub fn new(
        project_name: impl Into<String>,
        course_name: impl Into<String>,
        semester: Semester,
        year: u32,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            course_name: course_name.into(),
            semester,
            year,
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
