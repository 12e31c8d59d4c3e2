//! agconf core library: the project document types and feedback presets.
//!
//! - [`types`]: project, suite, test case and command structs
//! - [`feedback`]: feedback configurations and the preset tables
//! - [`document`]: load / validate / save of `ag_project.yml`
//! - [`error`]: [`ConfigError`], [`UnknownPresetError`]

pub mod document;
pub mod error;
pub mod feedback;
pub mod types;

pub use document::AgConfig;
pub use error::{ConfigError, UnknownPresetError};
pub use feedback::{FdbkLevel, FeedbackConfig, FeedbackRef, PresetTable, Presets, SuiteFeedbackConfig};
pub use types::{
    Command, CourseSelection, InstructorFile, ProjectConfig, Semester, StudentFilePattern,
    Substitution, TestCase, TestSuite,
};
