//! Domain types for the agconf project document.
//!
//! Optional fields are `Option<T>` and are skipped on serialization, so a
//! field the author never wrote never appears in an outgoing request body.
//! Defaults for create requests live next to the types that need them.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::feedback::{FeedbackConfig, FeedbackRef, SuiteFeedbackConfig};

/// One substitution map of a `repeat` list: placeholder token → replacement.
///
/// Insertion order is kept so replacements apply in the order they were written.
pub type Substitution = IndexMap<String, Value>;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Academic term of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semester {
    Fall,
    Winter,
    Spring,
    Summer,
}

impl Semester {
    /// All variants in calendar order starting with the fall term.
    pub fn all() -> &'static [Semester] {
        &[
            Semester::Fall,
            Semester::Winter,
            Semester::Spring,
            Semester::Summer,
        ]
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semester::Fall => write!(f, "Fall"),
            Semester::Winter => write!(f, "Winter"),
            Semester::Spring => write!(f, "Spring"),
            Semester::Summer => write!(f, "Summer"),
        }
    }
}

/// Where a command reads its stdin from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdinSource {
    None,
    Text,
    InstructorFile,
    SetupStdout,
    SetupStderr,
}

/// What return code a command is expected to exit with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedReturnCode {
    None,
    Zero,
    Nonzero,
}

/// Where the expected stdout/stderr of a command comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedOutputSource {
    None,
    Text,
    InstructorFile,
}

// ---------------------------------------------------------------------------
// Project level
// ---------------------------------------------------------------------------

/// Selects an existing course by its `(name, semester, year)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSelection {
    pub name: String,
    #[serde(alias = "term")]
    pub semester: Semester,
    pub year: u32,
}

/// An instructor-provided file uploaded from the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorFile {
    /// Path relative to the directory holding the project document.
    pub local_path: PathBuf,
}

impl InstructorFile {
    /// Identity key: the base filename of `local_path`.
    pub fn name(&self) -> String {
        self.local_path
            .file_name()
            .unwrap_or_else(|| self.local_path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Resolve `local_path` against the document directory.
    pub fn resolve_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.local_path)
    }
}

/// A file pattern students are expected to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFilePattern {
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_num_matches: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_num_matches: Option<u32>,
}

impl StudentFilePattern {
    /// Values filled in for fields the author left unset when creating.
    pub fn create_defaults() -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("min_num_matches".into(), json!(1));
        defaults.insert("max_num_matches".into(), json!(1));
        defaults
    }
}

/// Desired state of a project and everything beneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub course: CourseSelection,
    /// Project settings passed through to the service untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub student_files: Vec<StudentFilePattern>,
    #[serde(default)]
    pub instructor_files: Vec<InstructorFile>,
    #[serde(default)]
    pub test_suites: Vec<TestSuite>,
}

// ---------------------------------------------------------------------------
// Test suites, cases, commands
// ---------------------------------------------------------------------------

/// A test suite: shared sandbox settings, setup command and required files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    /// Display name of a sandbox image available to the course.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox_docker_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_network_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_suite_cmd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_suite_cmd_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_submission_if_setup_fails: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_files_needed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_instructor_files: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_files_needed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_fdbk_config: Option<FeedbackRef<SuiteFeedbackConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultimate_submission_fdbk_config: Option<FeedbackRef<SuiteFeedbackConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_limit_submission_fdbk_config: Option<FeedbackRef<SuiteFeedbackConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_viewer_fdbk_config: Option<FeedbackRef<SuiteFeedbackConfig>>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    /// A suite with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sandbox_docker_image: None,
            allow_network_access: None,
            deferred: None,
            setup_suite_cmd: None,
            setup_suite_cmd_name: None,
            reject_submission_if_setup_fails: None,
            instructor_files_needed: None,
            read_only_instructor_files: None,
            student_files_needed: None,
            normal_fdbk_config: None,
            ultimate_submission_fdbk_config: None,
            past_limit_submission_fdbk_config: None,
            staff_viewer_fdbk_config: None,
            test_cases: vec![],
        }
    }

    /// Values filled in for fields the author left unset when creating a
    /// suite.
    pub fn create_defaults() -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("instructor_files_needed".into(), json!([]));
        defaults.insert("student_files_needed".into(), json!([]));
        defaults
    }

    /// The four feedback references keyed by their request field name.
    pub fn feedback_refs(&self) -> [(&'static str, Option<&FeedbackRef<SuiteFeedbackConfig>>); 4] {
        [
            ("normal_fdbk_config", self.normal_fdbk_config.as_ref()),
            (
                "ultimate_submission_fdbk_config",
                self.ultimate_submission_fdbk_config.as_ref(),
            ),
            (
                "past_limit_submission_fdbk_config",
                self.past_limit_submission_fdbk_config.as_ref(),
            ),
            ("staff_viewer_fdbk_config", self.staff_viewer_fdbk_config.as_ref()),
        ]
    }
}

/// A test case: a named group of commands, optionally repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repeat: Vec<Substitution>,
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            repeat: vec![],
            commands,
        }
    }
}

/// Feedback request fields of a command, paired with the preset used when
/// creating a command that leaves the field unset.
pub const COMMAND_FEEDBACK_DEFAULTS: [(&str, Option<&str>); 5] = [
    ("normal_fdbk_config", Some("pass/fail")),
    ("first_failed_test_normal_fdbk_config", None),
    ("ultimate_submission_fdbk_config", Some("pass/fail")),
    ("past_limit_submission_fdbk_config", Some("private")),
    ("staff_viewer_fdbk_config", Some("public")),
];

/// A single shell command run inside the sandbox and checked against
/// expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub cmd: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_source: Option<StdinSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_instructor_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_return_code: Option<ExpectedReturnCode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_stdout_source: Option<ExpectedOutputSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_stdout_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_stdout_instructor_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_stderr_source: Option<ExpectedOutputSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_stderr_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_stderr_instructor_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_case: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_whitespace: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_whitespace_changes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_blank_lines: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_for_correct_return_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_for_correct_stdout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_for_correct_stderr: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduction_for_wrong_return_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduction_for_wrong_stdout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduction_for_wrong_stderr: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_fdbk_config: Option<FeedbackRef<FeedbackConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failed_test_normal_fdbk_config: Option<FeedbackRef<FeedbackConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultimate_submission_fdbk_config: Option<FeedbackRef<FeedbackConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_limit_submission_fdbk_config: Option<FeedbackRef<FeedbackConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_viewer_fdbk_config: Option<FeedbackRef<FeedbackConfig>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_virtual_memory_limit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_memory_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_process_spawn: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repeat: Vec<Substitution>,
}

impl Command {
    /// A command with only `name` and `cmd` set.
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            stdin_source: None,
            stdin_text: None,
            stdin_instructor_file: None,
            expected_return_code: None,
            expected_stdout_source: None,
            expected_stdout_text: None,
            expected_stdout_instructor_file: None,
            expected_stderr_source: None,
            expected_stderr_text: None,
            expected_stderr_instructor_file: None,
            ignore_case: None,
            ignore_whitespace: None,
            ignore_whitespace_changes: None,
            ignore_blank_lines: None,
            points_for_correct_return_code: None,
            points_for_correct_stdout: None,
            points_for_correct_stderr: None,
            deduction_for_wrong_return_code: None,
            deduction_for_wrong_stdout: None,
            deduction_for_wrong_stderr: None,
            normal_fdbk_config: None,
            first_failed_test_normal_fdbk_config: None,
            ultimate_submission_fdbk_config: None,
            past_limit_submission_fdbk_config: None,
            staff_viewer_fdbk_config: None,
            time_limit: None,
            use_virtual_memory_limit: None,
            virtual_memory_limit: None,
            block_process_spawn: None,
            repeat: vec![],
        }
    }

    /// The five feedback references keyed by their request field name, in
    /// the same order as [`COMMAND_FEEDBACK_DEFAULTS`].
    pub fn feedback_refs(&self) -> [(&'static str, Option<&FeedbackRef<FeedbackConfig>>); 5] {
        [
            ("normal_fdbk_config", self.normal_fdbk_config.as_ref()),
            (
                "first_failed_test_normal_fdbk_config",
                self.first_failed_test_normal_fdbk_config.as_ref(),
            ),
            (
                "ultimate_submission_fdbk_config",
                self.ultimate_submission_fdbk_config.as_ref(),
            ),
            (
                "past_limit_submission_fdbk_config",
                self.past_limit_submission_fdbk_config.as_ref(),
            ),
            ("staff_viewer_fdbk_config", self.staff_viewer_fdbk_config.as_ref()),
        ]
    }

    /// Mutable access to a scoring field by its request name.
    ///
    /// Returns `None` for names that are not one of the six scoring fields.
    pub fn scoring_field_mut(&mut self, field: &str) -> Option<&mut Option<i64>> {
        match field {
            "points_for_correct_return_code" => Some(&mut self.points_for_correct_return_code),
            "points_for_correct_stdout" => Some(&mut self.points_for_correct_stdout),
            "points_for_correct_stderr" => Some(&mut self.points_for_correct_stderr),
            "deduction_for_wrong_return_code" => Some(&mut self.deduction_for_wrong_return_code),
            "deduction_for_wrong_stdout" => Some(&mut self.deduction_for_wrong_stdout),
            "deduction_for_wrong_stderr" => Some(&mut self.deduction_for_wrong_stderr),
            _ => None,
        }
    }

    /// Values filled in for non-feedback fields the author left unset when
    /// creating a command.
    pub fn create_defaults() -> Map<String, Value> {
        let defaults = json!({
            "stdin_source": "none",
            "stdin_text": "",
            "expected_return_code": "none",
            "expected_stdout_source": "none",
            "expected_stdout_text": "",
            "expected_stderr_source": "none",
            "expected_stderr_text": "",
            "ignore_case": false,
            "ignore_whitespace": false,
            "ignore_whitespace_changes": false,
            "ignore_blank_lines": false,
            "points_for_correct_return_code": 0,
            "points_for_correct_stdout": 0,
            "points_for_correct_stderr": 0,
            "deduction_for_wrong_return_code": 0,
            "deduction_for_wrong_stdout": 0,
            "deduction_for_wrong_stderr": 0,
            "time_limit": 10,
            "use_virtual_memory_limit": false,
            "virtual_memory_limit": 500_000_000u64,
            "block_process_spawn": false,
            "stdin_instructor_file": null,
            "expected_stdout_instructor_file": null,
            "expected_stderr_instructor_file": null,
        });
        match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Build metadata for a locally built sandbox image. Not used by `save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImage {
    pub build_dir: PathBuf,
    #[serde(default)]
    pub include: Vec<PathBuf>,
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semester_display_matches_serde() {
        for semester in Semester::all() {
            let yaml = serde_yaml::to_string(semester).expect("serialize");
            assert_eq!(yaml.trim(), semester.to_string());
        }
    }

    #[test]
    fn course_accepts_term_alias() {
        let course: CourseSelection =
            serde_yaml::from_str("name: EECS 280\nterm: Winter\nyear: 2025\n").expect("parse");
        assert_eq!(course.semester, Semester::Winter);
    }

    #[test]
    fn instructor_file_name_is_basename() {
        let file = InstructorFile {
            local_path: PathBuf::from("tests/data/tests.py"),
        };
        assert_eq!(file.name(), "tests.py");
    }

    #[test]
    fn unset_command_fields_are_not_serialized() {
        let cmd = Command::new("Test 1", "echo hi");
        let value = serde_json::to_value(&cmd).expect("to_value");
        let mut keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["cmd", "name"]);
    }

    #[test]
    fn command_enums_use_snake_case() {
        let cmd: Command = serde_yaml::from_str(
            "name: a\ncmd: b\nstdin_source: instructor_file\nexpected_return_code: nonzero\n",
        )
        .expect("parse");
        assert_eq!(cmd.stdin_source, Some(StdinSource::InstructorFile));
        assert_eq!(cmd.expected_return_code, Some(ExpectedReturnCode::Nonzero));
    }

    #[test]
    fn scoring_field_lookup_rejects_unknown_names() {
        let mut cmd = Command::new("a", "b");
        assert!(cmd.scoring_field_mut("time_limit").is_none());
        *cmd.scoring_field_mut("points_for_correct_stdout").expect("field") = Some(4);
        assert_eq!(cmd.points_for_correct_stdout, Some(4));
    }

    #[test]
    fn feedback_refs_align_with_defaults() {
        let cmd = Command::new("a", "b");
        for ((field, _), (default_field, _)) in
            cmd.feedback_refs().iter().zip(COMMAND_FEEDBACK_DEFAULTS.iter())
        {
            assert_eq!(field, default_field);
        }
    }
}
