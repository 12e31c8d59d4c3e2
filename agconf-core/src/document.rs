//! The project document: `ag_project.yml`.
//!
//! # Layout
//!
//! ```text
//! project:                           # desired state (ProjectConfig)
//! feedback_presets:                  # name -> command FeedbackConfig
//! feedback_presets_test_suite_setup: # name -> SuiteFeedbackConfig
//! docker_images:                     # name -> build metadata (unused by save)
//! ```
//!
//! # API pattern
//!
//! Loading and saving take explicit paths; callers resolve the default
//! [`DEFAULT_DOCUMENT`] name against their working directory.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::feedback::{FeedbackConfig, Presets, SuiteFeedbackConfig};
use crate::types::{DockerImage, ProjectConfig};

/// File name used when no `--file` is given.
pub const DEFAULT_DOCUMENT: &str = "ag_project.yml";

/// Root of the project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgConfig {
    pub project: ProjectConfig,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub feedback_presets: IndexMap<String, FeedbackConfig>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub feedback_presets_test_suite_setup: IndexMap<String, SuiteFeedbackConfig>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub docker_images: IndexMap<String, DockerImage>,
}

impl AgConfig {
    pub fn new(project: ProjectConfig) -> Self {
        Self {
            project,
            feedback_presets: IndexMap::new(),
            feedback_presets_test_suite_setup: IndexMap::new(),
            docker_images: IndexMap::new(),
        }
    }

    /// Built-in presets merged with the ones this document declares.
    pub fn presets(&self) -> Presets {
        Presets::with_overrides(
            &self.feedback_presets,
            &self.feedback_presets_test_suite_setup,
        )
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate the document at `path`.
///
/// Returns `ConfigError::DocumentNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<AgConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::DocumentNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let document = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&document)?;
    Ok(document)
}

/// Parse a document from YAML text without validating it.
pub fn parse(contents: &str) -> Result<AgConfig, serde_yaml::Error> {
    serde_yaml::from_str(contents)
}

/// Check identity-key uniqueness at the project level.
///
/// Test case and command names are checked after template expansion, since a
/// `repeat` list is what gives them their final names.
pub fn validate(document: &AgConfig) -> Result<(), ConfigError> {
    let project = &document.project;
    ensure_unique(
        "instructor file",
        project.instructor_files.iter().map(|f| f.name()),
    )?;
    ensure_unique(
        "student file pattern",
        project.student_files.iter().map(|p| p.pattern.clone()),
    )?;
    ensure_unique(
        "test suite",
        project.test_suites.iter().map(|s| s.name.clone()),
    )?;
    Ok(())
}

/// Fail with `DuplicateName` on the first repeated name.
pub fn ensure_unique(
    level: &'static str,
    names: impl IntoIterator<Item = String>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateName { level, name });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically write YAML `contents` to `path`, refusing to clobber an existing file.
///
/// Write flow: `.tmp` sibling → `rename`. The `.tmp` file is always in the
/// same directory as the target.
pub fn write_new_at(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let tmp = path.with_extension("yml.tmp");
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Serialize `document` and write it with [`write_new_at`].
pub fn save_new_at(path: &Path, document: &AgConfig) -> Result<(), ConfigError> {
    let yaml = serde_yaml::to_string(document)?;
    write_new_at(path, &yaml)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
