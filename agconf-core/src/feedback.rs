//! Feedback configurations and named presets.
//!
//! A feedback field in the document is a [`FeedbackRef`]: either an inline
//! configuration or the name of a preset. [`PresetTable::resolve`] is the only
//! place a name is turned into a configuration.
//!
//! The built-in command presets:
//!
//! | preset                  | rc / stdout / stderr level | points | actual rc | actual out/err | timed out |
//! |-------------------------|----------------------------|--------|-----------|----------------|-----------|
//! | `pass/fail`             | c/i, c/i, c/i              | yes    | no        | no / no        | no        |
//! | `pass/fail+timeout`     | c/i, c/i, c/i              | yes    | no        | no / no        | yes       |
//! | `pass/fail+exit_status` | c/i, c/i, c/i              | yes    | yes       | no / no        | yes       |
//! | `pass/fail+output`      | c/i, c/i, c/i              | yes    | no        | yes / yes      | no        |
//! | `pass/fail+diff`        | c/i, e&a, e&a              | yes    | no        | no / no        | no        |
//! | `private`               | none, none, none           | no     | no        | no / no        | no        |
//! | `public`                | e&a, e&a, e&a              | yes    | yes       | yes / yes      | yes       |

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::UnknownPresetError;

/// How much the student learns about one output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FdbkLevel {
    NoFeedback,
    CorrectOrIncorrect,
    ExpectedAndActual,
}

/// Feedback settings for a single command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    pub visible: bool,
    pub return_code_fdbk_level: FdbkLevel,
    pub stdout_fdbk_level: FdbkLevel,
    pub stderr_fdbk_level: FdbkLevel,
    pub show_points: bool,
    pub show_actual_return_code: bool,
    pub show_actual_stdout: bool,
    pub show_actual_stderr: bool,
    pub show_whether_timed_out: bool,
}

/// Feedback settings for a test suite's setup command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteFeedbackConfig {
    pub visible: bool,
    pub show_individual_tests: bool,
    pub show_setup_return_code: bool,
    pub show_setup_timed_out: bool,
    pub show_setup_stdout: bool,
    pub show_setup_stderr: bool,
}

/// A feedback field as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedbackRef<T> {
    /// Name of a preset, e.g. `"pass/fail"`.
    Named(String),
    /// A literal configuration.
    Inline(T),
}

impl<T> FeedbackRef<T> {
    pub fn named(name: impl Into<String>) -> Self {
        FeedbackRef::Named(name.into())
    }
}

/// A configuration type that ships with built-in presets.
pub trait Preset: Clone {
    /// The built-in `(name, config)` pairs, in display order.
    fn builtins() -> Vec<(&'static str, Self)>;
}

impl Preset for FeedbackConfig {
    fn builtins() -> Vec<(&'static str, Self)> {
        use FdbkLevel::{CorrectOrIncorrect as Ci, ExpectedAndActual as Ea, NoFeedback as No};

        let pass_fail = FeedbackConfig {
            visible: true,
            return_code_fdbk_level: Ci,
            stdout_fdbk_level: Ci,
            stderr_fdbk_level: Ci,
            show_points: true,
            show_actual_return_code: false,
            show_actual_stdout: false,
            show_actual_stderr: false,
            show_whether_timed_out: false,
        };
        vec![
            ("pass/fail", pass_fail.clone()),
            (
                "pass/fail+timeout",
                FeedbackConfig {
                    show_whether_timed_out: true,
                    ..pass_fail.clone()
                },
            ),
            (
                "pass/fail+exit_status",
                FeedbackConfig {
                    show_actual_return_code: true,
                    show_whether_timed_out: true,
                    ..pass_fail.clone()
                },
            ),
            (
                "pass/fail+output",
                FeedbackConfig {
                    show_actual_stdout: true,
                    show_actual_stderr: true,
                    ..pass_fail.clone()
                },
            ),
            (
                "pass/fail+diff",
                FeedbackConfig {
                    stdout_fdbk_level: Ea,
                    stderr_fdbk_level: Ea,
                    ..pass_fail
                },
            ),
            (
                "private",
                FeedbackConfig {
                    visible: true,
                    return_code_fdbk_level: No,
                    stdout_fdbk_level: No,
                    stderr_fdbk_level: No,
                    show_points: false,
                    show_actual_return_code: false,
                    show_actual_stdout: false,
                    show_actual_stderr: false,
                    show_whether_timed_out: false,
                },
            ),
            (
                "public",
                FeedbackConfig {
                    visible: true,
                    return_code_fdbk_level: Ea,
                    stdout_fdbk_level: Ea,
                    stderr_fdbk_level: Ea,
                    show_points: true,
                    show_actual_return_code: true,
                    show_actual_stdout: true,
                    show_actual_stderr: true,
                    show_whether_timed_out: true,
                },
            ),
        ]
    }
}

impl Preset for SuiteFeedbackConfig {
    fn builtins() -> Vec<(&'static str, Self)> {
        let public = SuiteFeedbackConfig {
            visible: true,
            show_individual_tests: true,
            show_setup_return_code: true,
            show_setup_timed_out: true,
            show_setup_stdout: true,
            show_setup_stderr: true,
        };
        vec![
            (
                "pass/fail",
                SuiteFeedbackConfig {
                    show_setup_stdout: false,
                    show_setup_stderr: false,
                    ..public.clone()
                },
            ),
            (
                "private",
                SuiteFeedbackConfig {
                    show_setup_return_code: false,
                    show_setup_timed_out: false,
                    show_setup_stdout: false,
                    show_setup_stderr: false,
                    ..public.clone()
                },
            ),
            ("public", public),
        ]
    }
}

/// Name → configuration lookup: built-ins overlaid with document presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetTable<T> {
    presets: IndexMap<String, T>,
}

impl<T: Preset> PresetTable<T> {
    /// Table containing only the built-in presets.
    pub fn builtin() -> Self {
        Self {
            presets: T::builtins()
                .into_iter()
                .map(|(name, config)| (name.to_owned(), config))
                .collect(),
        }
    }

    /// Built-ins overlaid with `overrides`; an override with a built-in's name
    /// replaces it in place.
    pub fn with_overrides(overrides: &IndexMap<String, T>) -> Self {
        let mut table = Self::builtin();
        for (name, config) in overrides {
            table.presets.insert(name.clone(), config.clone());
        }
        table
    }
}

impl<T: Clone> PresetTable<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.presets.get(name)
    }

    /// Turn a document reference into a concrete configuration.
    pub fn resolve(&self, reference: &FeedbackRef<T>) -> Result<T, UnknownPresetError> {
        match reference {
            FeedbackRef::Inline(config) => Ok(config.clone()),
            FeedbackRef::Named(name) => self
                .presets
                .get(name)
                .cloned()
                .ok_or_else(|| UnknownPresetError { name: name.clone() }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.presets.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// The read-only preset context of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presets {
    pub commands: PresetTable<FeedbackConfig>,
    pub suites: PresetTable<SuiteFeedbackConfig>,
}

impl Presets {
    pub fn builtin() -> Self {
        Self {
            commands: PresetTable::builtin(),
            suites: PresetTable::builtin(),
        }
    }

    pub fn with_overrides(
        commands: &IndexMap<String, FeedbackConfig>,
        suites: &IndexMap<String, SuiteFeedbackConfig>,
    ) -> Self {
        Self {
            commands: PresetTable::with_overrides(commands),
            suites: PresetTable::with_overrides(suites),
        }
    }
}
