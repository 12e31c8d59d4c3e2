//! `agconf presets [-f FILE]`
//!
//! Prints the merged feedback preset tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use agconf_core::document::{self, DEFAULT_DOCUMENT};
use agconf_core::{FdbkLevel, Presets};

/// Arguments for `agconf presets`.
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Document whose presets are merged over the built-ins. Built-ins only
    /// if the file does not exist.
    #[arg(long, short = 'f', default_value = DEFAULT_DOCUMENT)]
    pub file: PathBuf,
}

#[derive(Tabled)]
struct CommandPresetRow {
    #[tabled(rename = "preset")]
    name: String,
    #[tabled(rename = "visible")]
    visible: bool,
    #[tabled(rename = "return code")]
    return_code: &'static str,
    #[tabled(rename = "stdout")]
    stdout: &'static str,
    #[tabled(rename = "stderr")]
    stderr: &'static str,
    #[tabled(rename = "points")]
    points: bool,
    #[tabled(rename = "actual rc/out/err")]
    actual: String,
    #[tabled(rename = "timed out")]
    timed_out: bool,
}

#[derive(Tabled)]
struct SuitePresetRow {
    #[tabled(rename = "preset")]
    name: String,
    #[tabled(rename = "visible")]
    visible: bool,
    #[tabled(rename = "individual tests")]
    individual_tests: bool,
    #[tabled(rename = "setup rc")]
    return_code: bool,
    #[tabled(rename = "setup timed out")]
    timed_out: bool,
    #[tabled(rename = "setup stdout")]
    stdout: bool,
    #[tabled(rename = "setup stderr")]
    stderr: bool,
}

impl PresetsArgs {
    pub fn run(self) -> Result<()> {
        let presets = if self.file.exists() {
            document::load_at(&self.file)
                .with_context(|| format!("failed to load '{}'", self.file.display()))?
                .presets()
        } else {
            Presets::builtin()
        };

        let commands: Vec<CommandPresetRow> = presets
            .commands
            .iter()
            .map(|(name, config)| CommandPresetRow {
                name: name.to_owned(),
                visible: config.visible,
                return_code: level_label(config.return_code_fdbk_level),
                stdout: level_label(config.stdout_fdbk_level),
                stderr: level_label(config.stderr_fdbk_level),
                points: config.show_points,
                actual: format!(
                    "{}/{}/{}",
                    yes_no(config.show_actual_return_code),
                    yes_no(config.show_actual_stdout),
                    yes_no(config.show_actual_stderr)
                ),
                timed_out: config.show_whether_timed_out,
            })
            .collect();
        println!("{}", "COMMAND FEEDBACK PRESETS".bold());
        let mut table = Table::new(commands);
        table.with(Style::rounded());
        println!("{table}");

        let suites: Vec<SuitePresetRow> = presets
            .suites
            .iter()
            .map(|(name, config)| SuitePresetRow {
                name: name.to_owned(),
                visible: config.visible,
                individual_tests: config.show_individual_tests,
                return_code: config.show_setup_return_code,
                timed_out: config.show_setup_timed_out,
                stdout: config.show_setup_stdout,
                stderr: config.show_setup_stderr,
            })
            .collect();
        println!("{}", "SUITE SETUP FEEDBACK PRESETS".bold());
        let mut table = Table::new(suites);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn level_label(level: FdbkLevel) -> &'static str {
    match level {
        FdbkLevel::NoFeedback => "none",
        FdbkLevel::CorrectOrIncorrect => "correct/incorrect",
        FdbkLevel::ExpectedAndActual => "expected+actual",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
