//! agconf: declarative autograder project configuration.
//!
//! # Usage
//!
//! ```text
//! agconf init <project> <course> <term> <year> [-f FILE]
//! agconf save [-f FILE] [--dry-run]
//! agconf list <project_pk> [--json]
//! agconf presets [-f FILE]
//! ```
//!
//! Global options: `--base-url`, `--token-file`, `-v`.

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use agconf_client::{find_token, HttpClient, DEFAULT_BASE_URL, DEFAULT_TOKEN_FILE};
use agconf_core::Semester;
use commands::{init::InitArgs, list::ListArgs, presets::PresetsArgs, save::SaveArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "agconf",
    version,
    about = "Keep an autograder project in sync with a YAML document",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Connection and logging options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Scheme and host of the grading service.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// A file name searched for from the current directory up to your home
    /// directory, or a path containing a directory, read directly.
    #[arg(long, short = 't', global = true, default_value = DEFAULT_TOKEN_FILE)]
    pub token_file: PathBuf,

    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// An authenticated client; fails before any request if no token is found.
    pub fn client(&self) -> Result<HttpClient> {
        let token = find_token(&self.token_file).with_context(|| {
            format!("could not load API token from '{}'", self.token_file.display())
        })?;
        Ok(HttpClient::new(self.base_url.clone(), token))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter project document.
    Init(InitArgs),

    /// Create or update the remote project to match the document.
    Save(SaveArgs),

    /// Print the test suites, cases and commands of a remote project.
    List(ListArgs),

    /// Print the feedback presets available to a document.
    Presets(PresetsArgs),
}

// ---------------------------------------------------------------------------
// Shared Semester argument, parsed case-insensitively
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct SemesterArg(pub Semester);

impl FromStr for SemesterArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Semester::all()
            .iter()
            .find(|semester| semester.to_string().eq_ignore_ascii_case(s))
            .map(|semester| Self(*semester))
            .ok_or_else(|| {
                format!("unknown term '{s}'; expected: Fall, Winter, Spring, Summer")
            })
    }
}

impl fmt::Display for SemesterArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Save(args) => args.run(&cli.global),
        Commands::List(args) => args.run(&cli.global),
        Commands::Presets(args) => args.run(),
    }
}

/// Logs go to stderr so `--json` output stays clean.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
