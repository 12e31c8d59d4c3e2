//! `agconf save [-f FILE] [--dry-run]`
//!
//! Converges the remote project to the document.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use agconf_core::document::DEFAULT_DOCUMENT;
use agconf_sync::{pipeline, Action, RunReport};

use crate::GlobalArgs;

/// Arguments for `agconf save`.
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Project document to save.
    #[arg(long, short = 'f', default_value = DEFAULT_DOCUMENT)]
    pub file: PathBuf,

    /// Perform every read and report the planned writes without sending them.
    #[arg(long)]
    pub dry_run: bool,
}

impl SaveArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        tracing::debug!(file = %self.file.display(), base_url = %global.base_url, dry_run = self.dry_run, "saving project");
        let report = pipeline::run(&client, &self.file, self.dry_run)
            .with_context(|| format!("save failed for '{}'", self.file.display()))?;
        print_report(&report, self.dry_run);

        if !report.is_complete() {
            bail!(
                "{} entities were skipped because of unresolved references",
                report.skipped.len()
            );
        }
        Ok(())
    }
}

/// Per-entity progress is logged by the reconciler as it goes; this prints
/// what was skipped and the totals.
fn print_report(report: &RunReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    for skipped in &report.skipped {
        println!(
            "  {}  {} {}: {}",
            "✗".red(),
            skipped.kind,
            skipped.name,
            skipped.error
        );
    }

    let (created, updated) = if dry_run {
        (
            report.count(Action::WouldCreate),
            report.count(Action::WouldUpdate),
        )
    } else {
        (report.count(Action::Created), report.count(Action::Updated))
    };
    println!(
        "{prefix}✓ {created} created, {updated} updated, {} skipped",
        report.skipped.len()
    );
}
