//! `agconf init <project> <course> <term> <year> [-f FILE]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use agconf_core::document::{self, DEFAULT_DOCUMENT};
use agconf_renderer::{Renderer, ScaffoldContext};

use crate::SemesterArg;

/// Write a starter project document.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name of the project on the grading service.
    pub project: String,

    /// Name of the course the project belongs to (e.g. "EECS 280").
    pub course: String,

    /// Course term: Fall | Winter | Spring | Summer.
    pub term: SemesterArg,

    /// Course year.
    pub year: u32,

    /// Where to write the document. Must not exist yet.
    #[arg(long, short = 'f', default_value = DEFAULT_DOCUMENT)]
    pub file: PathBuf,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let renderer = Renderer::new().context("failed to load document template")?;
        let ctx = ScaffoldContext::new(&self.project, &self.course, self.term.0, self.year);
        let contents = renderer
            .render_document(&ctx)
            .context("failed to render starter document")?;
        document::write_new_at(&self.file, &contents)
            .with_context(|| format!("failed to write '{}'", self.file.display()))?;

        println!(
            "✓ Wrote '{}' for {} ({} {} {})",
            self.file.display(),
            self.project,
            self.course,
            self.term,
            self.year
        );
        println!("  Edit it, then run `agconf save -f {}`", self.file.display());
        Ok(())
    }
}
