//! `agconf list <project_pk> [--json]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use agconf_sync::listing::{self, TestNode};

use crate::GlobalArgs;

/// Arguments for `agconf list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Primary key of the project on the grading service.
    pub project_pk: i64,

    /// Print the raw suite objects as JSON.
    #[arg(long, short = 'j')]
    pub json: bool,
}

#[derive(Tabled)]
struct TestRow {
    #[tabled(rename = "level")]
    level: &'static str,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "pk")]
    pk: i64,
}

impl ListArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let suites = listing::fetch_suites(&client, self.project_pk)
            .with_context(|| format!("failed to list tests of project {}", self.project_pk))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&suites)?);
            return Ok(());
        }

        let tree = listing::test_tree(&suites);
        if tree.is_empty() {
            println!("Project {} has no test suites.", self.project_pk);
            return Ok(());
        }
        println!("{}", format!("PROJECT {}", self.project_pk).bold());
        let mut table = Table::new(rows(&tree));
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn rows(tree: &[TestNode]) -> Vec<TestRow> {
    let mut rows = Vec::new();
    for suite in tree {
        rows.push(TestRow {
            level: "suite",
            name: suite.name.clone(),
            pk: suite.pk,
        });
        for case in &suite.children {
            rows.push(TestRow {
                level: "test case",
                name: format!("  {}", case.name),
                pk: case.pk,
            });
            for cmd in &case.children {
                rows.push(TestRow {
                    level: "command",
                    name: format!("    {}", cmd.name),
                    pk: cmd.pk,
                });
            }
        }
    }
    rows
}
