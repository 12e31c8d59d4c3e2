//! Save pipeline entrypoint used by the CLI.

use std::path::Path;

use agconf_client::ApiClient;
use agconf_core::document::{self, ensure_unique};
use agconf_core::AgConfig;
use agconf_renderer::materialize_suite;

use crate::dry_run::DryRunClient;
use crate::error::SyncError;
use crate::reconcile::{Reconciler, RunReport};

/// Load the document at `document_path` and reconcile it.
///
/// Instructor file paths resolve against the document's directory.
pub fn run(
    client: &dyn ApiClient,
    document_path: &Path,
    dry_run: bool,
) -> Result<RunReport, SyncError> {
    let document = document::load_at(document_path)?;
    let base_dir = document_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    run_document(client, &document, base_dir, dry_run)
}

/// Reconcile an already loaded document.
pub fn run_document(
    client: &dyn ApiClient,
    document: &AgConfig,
    base_dir: &Path,
    dry_run: bool,
) -> Result<RunReport, SyncError> {
    preflight(document)?;
    let presets = document.presets();
    if dry_run {
        let plan = DryRunClient::new(client);
        Reconciler::new(&plan, &presets, base_dir, true).reconcile(document)
    } else {
        Reconciler::new(client, &presets, base_dir, false).reconcile(document)
    }
}

/// Checks that need no network: identity keys are unique at every level
/// after expansion, and every named feedback preset exists.
pub fn preflight(document: &AgConfig) -> Result<(), SyncError> {
    document::validate(document)?;
    let presets = document.presets();

    for suite in &document.project.test_suites {
        for (_, reference) in suite.feedback_refs() {
            if let Some(reference) = reference {
                presets
                    .suites
                    .resolve(reference)
                    .map_err(|source| SyncError::UnknownPreset {
                        entity: suite.name.clone(),
                        source,
                    })?;
            }
        }

        let cases = materialize_suite(suite)?;
        ensure_unique("test case", cases.iter().map(|case| case.name.clone()))?;
        for case in &cases {
            ensure_unique("command", case.commands.iter().map(|cmd| cmd.name.clone()))?;
            for cmd in &case.commands {
                for (_, reference) in cmd.feedback_refs() {
                    if let Some(reference) = reference {
                        presets.commands.resolve(reference).map_err(|source| {
                            SyncError::UnknownPreset {
                                entity: format!("{} / {} / {}", suite.name, case.name, cmd.name),
                                source,
                            }
                        })?;
                    }
                }
            }
        }
    }
    Ok(())
}
