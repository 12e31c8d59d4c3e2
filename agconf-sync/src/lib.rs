//! # agconf-sync
//!
//! Reconciliation of a project document against the grading service.
//!
//! Call [`pipeline::run`] to load a document and converge remote state to it,
//! optionally as a dry run that performs reads only.

pub mod body;
pub mod dry_run;
pub mod error;
pub mod index;
pub mod listing;
pub mod pipeline;
pub mod reconcile;
pub mod rewrite;

pub use dry_run::DryRunClient;
pub use error::SyncError;
pub use index::ResourceIndex;
pub use pipeline::{preflight, run, run_document};
pub use reconcile::{Action, EntityKind, Outcome, Reconciler, RunReport, Skipped};
pub use rewrite::References;
