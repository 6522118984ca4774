//! Core pipeline orchestration and domain logic for docimport.
//!
//! This crate ties together sitemap discovery, curation, reconciliation
//! against the knowledge base, and the bounded concurrent importer into the
//! end-to-end `import` workflow. It also hosts the artifact selector used by
//! the `artifact` command.

pub mod importer;
pub mod pipeline;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod selector;

pub use importer::{Backoff, CANCELLED_BEFORE_START, FailedImport, ImportOptions, ImportOutcome, import_all};
pub use pipeline::{ImportConfig, ProgressReporter, SilentProgress, SitemapSource, run_import};
pub use reconcile::{Reconciliation, reconcile};
pub use remote::{HttpKnowledgeBase, KnowledgeBase, find_or_create_notebook};
pub use report::{ImportReport, ImportStatus, SAMPLE_REASONS, SampleReasons, write_report};
pub use selector::{Selection, SelectionCriteria, SelectionError, select_artifact};
