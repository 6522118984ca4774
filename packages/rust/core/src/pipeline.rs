//! End-to-end `import` pipeline: sitemap → curate → reconcile → import → report.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use docimport_curation::{CurationOptions, curate};
use docimport_discovery::{DiscoveryOptions, build_client, discover_sitemap, load_sitemap_urls};
use docimport_shared::Result;

use crate::importer::{ImportOptions, ImportOutcome, import_all};
use crate::reconcile::{Reconciliation, reconcile};
use crate::remote::{KnowledgeBase, find_or_create_notebook};
use crate::report::{ImportReport, sample_reasons};

/// Where the sitemap comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapSource {
    /// An explicit sitemap (or sitemap index) URL.
    Sitemap(String),
    /// A page on the documentation site; the sitemap is discovered from it.
    Seed(String),
}

/// Configuration for [`run_import`].
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Notebook title, matched exactly.
    pub notebook: String,
    pub source: SitemapSource,
    pub curation: CurationOptions,
    pub import: ImportOptions,
    pub discovery: DiscoveryOptions,
    /// Curate and reconcile only; never mutate the knowledge base.
    pub dry_run: bool,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called periodically while importing, and once at the end.
    fn import_progress(&self, done: usize, total: usize, succeeded: usize, failed: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &ImportReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn import_progress(&self, _done: usize, _total: usize, _succeeded: usize, _failed: usize) {}
    fn done(&self, _report: &ImportReport) {}
}

/// Run the full `import` pipeline.
///
/// 1. Resolve the sitemap (explicit or discovered from the seed URL)
/// 2. Load and curate its URLs
/// 3. Find the notebook, creating it unless this is a dry run
/// 4. Reconcile against the notebook's current sources
/// 5. Import the remaining URLs (skipped on dry run)
///
/// Per-URL failures end up in the report; only input and discovery errors
/// abort the run.
#[instrument(skip_all, fields(notebook = %config.notebook, dry_run = config.dry_run))]
pub async fn run_import<K: KnowledgeBase + 'static>(
    config: &ImportConfig,
    kb: Arc<K>,
    progress: &dyn ProgressReporter,
    cancel: &CancellationToken,
) -> Result<ImportReport> {
    let start = Instant::now();
    let client = build_client(&config.discovery)?;

    // --- Phase 1: Sitemap ---
    let (sitemap, seed_url) = match &config.source {
        SitemapSource::Sitemap(url) => (url.clone(), None),
        SitemapSource::Seed(seed) => {
            progress.phase("Discovering sitemap");
            let found = discover_sitemap(&client, seed, &config.discovery).await?;
            info!(sitemap = %found, "discovered sitemap");
            (found, Some(seed.clone()))
        }
    };

    progress.phase("Loading sitemap");
    let raw_urls = load_sitemap_urls(&client, &sitemap).await?;

    // --- Phase 2: Curation ---
    progress.phase("Curating URLs");
    let curation = curate(&raw_urls, &config.curation);

    // --- Phase 3: Reconciliation ---
    progress.phase("Reconciling with notebook");
    let notebook = find_or_create_notebook(kb.as_ref(), &config.notebook, !config.dry_run).await?;
    let existing = match &notebook {
        Some(nb) => kb.list_sources(&nb.id).await?,
        None => Vec::new(),
    };
    let Reconciliation {
        todo,
        existing_canonical,
    } = reconcile(&curation.curated, &existing);

    // --- Phase 4: Import ---
    let outcome = match &notebook {
        Some(nb) if !config.dry_run && !todo.is_empty() => {
            progress.phase("Importing sources");
            let notebook_id = nb.id.clone();
            let kb = Arc::clone(&kb);
            let add = move |url: String| {
                let kb = Arc::clone(&kb);
                let notebook_id = notebook_id.clone();
                async move { kb.add_url_source(&notebook_id, &url).await }
            };
            import_all(&todo, add, &config.import, cancel, progress).await
        }
        _ => ImportOutcome::default(),
    };

    // --- Phase 5: Report ---
    let report = ImportReport {
        sitemap,
        seed_url,
        notebook: config.notebook.clone(),
        notebook_id: notebook.map(|nb| nb.id),
        prefer_lang: config.curation.prefer_lang.clone(),
        keep_prefixes: config.curation.keep_prefixes.clone(),
        skip_prefixes: config.curation.skip_prefixes.clone(),
        raw_total: raw_urls.len(),
        curated_total: curation.curated.len(),
        existing_canonical_urls: existing_canonical,
        attempted: todo.len(),
        todo,
        added_success: outcome.succeeded,
        failed_count: outcome.failed.len(),
        failed: outcome.failed,
        sample_reasons: sample_reasons(&curation.curated, &curation.reasons),
        filter_stats: curation.stats,
        dry_run: config.dry_run,
        generated_at: Utc::now(),
    };

    info!(
        added = report.added_success,
        failed = report.failed_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "import pipeline complete"
    );
    progress.done(&report);

    Ok(report)
}
