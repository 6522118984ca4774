//! Bounded concurrent importer with per-URL retry and backoff.
//!
//! One task per URL is spawned up front; a semaphore admits at most
//! `concurrency` of them into the add-operation at a time. Results are
//! collected by the joining task alone, so no shared mutable state is needed.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use docimport_shared::Result;

use crate::pipeline::ProgressReporter;

/// Error recorded for URLs never admitted because the run was cancelled.
pub const CANCELLED_BEFORE_START: &str = "cancelled before import started";

/// Default number of completions between progress reports.
const DEFAULT_PROGRESS_EVERY: usize = 20;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Bounded exponential backoff: `min(cap, base * 2^attempt)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1500),
            cap: Duration::from_secs(12),
        }
    }
}

impl Backoff {
    /// Delay after the failed attempt with zero-based index `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.cap)
    }
}

/// Importer tuning.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Maximum in-flight add operations (clamped to at least 1).
    pub concurrency: usize,
    /// Maximum attempts per URL (clamped to at least 1).
    pub retries: u32,
    pub backoff: Backoff,
    /// Report progress every this many completions, and at the last one.
    pub progress_every: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retries: 5,
            backoff: Backoff::default(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A URL whose import did not succeed, with the last error seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedImport {
    pub url: String,
    pub error: String,
}

/// Aggregate result of [`import_all`].
///
/// `succeeded + failed.len()` always equals the number of URLs submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub succeeded: usize,
    pub failed: Vec<FailedImport>,
}

impl ImportOutcome {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Run `add` for every URL in `todo` under a concurrency cap with retries.
///
/// Failures never abort the batch. After `cancel` fires, URLs not yet
/// admitted are recorded as failed without calling `add`, and in-flight URLs
/// stop after their current attempt.
#[instrument(skip_all, fields(total = todo.len(), concurrency = opts.concurrency, retries = opts.retries))]
pub async fn import_all<F, Fut>(
    todo: &[String],
    add: F,
    opts: &ImportOptions,
    cancel: &CancellationToken,
    progress: &dyn ProgressReporter,
) -> ImportOutcome
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let total = todo.len();
    let retries = opts.retries.max(1);
    let progress_every = opts.progress_every.max(1);
    let gate = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let add = Arc::new(add);

    info!("starting import");

    let mut workers = JoinSet::new();
    for (index, url) in todo.iter().enumerate() {
        let gate = Arc::clone(&gate);
        let add = Arc::clone(&add);
        let cancel = cancel.clone();
        let url = url.clone();
        let backoff = opts.backoff;

        workers.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(CANCELLED_BEFORE_START.to_string()),
                // Nothing closes `gate`; a failed acquisition is reported like a
                // URL that was never admitted.
                permit = gate.acquire_owned() => match permit {
                    Ok(_permit) => add_with_retry(add.as_ref(), &url, retries, backoff, &cancel).await,
                    Err(_) => Err(CANCELLED_BEFORE_START.to_string()),
                },
            };
            (index, result)
        });
    }

    let mut finished = vec![false; total];
    let mut outcome = ImportOutcome::default();
    let mut done = 0usize;

    while let Some(joined) = workers.join_next().await {
        let (index, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                // The URL is recovered below from the unfinished slots.
                warn!(error = %e, "import worker aborted");
                continue;
            }
        };

        finished[index] = true;
        done += 1;
        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(error) => {
                warn!(url = %todo[index], %error, "import failed");
                outcome.failed.push(FailedImport {
                    url: todo[index].clone(),
                    error,
                });
            }
        }

        if done % progress_every == 0 || done == total {
            report_progress(progress, done, total, &outcome);
        }
    }

    for (index, _) in finished.iter().enumerate().filter(|(_, f)| !**f) {
        outcome.failed.push(FailedImport {
            url: todo[index].clone(),
            error: "import worker aborted".to_string(),
        });
    }
    if done < total {
        report_progress(progress, total, total, &outcome);
    }

    info!(
        succeeded = outcome.succeeded,
        failed = outcome.failed.len(),
        "import finished"
    );
    outcome
}

fn report_progress(progress: &dyn ProgressReporter, done: usize, total: usize, outcome: &ImportOutcome) {
    info!(
        done,
        total,
        succeeded = outcome.succeeded,
        failed = outcome.failed.len(),
        "import progress"
    );
    progress.import_progress(done, total, outcome.succeeded, outcome.failed.len());
}

/// Attempt `add(url)` up to `retries` times, sleeping between attempts.
async fn add_with_retry<F, Fut>(
    add: &F,
    url: &str,
    retries: u32,
    backoff: Backoff,
    cancel: &CancellationToken,
) -> std::result::Result<(), String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut last_error = String::new();

    for attempt in 0..retries {
        match add(url.to_string()).await {
            Ok(()) => {
                debug!(url, attempt = attempt + 1, "source added");
                return Ok(());
            }
            Err(e) => {
                debug!(url, attempt = attempt + 1, error = %e, "add attempt failed");
                last_error = e.to_string();
            }
        }

        if attempt + 1 < retries {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(format!("cancelled after {} attempt(s): {last_error}", attempt + 1));
                }
                _ = tokio::time::sleep(backoff.delay(attempt)) => {}
            }
        }
    }

    Err(last_error)
}
