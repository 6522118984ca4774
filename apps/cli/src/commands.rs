//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgGroup, Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docimport_core::{
    HttpKnowledgeBase, ImportConfig, ImportOptions, ImportReport, ImportStatus, KnowledgeBase,
    ProgressReporter, SelectionCriteria, SitemapSource, find_or_create_notebook, run_import,
    select_artifact, write_report,
};
use docimport_curation::{CurationOptions, parse_prefixes};
use docimport_discovery::DiscoveryOptions;
use docimport_shared::{AppConfig, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docimport: curate documentation sitemaps into knowledge-base notebooks.
#[derive(Parser)]
#[command(
    name = "docimport",
    version,
    about = "Curate a documentation sitemap and bulk-import it into a knowledge-base notebook.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Curate a sitemap and import the result into a notebook.
    Import(ImportArgs),

    /// Pick one artifact from a notebook by id, name, or recency.
    Artifact {
        /// Notebook title.
        #[arg(long)]
        notebook: String,

        /// Select the most recent artifact (default).
        #[arg(long)]
        latest: bool,

        /// Select the oldest artifact.
        #[arg(long)]
        earliest: bool,

        /// Case-insensitive substring of the artifact title.
        #[arg(long)]
        name: Option<String>,

        /// Exact artifact id.
        #[arg(long)]
        id: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `docimport import`. Unset values fall back to `[defaults]`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["sitemap", "seed_url"])))]
pub(crate) struct ImportArgs {
    /// Notebook title; created when missing (except on dry run).
    #[arg(long)]
    pub notebook: String,

    /// Sitemap or sitemap-index URL.
    #[arg(long)]
    pub sitemap: Option<String>,

    /// Any page on the documentation site; the sitemap is discovered.
    #[arg(long)]
    pub seed_url: Option<String>,

    /// Preferred locale (e.g. en, zh-CN).
    #[arg(long)]
    pub prefer_lang: Option<String>,

    /// Comma-separated path prefixes to keep (e.g. /docs,/guides).
    #[arg(long, default_value = "")]
    pub keep_prefix: String,

    /// Comma-separated path prefixes to skip.
    #[arg(long, default_value = "")]
    pub skip_prefix: String,

    /// Maximum URLs to import in one run.
    #[arg(long)]
    pub max_import: Option<usize>,

    /// Parallel add operations.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Attempts per URL.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Report JSON path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Plan only: curate and reconcile, but do not import.
    #[arg(long)]
    pub dry_run: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docimport=info",
        1 => "docimport=debug",
        _ => "docimport=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command and map its outcome to a process exit code.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Import(args) => cmd_import(args).await,
        Command::Artifact {
            notebook,
            latest,
            earliest,
            name,
            id,
        } => {
            let criteria = SelectionCriteria {
                latest,
                earliest,
                name,
                artifact_id: id,
            };
            cmd_artifact(&notebook, &criteria).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Init => cmd_config_init()?,
                ConfigAction::Show => cmd_config_show()?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

/// Merge command-line flags over the loaded config.
fn build_import_config(args: &ImportArgs, config: &AppConfig) -> Result<ImportConfig> {
    let source = match (&args.sitemap, &args.seed_url) {
        (Some(sitemap), None) => SitemapSource::Sitemap(sitemap.clone()),
        (None, Some(seed)) => SitemapSource::Seed(seed.clone()),
        _ => return Err(eyre!("pass exactly one of --sitemap or --seed-url")),
    };

    let defaults = &config.defaults;
    Ok(ImportConfig {
        notebook: args.notebook.clone(),
        source,
        curation: CurationOptions {
            prefer_lang: args
                .prefer_lang
                .clone()
                .unwrap_or_else(|| defaults.prefer_lang.clone()),
            keep_prefixes: parse_prefixes(&args.keep_prefix),
            skip_prefixes: parse_prefixes(&args.skip_prefix),
            max_import: args.max_import.unwrap_or(defaults.max_import),
        },
        import: ImportOptions {
            concurrency: args.concurrency.unwrap_or(defaults.concurrency).max(1),
            retries: args.retries.unwrap_or(defaults.retries).max(1),
            ..ImportOptions::default()
        },
        discovery: DiscoveryOptions::from(&config.discovery),
        dry_run: args.dry_run,
    })
}

async fn cmd_import(args: ImportArgs) -> Result<ExitCode> {
    let config = load_config()?;
    let import_config = build_import_config(&args, &config)?;
    let report_path = args
        .report
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.report));

    let kb = Arc::new(HttpKnowledgeBase::from_config(&config)?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; finishing in-flight imports");
            on_interrupt.cancel();
        }
    });

    info!(
        notebook = %args.notebook,
        dry_run = args.dry_run,
        "importing documentation sitemap"
    );

    let reporter = CliProgress::new();
    let report = run_import(&import_config, kb, &reporter, &cancel).await?;
    write_report(&report_path, &report)?;

    print_summary(&report, &report_path);

    Ok(match report.exit_status() {
        ImportStatus::Clean => ExitCode::SUCCESS,
        ImportStatus::PartialFailure => ExitCode::from(2),
    })
}

fn print_summary(report: &ImportReport, report_path: &std::path::Path) {
    println!();
    if report.dry_run {
        println!("  Dry run complete (nothing imported)");
    } else {
        println!("  Import complete");
    }
    println!("  Sitemap:   {}", report.sitemap);
    println!(
        "  Notebook:  {} ({})",
        report.notebook,
        report.notebook_id.as_deref().unwrap_or("not created")
    );
    println!("  Raw URLs:  {}", report.raw_total);
    println!("  Curated:   {}", report.curated_total);
    println!("  Existing:  {}", report.existing_canonical_urls);
    println!("  To import: {}", report.attempted);
    println!("  Added:     {}", report.added_success);
    println!("  Failed:    {}", report.failed_count);
    println!("  Report:    {}", report_path.display());
    println!();
}

// ---------------------------------------------------------------------------
// artifact
// ---------------------------------------------------------------------------

async fn cmd_artifact(notebook: &str, criteria: &SelectionCriteria) -> Result<()> {
    let config = load_config()?;
    let kb = HttpKnowledgeBase::from_config(&config)?;

    let nb = find_or_create_notebook(&kb, notebook, false)
        .await?
        .ok_or_else(|| eyre!("notebook '{notebook}' not found"))?;
    let artifacts = kb.list_artifacts(&nb.id).await?;
    info!(notebook = %nb.id, count = artifacts.len(), "listed artifacts");

    let selection = select_artifact(&artifacts, criteria)?;

    println!();
    println!("  ID:      {}", selection.artifact.id);
    println!("  Title:   {}", selection.artifact.title);
    println!("  Created: {}", selection.artifact.created_at.to_rfc3339());
    println!("  Reason:  {}", selection.reason);
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn import_progress(&self, done: usize, total: usize, succeeded: usize, failed: usize) {
        self.spinner.set_message(format!(
            "Importing [{done}/{total}] success={succeeded} fail={failed}"
        ));
    }

    fn done(&self, _report: &ImportReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
