//! CLI for SDK automation.
//!
//! Handles one specification pull request event: opened or updated pull
//! requests generate SDK code and generation pull requests, closed ones close
//! or merge them.

use clap::Parser;
use sdk_automation::{
    load_event, load_language_registry, load_specification_configuration, CommandGenerator,
    FilesystemBlobStorage, GitHubHost, ProcessCommandRunner, ProcessGit, ReqwestHttpClient,
    RunSummary, Runner, RunnerConfig, RunnerError, Services,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Timeout for configuration fetches and existence probes.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// SDK Automation - Generate SDKs for a specification pull request and manage their pull requests.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the specification pull request event (JSON).
    #[arg(long)]
    event: PathBuf,

    /// Path to the specification repository configuration (JSON).
    #[arg(long)]
    specification_config: PathBuf,

    /// Path to language overrides (TOML).
    #[arg(long)]
    languages: Option<PathBuf>,

    /// Folder blobs (logs, records, artifacts) are stored in.
    #[arg(long)]
    storage_path: PathBuf,

    /// Public base URL the storage folder is served from.
    #[arg(long)]
    storage_url: Option<String>,

    /// Folder SDK repositories are cloned into.
    #[arg(long, default_value = "work/")]
    working_folder: PathBuf,

    /// Prefix for every blob path.
    #[arg(long, default_value = "")]
    blob_prefix: String,

    /// Maximum SDK repositories processed at once.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Keep clone folders after processing.
    #[arg(long)]
    keep_clones: bool,

    /// Writes the run summary as JSON to this file.
    #[arg(long)]
    summary_file: Option<PathBuf>,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Explicitly install aws-lc-rs as the crypto provider for rustls
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    init_tracing();

    let args = Args::parse();
    let summary_file = args.summary_file.clone();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);
            if let Some(path) = summary_file {
                if let Err(e) = write_summary(&path, &summary) {
                    error!(path = %path.display(), error = %e, "Failed to write summary file");
                    return ExitCode::from(2);
                }
            }

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let event = load_event(&args.event)?;
    let specification_config = load_specification_configuration(&args.specification_config)?;
    let languages = load_language_registry(args.languages.as_deref())?;

    let mut storage = FilesystemBlobStorage::new(&args.storage_path);
    if let Some(url) = args.storage_url {
        storage = storage.with_base_url(url);
    }
    let commands = Arc::new(ProcessCommandRunner::new());
    let services = Services {
        git: Arc::new(ProcessGit::new()),
        generator: Arc::new(CommandGenerator::new(commands.clone())),
        commands,
        host: Arc::new(GitHubHost::from_token(&args.token)?),
        storage: Arc::new(storage),
        http: Arc::new(ReqwestHttpClient::new(HTTP_TIMEOUT)?),
    };

    let config = RunnerConfig::new(args.working_folder, Some(args.token), args.concurrency)
        .with_blob_prefix(args.blob_prefix)
        .with_keep_clones(args.keep_clones);

    info!(
        number = event.pull_request.number,
        action = ?event.action,
        "Handling specification pull request event"
    );
    Runner::new(config, services, specification_config, languages)
        .run(&event)
        .await
}

/// Writes the run summary as pretty JSON.
fn write_summary(path: &Path, summary: &RunSummary) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    if let Some(iteration) = summary.iteration {
        println!("  Iteration: {iteration}");
    }
    println!("  SDK repositories succeeded: {}", summary.repositories_succeeded);
    println!("  SDK repositories with warnings: {}", summary.repositories_warned);
    println!("  SDK repositories failed: {}", summary.repositories_failed);
    println!("  SDK repositories skipped: {}", summary.repositories_skipped);
    println!("  PRs created: {}", summary.prs_created);
    println!("  PRs updated: {}", summary.prs_updated);
    println!("  PRs closed: {}", summary.prs_closed);
    println!("  PRs merged: {}", summary.prs_merged);
    println!("  PRs failed: {}", summary.prs_failed);
}
