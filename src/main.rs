//! CLI entry point for the product harvester.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use harvester_core::fetch::{
    BackoffSchedule, DiagnosticSink, Fetcher, FileDiagnostics, NoDiagnostics, RetryPolicy,
    Session,
};
use harvester_core::product::{NormalizeOptions, Normalizer};
use harvester_core::{DualSink, Harvester, read_identifiers};
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::{Settings, load_file_config};
use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let file_config = load_file_config(args.config.as_deref())?;
    if let Some((path, _)) = &file_config {
        info!(path = %path.display(), "loaded config file");
    }
    let settings = Settings::resolve(&args, file_config.as_ref().map(|(_, cfg)| cfg))?;
    debug!(?settings, "effective settings");

    let identifiers = read_identifiers(&settings.input)
        .context("Cannot start without an identifier list")?;
    if identifiers.is_empty() {
        warn!(path = %settings.input.display(), "identifier list is empty");
    }
    info!(count = identifiers.len(), "loaded identifiers");

    let sinks = DualSink::open(&settings.spreadsheet, &settings.csv)
        .context("Failed to initialize output files")?;

    let session = Session::with_base_url(settings.base_url.clone(), settings.request_timeout)
        .context("Failed to build HTTP client")?;
    let diagnostics: Arc<dyn DiagnosticSink> = match &settings.diagnostics_dir {
        Some(dir) => Arc::new(FileDiagnostics::new(dir)),
        None => Arc::new(NoDiagnostics),
    };
    let policy = RetryPolicy::new(settings.max_attempts, BackoffSchedule::default());
    let fetcher = Fetcher::with_diagnostics(session, policy, diagnostics);

    let normalizer = Normalizer::new(NormalizeOptions {
        product_url_base: settings.product_url_base.clone(),
        currency: settings.currency.clone(),
        brand: settings.brand.clone(),
    });

    let mut harvester = Harvester::new(fetcher, normalizer, sinks);
    let stats = harvester.run(&identifiers).await;

    info!(
        spreadsheet = %settings.spreadsheet.display(),
        csv = %settings.csv.display(),
        written = stats.succeeded(),
        skipped = stats.skipped(),
        total = stats.total(),
        "Harvest complete"
    );

    Ok(())
}
