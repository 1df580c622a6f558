//! filedupe - content-based duplicate file finder
//!
//! Walks a directory tree and reports files whose content is identical,
//! using a size filter, a partial BLAKE3 digest and a full BLAKE3 digest.
//! Confirmed duplicates are written as a plain-text manifest sorted by size.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::ManifestWriter;
use crate::progress::{Progress, ProgressCallback};

/// Run the application for a parsed command line.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the root cannot be
/// scanned, or the manifest cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(&cli).context("Failed to load configuration")?;
    logging::init_logging(config.verbose, config.quiet);

    run_with_config(&config)
}

/// Run the scan and write the manifest for an already resolved configuration.
///
/// # Errors
///
/// Returns an error if the root cannot be scanned or the manifest cannot
/// be written.
pub fn run_with_config(config: &Config) -> Result<ExitCode> {
    log::debug!("Effective configuration: {:?}", config);

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(config.quiet));
    let finder = DuplicateFinder::new(config.finder_config(Some(progress)));

    let (sets, summary) = finder
        .find_duplicates(&config.root)
        .with_context(|| format!("Failed to scan {}", config.root.display()))?;

    if !summary.scan_errors.is_empty() {
        log::warn!(
            "{} paths could not be read during traversal",
            summary.scan_errors.len()
        );
    }
    log::info!(
        "Found {} files that appear to be duplicates ({} sets, {} reclaimable)",
        summary.duplicate_files,
        summary.duplicate_sets,
        summary.reclaimable_display()
    );

    ManifestWriter::new(&sets)
        .write_file(&config.output)
        .with_context(|| format!("Failed to write results to {}", config.output.display()))?;

    log::info!(
        "Wrote {} in {:.2?}",
        config.output.display(),
        summary.scan_duration
    );

    Ok(ExitCode::Success)
}
