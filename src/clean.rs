//! Command handler: builds a [`CleanerConfig`] from the optional YAML file and
//! the command-line overrides, runs the pipeline and prints the report.

use std::fs;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cli::CleanArgs,
    config::CleanerConfig,
    error::CleanError,
    pipeline::Cleaner,
};

/// Prefixes the failure kind so the user sees e.g. `WriteError: ...`.
fn with_kind(err: CleanError) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(kind)
}

pub fn build_config(args: &CleanArgs) -> Result<CleanerConfig> {
    let mut config = match &args.config {
        Some(path) => CleanerConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => CleanerConfig::default(),
    };
    let date_cols = args
        .date_cols
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect::<Vec<_>>();
    if !date_cols.is_empty() {
        config.dates.names = date_cols;
    }
    if let Some(policy) = args.unparseable_dates {
        config.dates.on_unparseable = policy;
    }
    if args.sheet.is_some() {
        config.sheet = args.sheet.clone();
    }
    if args.out.is_some() {
        config.output = args.out.clone();
    }
    if args.delimiter.is_some() {
        config.delimiter = args.delimiter;
    }
    if args.input_encoding.is_some() {
        config.input_encoding = args.input_encoding.clone();
    }
    if args.no_trim {
        config.trim_whitespace = false;
    }
    debug!("Date columns: {:?}", config.dates.describe());
    Ok(config)
}

pub fn execute(args: &CleanArgs) -> Result<()> {
    let config = build_config(args)?;
    let cleaner = Cleaner::new(config).context("Validating configuration")?;
    info!(
        "Cleaning '{}' -> {:?}",
        args.input.display(),
        cleaner.output_path_for(&args.input)
    );

    let outcome = cleaner.run(&args.input).map_err(with_kind)?;
    println!("{}", outcome.report);

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&outcome.report)
            .context("Serializing cleaning report")?;
        fs::write(path, json).with_context(|| format!("Writing report to {path:?}"))?;
        info!("Report written to {path:?}");
    }

    match outcome.written {
        Ok(path) => {
            info!("Clean complete: {}", path.display());
            Ok(())
        }
        Err(err) => Err(with_kind(err).context(format!(
            "Cleaned {} row(s) but the output could not be written",
            outcome.report.rows_after()
        ))),
    }
}
