// ABOUTME: Ridepower CLI - summarize, densify, and inspect cycling activity sources
// ABOUTME: Thin wrapper over the library pipeline with JSON or table output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Command-line front end for ridepower activity summaries.
//!
//! Usage:
//! ```bash
//! # Normalized power plus 5 and 20 minute peaks for two rides
//! ridepower --root ~/rides summarize fit_files/1.fit fit_files/2.json -w 300 -w 1200
//!
//! # Gap-filled one-second series as JSON lines
//! ridepower dense fit_files/1.fit
//!
//! # Columns of the cached wide table
//! ridepower inspect fit_files/1.fit
//!
//! # Drop cached artifacts so the next run re-parses
//! ridepower invalidate fit_files/1.fit
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ridepower::batch::{summarize_activities, ActivityOutcome};
use ridepower::config::{AnalyticsBasis, PipelineConfig};
use ridepower::logging::LoggingConfig;
use ridepower::pipeline::ActivityPipeline;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "ridepower",
    about = "Cycling power analytics over device logs and remote API exports",
    long_about = "Parses FIT session logs and remote API stream exports, caches the parsed tables, \
                  and reports normalized power and peak normalized power."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory that source paths are resolved against (overrides RIDEPOWER_DATA_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Device moving-speed threshold in m/s (overrides RIDEPOWER_MOVING_SPEED_THRESHOLD)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Compute peaks over the gap-filled one-second series
    #[arg(long, global = true)]
    dense_peaks: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Command {
    /// Normalized power and peak normalized power per activity
    Summarize {
        /// Source files, relative to the root
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Peak window length in seconds (repeatable)
        #[arg(long = "window", short = 'w')]
        windows: Vec<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Gap-filled one-second series of one activity as JSON lines
    Dense {
        /// Source file, relative to the root
        source: PathBuf,
    },

    /// Columns, types, and null counts of one activity's wide table
    Inspect {
        /// Source file, relative to the root
        source: PathBuf,
    },

    /// Remove cached artifacts
    Invalidate {
        /// Source files whose artifacts should be removed
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(root) = &cli.root {
        config.layout.root.clone_from(root);
    }
    if let Some(threshold) = cli.threshold {
        config.moving_speed_threshold = threshold;
    }
    if cli.dense_peaks {
        config.analytics_basis = AnalyticsBasis::Dense;
    }
    config.validate()?;
    Ok(config)
}

fn format_watts(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |watts| format!("{watts:.0}"))
}

fn print_table(outcomes: &[ActivityOutcome], windows: &[usize]) {
    let mut header = format!("{:<40} {:>8} {:>8} {:>6}", "source", "samples", "moving", "NP");
    for window in windows {
        header.push_str(&format!(" {:>8}", format!("{window}s")));
    }
    println!("{header}");

    for outcome in outcomes {
        match outcome {
            ActivityOutcome::Summarized(summary) => {
                let mut line = format!(
                    "{:<40} {:>8} {:>8} {:>6}",
                    summary.source.display(),
                    summary.samples,
                    summary.moving_samples,
                    format_watts(summary.normalized_power)
                );
                for peak in &summary.peaks {
                    line.push_str(&format!(" {:>8}", format_watts(peak.normalized_power)));
                }
                println!("{line}");
            }
            ActivityOutcome::Failed { source, error, .. } => {
                println!("{:<40} failed: {error}", source.display());
            }
        }
    }
}

fn summarize(pipeline: &ActivityPipeline, sources: &[PathBuf], windows: &[usize], format: OutputFormat) -> Result<()> {
    let outcomes = summarize_activities(pipeline, sources, windows);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Table => print_table(&outcomes, windows),
    }
    if outcomes.iter().all(|outcome| outcome.summary().is_none()) {
        bail!("no activity could be summarized");
    }
    Ok(())
}

fn dense(pipeline: &ActivityPipeline, source: &Path) -> Result<()> {
    let series = pipeline.dense_series(source)?;
    for sample in series.samples() {
        println!("{}", serde_json::to_string(&sample)?);
    }
    Ok(())
}

fn inspect(pipeline: &ActivityPipeline, source: &Path) -> Result<()> {
    let table = pipeline.wide_table(source)?;
    println!(
        "{} ({}): {} rows, {} columns",
        source.display(),
        table.kind(),
        table.row_count(),
        table.column_count()
    );
    for (key, column) in table.columns() {
        println!(
            "  {:<40} {:<10} {:>8} nulls",
            key.to_string(),
            column.type_name(),
            column.null_count()
        );
    }
    Ok(())
}

fn invalidate(pipeline: &ActivityPipeline, sources: &[PathBuf]) -> Result<()> {
    for source in sources {
        let removed = pipeline.cache().invalidate(source)?;
        info!(source = %source.display(), removed, "invalidated cache artifact");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    LoggingConfig::from_env().init()?;

    let config = load_config(&cli)?;
    let pipeline = ActivityPipeline::new(&config)?;

    match &cli.command {
        Command::Summarize {
            sources,
            windows,
            format,
        } => summarize(&pipeline, sources, windows, *format),
        Command::Dense { source } => dense(&pipeline, source),
        Command::Inspect { source } => inspect(&pipeline, source),
        Command::Invalidate { sources } => invalidate(&pipeline, sources),
    }
}
