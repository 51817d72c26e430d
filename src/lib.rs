// ABOUTME: Main library entry point for the ridepower activity pipeline
// ABOUTME: Wires source caching, schema adaptation, gap filling, and power analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Ridepower
//!
//! Ingests cycling activity time series from two kinds of source and reduces
//! them to one canonical `(duration, power, isMoving)` series:
//!
//! - **Device logs**: FIT session files, with sparse and double-sampled fields
//! - **Remote API exports**: JSON stream documents keyed by stream name
//!
//! Parsed tables are memoized on disk as Parquet artifacts. On top of the
//! canonical series the crate computes normalized power and peak normalized
//! power, for a single activity or a parallel batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ridepower::config::PipelineConfig;
//! use ridepower::pipeline::ActivityPipeline;
//!
//! # fn main() -> anyhow::Result<()> {
//! let pipeline = ActivityPipeline::new(&PipelineConfig::with_root("/data/rides"))?;
//! let summary = pipeline.summarize(Path::new("fit_files/123.fit"), &[300, 1200])?;
//! println!("NP: {:?}", summary.normalized_power);
//! # Ok(())
//! # }
//! ```

/// Reduction of wide tables to the canonical series
pub mod adapters;

/// Parallel summaries over many activities
pub mod batch;

/// On-disk memoization of parsed tables
pub mod cache;

/// Pipeline configuration and environment loading
pub mod config;

/// Densification onto a one-second axis
pub mod gap_fill;

/// Structured logging setup
pub mod logging;

/// Single-activity pipeline
pub mod pipeline;

pub use ridepower_core::{constants, errors, models};
pub use ridepower_intelligence as intelligence;
pub use ridepower_providers as providers;
