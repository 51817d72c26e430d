// ABOUTME: Per-activity pipeline from source path to normalized power summary
// ABOUTME: Cache lookup, schema adaptation, optional gap filling, then analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Activity Pipeline
//!
//! ```text
//! source path -> SourceCache -> WideTable -> PowerSchemaAdapter -> CanonicalTimeSeries
//!                                                                   |-> fill_gaps -> DenseTimeSeries
//!                                                                   '-> PowerAnalytics
//! ```
//!
//! Normalized power is always computed over the moving samples of the
//! recorded series. Peak normalized power runs over the full power trace of
//! either the recorded or the dense series, per [`AnalyticsBasis`].

use std::path::{Path, PathBuf};

use ridepower_core::errors::PipelineResult;
use ridepower_core::models::{CanonicalTimeSeries, DenseTimeSeries, SourceKind, WideTable};
use ridepower_intelligence::{ConfigError, PowerAnalytics};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::adapters::PowerSchemaAdapter;
use crate::cache::SourceCache;
use crate::config::{AnalyticsBasis, PipelineConfig};
use crate::gap_fill::fill_gaps;

/// Peak normalized power for one window length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakPower {
    /// Window length in samples
    pub window_seconds: usize,
    /// Best normalized power over any window, `None` when the trace is too short
    pub normalized_power: Option<f64>,
}

/// Power summary of one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Source the summary was computed from
    pub source: PathBuf,
    /// Kind of source
    pub kind: SourceKind,
    /// Samples in the canonical series
    pub samples: usize,
    /// Samples flagged as moving
    pub moving_samples: usize,
    /// Normalized power of the moving samples
    pub normalized_power: Option<f64>,
    /// Peak normalized power per requested window, in request order
    pub peaks: Vec<PeakPower>,
}

/// Turns source files into canonical series and power summaries
#[derive(Debug, Clone, Default)]
pub struct ActivityPipeline {
    cache: SourceCache,
    adapter: PowerSchemaAdapter,
    analytics: PowerAnalytics,
    basis: AnalyticsBasis,
}

impl ActivityPipeline {
    /// Build a pipeline from a configuration
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cache: SourceCache::new(config.layout.clone(), config.session_record_parser()),
            adapter: PowerSchemaAdapter::new(config.moving_speed_threshold),
            analytics: PowerAnalytics::new(&config.analytics),
            basis: config.analytics_basis,
        })
    }

    /// Source cache backing this pipeline
    #[must_use]
    pub const fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Analytics calculator in use
    #[must_use]
    pub const fn analytics(&self) -> &PowerAnalytics {
        &self.analytics
    }

    /// Wide table for a source, from the cache when available
    ///
    /// # Errors
    ///
    /// See [`SourceCache::get`].
    pub fn wide_table(&self, source: &Path) -> PipelineResult<WideTable> {
        let _span = info_span!("activity", source = %source.display()).entered();
        self.cache.get(source)
    }

    /// Canonical series for a source
    ///
    /// # Errors
    ///
    /// Any load error, or a schema error from [`PowerSchemaAdapter::adapt`].
    pub fn canonical_series(&self, source: &Path) -> PipelineResult<CanonicalTimeSeries> {
        let _span = info_span!("activity", source = %source.display()).entered();
        self.adapter.adapt(&self.cache.get(source)?)
    }

    /// Gap-filled one-second series for a source
    ///
    /// # Errors
    ///
    /// Same as [`ActivityPipeline::canonical_series`].
    pub fn dense_series(&self, source: &Path) -> PipelineResult<DenseTimeSeries> {
        fill_gaps(&self.canonical_series(source)?)
    }

    /// Normalized power over the moving samples of a source
    ///
    /// # Errors
    ///
    /// Same as [`ActivityPipeline::canonical_series`].
    pub fn normalized_power(&self, source: &Path) -> PipelineResult<Option<f64>> {
        let series = self.canonical_series(source)?;
        Ok(self.analytics.normalized_power(&series.moving_power()))
    }

    /// Peak normalized power of a source over `window_seconds`
    ///
    /// # Errors
    ///
    /// Same as [`ActivityPipeline::canonical_series`].
    pub fn peak_normalized_power(
        &self,
        source: &Path,
        window_seconds: usize,
    ) -> PipelineResult<Option<f64>> {
        let series = self.canonical_series(source)?;
        let peak = match self.basis {
            AnalyticsBasis::Recorded => {
                self.analytics.peak_normalized_power(series.power(), window_seconds)
            }
            AnalyticsBasis::Dense => self
                .analytics
                .peak_normalized_power(fill_gaps(&series)?.power(), window_seconds),
        };
        Ok(peak)
    }

    /// Summarize one activity with peak normalized power for each window
    ///
    /// # Errors
    ///
    /// Same as [`ActivityPipeline::canonical_series`].
    pub fn summarize(&self, source: &Path, peak_windows: &[usize]) -> PipelineResult<ActivitySummary> {
        let _span = info_span!("activity", source = %source.display()).entered();
        let table = self.cache.get(source)?;
        let kind = table.kind();
        let series = self.adapter.adapt(&table)?;
        let moving_power = series.moving_power();
        let normalized_power = self.analytics.normalized_power(&moving_power);

        let dense;
        let trace = match self.basis {
            AnalyticsBasis::Recorded => series.power(),
            AnalyticsBasis::Dense => {
                dense = fill_gaps(&series)?;
                dense.power()
            }
        };
        let peaks = peak_windows
            .iter()
            .map(|&window_seconds| PeakPower {
                window_seconds,
                normalized_power: self.analytics.peak_normalized_power(trace, window_seconds),
            })
            .collect();

        info!(
            source = %source.display(),
            kind = %kind,
            samples = series.len(),
            moving_samples = moving_power.len(),
            normalized_power = ?normalized_power,
            "summarized activity"
        );
        Ok(ActivitySummary {
            source: source.to_path_buf(),
            kind,
            samples: series.len(),
            moving_samples: moving_power.len(),
            normalized_power,
            peaks,
        })
    }
}
