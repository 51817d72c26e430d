// ABOUTME: Pipeline configuration covering cache layout, motion threshold, and analytics
// ABOUTME: Loaded from the environment with defaults, then validated before use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Pipeline configuration.

/// Environment variable loading
pub mod environment;

use std::collections::BTreeSet;
use std::path::PathBuf;

use ridepower_core::constants::analytics::DEFAULT_MOVING_SPEED_THRESHOLD;
use ridepower_core::models::FieldKey;
use ridepower_intelligence::{AnalyticsConfig, ConfigError};
use ridepower_providers::SessionRecordParser;
use serde::{Deserialize, Serialize};

use crate::cache::CacheLayout;

/// Which form of the series peak normalized power is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsBasis {
    /// Samples as recorded, whatever their spacing
    #[default]
    Recorded,
    /// Gap-filled series with one sample per second
    Dense,
}

/// Everything an [`ActivityPipeline`](crate::pipeline::ActivityPipeline) needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source and artifact directories
    pub layout: CacheLayout,
    /// Device speed in m/s at or above which a sample counts as moving
    pub moving_speed_threshold: f64,
    /// Smoothing settings for normalized power
    pub analytics: AnalyticsConfig,
    /// Device field keys dropped while parsing
    pub ignored_fields: BTreeSet<FieldKey>,
    /// Series form used for peak normalized power
    pub analytics_basis: AnalyticsBasis,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout: CacheLayout::default(),
            moving_speed_threshold: DEFAULT_MOVING_SPEED_THRESHOLD,
            analytics: AnalyticsConfig::default(),
            ignored_fields: SessionRecordParser::default_ignored_fields()
                .into_iter()
                .collect(),
            analytics_basis: AnalyticsBasis::default(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration rooted at `root`
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: CacheLayout::new(root),
            ..Self::default()
        }
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` for a negative or non-finite speed threshold,
    /// an empty directory name, or an invalid analytics configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.moving_speed_threshold.is_finite() || self.moving_speed_threshold < 0.0 {
            return Err(ConfigError::InvalidRange(
                "moving speed threshold must be a finite, non-negative speed",
            ));
        }
        if self.layout.source_dir.is_empty() || self.layout.cache_dir.is_empty() {
            return Err(ConfigError::InvalidRange(
                "source and cache directory names must not be empty",
            ));
        }
        if self.layout.source_dir == self.layout.cache_dir {
            return Err(ConfigError::InvalidRange(
                "cache directory must differ from the source directory",
            ));
        }
        self.analytics.validate()
    }

    /// Device-log parser honouring the ignored field set
    #[must_use]
    pub fn session_record_parser(&self) -> SessionRecordParser {
        SessionRecordParser::new(self.ignored_fields.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_cache_dir_equal_to_source_dir() {
        let mut config = PipelineConfig::default();
        config.layout.cache_dir.clone_from(&config.layout.source_dir);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange(_))
        ));
    }
}
