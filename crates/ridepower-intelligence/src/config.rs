// ABOUTME: Configuration for power analytics with validation of window sizes
// ABOUTME: Also defines the configuration error type shared by the pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Analytics configuration.

use std::env;

use ridepower_core::constants::analytics::DEFAULT_SMOOTHING_WINDOW;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Value outside acceptable range
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// Environment variable access error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] env::VarError),

    /// Failed to parse configuration value
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Settings for the rolling statistics behind normalized power
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing smoothing window in samples
    pub smoothing_window: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

impl AnalyticsConfig {
    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` for a zero smoothing window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing_window == 0 {
            return Err(ConfigError::InvalidRange(
                "smoothing window must be at least one sample",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_valid() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.smoothing_window, DEFAULT_SMOOTHING_WINDOW);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let config = AnalyticsConfig { smoothing_window: 0 };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange(_))));
    }
}
