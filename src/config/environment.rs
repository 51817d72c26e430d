// ABOUTME: Environment-based pipeline configuration loading
// ABOUTME: Unset variables fall back to defaults, malformed ones are errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use ridepower_core::models::FieldKey;
use ridepower_intelligence::ConfigError;
use tracing::debug;

use super::{AnalyticsBasis, PipelineConfig};

/// Directory that relative source paths resolve against
pub const DATA_ROOT_VAR: &str = "RIDEPOWER_DATA_ROOT";
/// Path segment naming the source directory
pub const SOURCE_DIR_VAR: &str = "RIDEPOWER_SOURCE_DIR";
/// Path segment substituted for the source directory in artifact paths
pub const CACHE_DIR_VAR: &str = "RIDEPOWER_CACHE_DIR";
/// Device moving-speed threshold in m/s
pub const MOVING_SPEED_THRESHOLD_VAR: &str = "RIDEPOWER_MOVING_SPEED_THRESHOLD";
/// Normalized power smoothing window in samples
pub const SMOOTHING_WINDOW_VAR: &str = "RIDEPOWER_SMOOTHING_WINDOW";
/// Comma-separated device field keys to drop, e.g. `left_right_balance (None)`
pub const IGNORED_FIELDS_VAR: &str = "RIDEPOWER_IGNORED_FIELDS";
/// `recorded` or `dense`
pub const ANALYTICS_BASIS_VAR: &str = "RIDEPOWER_ANALYTICS_BASIS";

/// Raw value of `key`, `None` when unset
fn env_var_opt(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Parsed value of `key`, or `default` when unset
fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    env_var_opt(key)?.map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| ConfigError::Parse(format!("{key}={raw}: {e}")))
    })
}

/// Parse a comma-separated list of field keys, skipping blanks
fn parse_field_keys(raw: &str) -> Result<BTreeSet<FieldKey>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<FieldKey>()
                .map_err(|e| ConfigError::Parse(format!("{IGNORED_FIELDS_VAR}: {e}")))
        })
        .collect()
}

fn parse_basis(raw: &str) -> Result<AnalyticsBasis, ConfigError> {
    match raw.trim() {
        "recorded" => Ok(AnalyticsBasis::Recorded),
        "dense" => Ok(AnalyticsBasis::Dense),
        other => Err(ConfigError::Parse(format!(
            "{ANALYTICS_BASIS_VAR}={other}: expected 'recorded' or 'dense'"
        ))),
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for a malformed value,
    /// `ConfigError::EnvVar` for a non-unicode one, and any error from
    /// [`PipelineConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut config = defaults.clone();

        if let Some(root) = env_var_opt(DATA_ROOT_VAR)? {
            config.layout.root = PathBuf::from(root);
        }
        if let Some(source_dir) = env_var_opt(SOURCE_DIR_VAR)? {
            config.layout.source_dir = source_dir.trim().to_owned();
        }
        if let Some(cache_dir) = env_var_opt(CACHE_DIR_VAR)? {
            config.layout.cache_dir = cache_dir.trim().to_owned();
        }
        config.moving_speed_threshold =
            env_parse_or(MOVING_SPEED_THRESHOLD_VAR, defaults.moving_speed_threshold)?;
        config.analytics.smoothing_window =
            env_parse_or(SMOOTHING_WINDOW_VAR, defaults.analytics.smoothing_window)?;
        if let Some(raw) = env_var_opt(IGNORED_FIELDS_VAR)? {
            config.ignored_fields = parse_field_keys(&raw)?;
        }
        if let Some(raw) = env_var_opt(ANALYTICS_BASIS_VAR)? {
            config.analytics_basis = parse_basis(&raw)?;
        }

        config.validate()?;
        debug!(
            root = %config.layout.root.display(),
            threshold = config.moving_speed_threshold,
            smoothing_window = config.analytics.smoothing_window,
            ignored_fields = config.ignored_fields.len(),
            "loaded pipeline configuration"
        );
        Ok(config)
    }
}
