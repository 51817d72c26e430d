// ABOUTME: Tests for environment-based pipeline and logging configuration
// ABOUTME: Serialized because they mutate process-wide environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::env;
use std::path::PathBuf;

use ridepower::config::environment::{
    ANALYTICS_BASIS_VAR, CACHE_DIR_VAR, DATA_ROOT_VAR, IGNORED_FIELDS_VAR,
    MOVING_SPEED_THRESHOLD_VAR, SMOOTHING_WINDOW_VAR, SOURCE_DIR_VAR,
};
use ridepower::config::{AnalyticsBasis, PipelineConfig};
use ridepower::intelligence::ConfigError;
use ridepower::logging::{LogFormat, LoggingConfig};
use ridepower::models::FieldKey;
use serial_test::serial;

const ALL_VARS: [&str; 7] = [
    DATA_ROOT_VAR,
    SOURCE_DIR_VAR,
    CACHE_DIR_VAR,
    MOVING_SPEED_THRESHOLD_VAR,
    SMOOTHING_WINDOW_VAR,
    IGNORED_FIELDS_VAR,
    ANALYTICS_BASIS_VAR,
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_when_environment_is_empty() {
    clear_env();
    let config = PipelineConfig::from_env().unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.moving_speed_threshold, 1.5);
    assert_eq!(config.analytics.smoothing_window, 30);
    assert!(config
        .ignored_fields
        .contains(&FieldKey::unitless("left_right_balance")));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var(DATA_ROOT_VAR, "/srv/rides");
    env::set_var(SOURCE_DIR_VAR, "raw");
    env::set_var(CACHE_DIR_VAR, "tables");
    env::set_var(MOVING_SPEED_THRESHOLD_VAR, " 2.25 ");
    env::set_var(SMOOTHING_WINDOW_VAR, "20");
    env::set_var(IGNORED_FIELDS_VAR, "heart_rate (bpm),cadence (rpm)");
    env::set_var(ANALYTICS_BASIS_VAR, "dense");

    let config = PipelineConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.layout.root, PathBuf::from("/srv/rides"));
    assert_eq!(config.layout.source_dir, "raw");
    assert_eq!(config.layout.cache_dir, "tables");
    assert_eq!(config.moving_speed_threshold, 2.25);
    assert_eq!(config.analytics.smoothing_window, 20);
    assert_eq!(config.ignored_fields.len(), 2);
    assert!(config
        .ignored_fields
        .contains(&FieldKey::with_unit("cadence", "rpm")));
    assert_eq!(config.analytics_basis, AnalyticsBasis::Dense);
}

#[test]
#[serial]
fn test_malformed_threshold_is_parse_error() {
    clear_env();
    env::set_var(MOVING_SPEED_THRESHOLD_VAR, "fast");
    let result = PipelineConfig::from_env();
    clear_env();
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
#[serial]
fn test_zero_smoothing_window_fails_validation() {
    clear_env();
    env::set_var(SMOOTHING_WINDOW_VAR, "0");
    let result = PipelineConfig::from_env();
    clear_env();
    assert!(matches!(result, Err(ConfigError::InvalidRange(_))));
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    env::set_var("LOG_FORMAT", "json");
    env::set_var("LOG_INCLUDE_LOCATION", "1");
    env::remove_var("LOG_INCLUDE_THREAD");
    let config = LoggingConfig::from_env();
    env::remove_var("LOG_FORMAT");
    env::remove_var("LOG_INCLUDE_LOCATION");

    assert_eq!(config.format, LogFormat::Json);
    assert!(config.include_location);
    assert!(!config.include_thread);
}
