// ABOUTME: Physiological load analytics over canonical power series
// ABOUTME: Normalized power and peak normalized power built on a trailing rolling mean
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Ridepower Intelligence
//!
//! Pure, stateless power analytics. Inputs are plain power slices so the
//! same functions serve canonical, dense, and moving-only series; results are
//! `Option<f64>` where `None` means the input was too short for the window.

/// Rolling power average, normalized power, and peak normalized power
pub mod analytics;
/// Analytics configuration and validation
pub mod config;

pub use analytics::{rolling_mean, rolling_power_average, PowerAnalytics};
pub use config::{AnalyticsConfig, ConfigError};
