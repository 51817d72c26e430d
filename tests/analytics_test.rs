// ABOUTME: Tests for normalized power and peak normalized power calculations
// ABOUTME: Validates constant-power identities, short traces, and window ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::float_cmp, clippy::cast_precision_loss)]

use ridepower::intelligence::{rolling_power_average, AnalyticsConfig, PowerAnalytics};

const TOLERANCE: f64 = 1e-9;

/// Deterministic, uneven trace with surges and coasting
fn surging_trace(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let phase = (i % 97) as f64;
            let surge = if i % 240 < 30 { 250.0 } else { 0.0 };
            150.0 + 40.0 * (phase / 7.0).sin() + surge
        })
        .collect()
}

#[test]
fn test_constant_power_normalizes_to_itself() {
    let analytics = PowerAnalytics::default();
    let np = analytics.normalized_power(&[240.0; 600]).unwrap();
    assert!((np - 240.0).abs() < TOLERANCE);
}

#[test]
fn test_exactly_one_window_of_samples_is_enough() {
    let analytics = PowerAnalytics::default();
    let np = analytics.normalized_power(&[200.0; 30]).unwrap();
    assert!((np - 200.0).abs() < TOLERANCE);
}

#[test]
fn test_fewer_samples_than_window_is_undefined() {
    let analytics = PowerAnalytics::default();
    assert_eq!(analytics.normalized_power(&[300.0; 29]), None);
    assert_eq!(analytics.normalized_power(&[]), None);
}

#[test]
fn test_variable_effort_exceeds_average_power() {
    let trace: Vec<f64> = (0..600)
        .map(|i| if (i / 60) % 2 == 0 { 300.0 } else { 100.0 })
        .collect();
    let np = PowerAnalytics::default().normalized_power(&trace).unwrap();
    assert!(np > 200.0, "NP {np} should exceed the 200 W average");
    assert!(np < 300.0);
}

#[test]
fn test_custom_smoothing_window() {
    let analytics = PowerAnalytics::new(&AnalyticsConfig {
        smoothing_window: 5,
    });
    assert_eq!(analytics.smoothing_window(), 5);
    assert!(analytics.normalized_power(&[100.0; 5]).is_some());
    assert_eq!(analytics.normalized_power(&[100.0; 4]), None);
}

#[test]
fn test_rolling_average_is_trailing() {
    let means = rolling_power_average(&[0.0, 30.0, 60.0, 90.0], 3);
    assert_eq!(means, vec![None, None, Some(30.0), Some(60.0)]);
}

#[test]
fn test_peak_of_constant_power_is_that_power() {
    let peak = PowerAnalytics::default()
        .peak_normalized_power(&[280.0; 1200], 300)
        .unwrap();
    assert!((peak - 280.0).abs() < TOLERANCE);
}

#[test]
fn test_peak_never_increases_with_doubled_window() {
    let analytics = PowerAnalytics::default();
    let trace = surging_trace(3600);
    for window in [60, 150, 300] {
        let short = analytics.peak_normalized_power(&trace, window).unwrap();
        let double = analytics.peak_normalized_power(&trace, 2 * window).unwrap();
        let quadruple = analytics.peak_normalized_power(&trace, 4 * window).unwrap();
        assert!(short + TOLERANCE >= double, "{window}s: {short} < {double}");
        assert!(double + TOLERANCE >= quadruple, "{window}s: {double} < {quadruple}");
    }
}

#[test]
fn test_peak_includes_stopped_samples() {
    let mut trace = vec![200.0; 120];
    trace.resize(180, 0.0);
    let analytics = PowerAnalytics::default();
    let whole = analytics.peak_normalized_power(&trace, 150).unwrap();
    let steady = analytics.peak_normalized_power(&trace, 60).unwrap();
    assert!((steady - 200.0).abs() < TOLERANCE);
    assert!(whole <= steady + TOLERANCE);
}

#[test]
fn test_peak_window_longer_than_trace_is_undefined() {
    let analytics = PowerAnalytics::default();
    assert_eq!(analytics.peak_normalized_power(&[200.0; 100], 101), None);
    assert_eq!(analytics.peak_normalized_power(&[200.0; 100], 0), None);
}

#[test]
fn test_peak_undefined_when_smoothing_leaves_too_few_positions() {
    // 40 samples leave 11 smoothed positions, fewer than a 20-sample window
    let analytics = PowerAnalytics::default();
    assert_eq!(analytics.peak_normalized_power(&[200.0; 40], 20), None);
}
