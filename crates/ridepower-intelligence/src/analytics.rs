// ABOUTME: Rolling power average, normalized power, and peak normalized power
// ABOUTME: 4th-power means over a trailing smoothed trace, undefined for short input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Power Analytics
//!
//! Normalized power is the 4th-power mean of a 30-sample trailing average of
//! power:
//!
//! `NP = ⁴√(mean(rolling_mean_30(power)⁴))`
//!
//! Raising to the 4th power weights hard surges far more than a plain mean
//! does, which is what makes NP track physiological cost. Peak normalized
//! power applies a second trailing mean of width `window_seconds` to the 4th
//! powers before taking the root, then reports the best window.
//!
//! # Scientific References
//!
//! - Coggan, A. & Allen, H. (2010). "Training and Racing with a Power Meter." `VeloPress`.

use ridepower_core::constants::analytics::POWER_MEAN_EXPONENT;
use tracing::debug;

use crate::config::AnalyticsConfig;

/// Trailing rolling mean over nullable values
///
/// Position `i` averages `values[i + 1 - window..=i]`. The first
/// `window - 1` positions, and any window containing a null, are `None`.
/// A zero window yields all `None`.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Window sizes are far below 2^53
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let width = window as f64;
    let mut means = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    let mut nulls_in_window = 0_usize;

    for (index, value) in values.iter().enumerate() {
        match value {
            Some(v) => sum += v,
            None => nulls_in_window += 1,
        }
        if index >= window {
            match values[index - window] {
                Some(v) => sum -= v,
                None => nulls_in_window -= 1,
            }
        }
        let full = index + 1 >= window;
        means.push((full && nulls_in_window == 0).then(|| sum / width));
    }

    means
}

/// Trailing rolling mean of a power trace
#[must_use]
pub fn rolling_power_average(power: &[f64], window: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = power.iter().copied().map(Some).collect();
    rolling_mean(&values, window)
}

/// 4th root, clamping the tiny negatives rolling sums can drift to
fn fourth_root(value: f64) -> f64 {
    value.max(0.0).powf(1.0 / f64::from(POWER_MEAN_EXPONENT))
}

/// Stateless calculator for normalized power metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerAnalytics {
    smoothing_window: usize,
}

impl Default for PowerAnalytics {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default())
    }
}

impl PowerAnalytics {
    /// Calculator using the configured smoothing window
    #[must_use]
    pub const fn new(config: &AnalyticsConfig) -> Self {
        Self {
            smoothing_window: config.smoothing_window,
        }
    }

    /// Smoothing window in samples
    #[must_use]
    pub const fn smoothing_window(&self) -> usize {
        self.smoothing_window
    }

    /// Trailing average of power over the smoothing window
    #[must_use]
    pub fn rolling_power_average(&self, power: &[f64]) -> Vec<Option<f64>> {
        rolling_power_average(power, self.smoothing_window)
    }

    /// Smoothed power raised to the 4th power, null where smoothing is undefined
    fn smoothed_fourth_powers(&self, power: &[f64]) -> Vec<Option<f64>> {
        self.rolling_power_average(power)
            .into_iter()
            .map(|mean| mean.map(|p| p.powi(POWER_MEAN_EXPONENT)))
            .collect()
    }

    /// Normalized power of a pre-filtered trace
    ///
    /// The caller is expected to pass only moving samples; this function
    /// has no notion of motion. Returns `None` when the trace is shorter than
    /// the smoothing window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Sample counts are far below 2^53
    pub fn normalized_power(&self, moving_power: &[f64]) -> Option<f64> {
        let fourth_powers: Vec<f64> = self
            .smoothed_fourth_powers(moving_power)
            .into_iter()
            .flatten()
            .collect();
        if fourth_powers.is_empty() {
            debug!(
                samples = moving_power.len(),
                window = self.smoothing_window,
                "too few samples for normalized power"
            );
            return None;
        }
        let mean = fourth_powers.iter().sum::<f64>() / fourth_powers.len() as f64;
        Some(fourth_root(mean))
    }

    /// Best normalized power over any trailing window of `window_seconds` samples
    ///
    /// Smoothing runs over the full unfiltered trace. Returns `None` when
    /// `window_seconds` is zero, exceeds the trace length, or leaves no
    /// position where both rolling means are defined.
    #[must_use]
    pub fn peak_normalized_power(&self, power: &[f64], window_seconds: usize) -> Option<f64> {
        if window_seconds == 0 || window_seconds > power.len() {
            debug!(
                samples = power.len(),
                window_seconds, "peak window unavailable for trace length"
            );
            return None;
        }
        let fourth_powers = self.smoothed_fourth_powers(power);
        rolling_mean(&fourth_powers, window_seconds)
            .into_iter()
            .flatten()
            .map(fourth_root)
            .max_by(f64::total_cmp)
    }
}
