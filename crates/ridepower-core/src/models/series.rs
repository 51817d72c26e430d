// ABOUTME: Canonical (duration, power, isMoving) series and its dense 1 Hz form
// ABOUTME: Both source kinds reduce to these shapes before analytics run
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::TimeDelta;
use serde::Serialize;

use crate::constants::canonical;
use crate::errors::{PipelineError, PipelineResult};

/// Per-sample power and motion with elapsed time since the first sample
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTimeSeries {
    duration: Vec<TimeDelta>,
    power: Vec<f64>,
    is_moving: Vec<bool>,
}

impl CanonicalTimeSeries {
    /// Assemble a series from its three columns
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Schema` when the columns differ in length.
    pub fn new(duration: Vec<TimeDelta>, power: Vec<f64>, is_moving: Vec<bool>) -> PipelineResult<Self> {
        if power.len() != duration.len() || is_moving.len() != duration.len() {
            return Err(PipelineError::schema(format!(
                "canonical columns differ in length: {}={}, {}={}, {}={}",
                canonical::DURATION,
                duration.len(),
                canonical::POWER,
                power.len(),
                canonical::IS_MOVING,
                is_moving.len()
            )));
        }
        Ok(Self {
            duration,
            power,
            is_moving,
        })
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.duration.len()
    }

    /// Whether the series has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.duration.is_empty()
    }

    /// Elapsed time per sample
    #[must_use]
    pub fn duration(&self) -> &[TimeDelta] {
        &self.duration
    }

    /// Power per sample, zero where unmeasured
    #[must_use]
    pub fn power(&self) -> &[f64] {
        &self.power
    }

    /// Motion flag per sample
    #[must_use]
    pub fn is_moving(&self) -> &[bool] {
        &self.is_moving
    }

    /// Power of the moving samples only, in order
    #[must_use]
    pub fn moving_power(&self) -> Vec<f64> {
        self.power
            .iter()
            .zip(&self.is_moving)
            .filter_map(|(&power, &moving)| moving.then_some(power))
            .collect()
    }

    /// Largest elapsed time, `None` for an empty series
    #[must_use]
    pub fn max_duration(&self) -> Option<TimeDelta> {
        self.duration.iter().max().copied()
    }
}

/// One second of a dense series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DenseSample {
    /// Offset from the first sample in whole seconds
    pub second: usize,
    /// Power in watts
    pub power: f64,
    /// Motion flag
    #[serde(rename = "isMoving")]
    pub is_moving: bool,
}

/// Canonical series reindexed so that row `i` is second `i`
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTimeSeries {
    power: Vec<f64>,
    is_moving: Vec<bool>,
}

impl DenseTimeSeries {
    /// Assemble a dense series where the index is the second offset
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Schema` when the columns differ in length.
    pub fn new(power: Vec<f64>, is_moving: Vec<bool>) -> PipelineResult<Self> {
        if power.len() != is_moving.len() {
            return Err(PipelineError::schema(format!(
                "dense columns differ in length: {}={}, {}={}",
                canonical::POWER,
                power.len(),
                canonical::IS_MOVING,
                is_moving.len()
            )));
        }
        Ok(Self { power, is_moving })
    }

    /// Number of seconds covered, `max + 1` for a non-empty series
    #[must_use]
    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// Whether the series has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    /// Power per second
    #[must_use]
    pub fn power(&self) -> &[f64] {
        &self.power
    }

    /// Motion flag per second
    #[must_use]
    pub fn is_moving(&self) -> &[bool] {
        &self.is_moving
    }

    /// Power of the moving seconds only, in order
    #[must_use]
    pub fn moving_power(&self) -> Vec<f64> {
        self.power
            .iter()
            .zip(&self.is_moving)
            .filter_map(|(&power, &moving)| moving.then_some(power))
            .collect()
    }

    /// Row view of the series
    pub fn samples(&self) -> impl Iterator<Item = DenseSample> + '_ {
        self.power
            .iter()
            .zip(&self.is_moving)
            .enumerate()
            .map(|(second, (&power, &is_moving))| DenseSample {
                second,
                power,
                is_moving,
            })
    }
}
