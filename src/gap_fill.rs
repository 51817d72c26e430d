// ABOUTME: Densifies a canonical series onto a contiguous one-second axis
// ABOUTME: Missing seconds become zero power and not moving
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::TimeDelta;
use ridepower_core::errors::{PipelineError, PipelineResult};
use ridepower_core::models::{CanonicalTimeSeries, DenseTimeSeries};
use tracing::debug;

/// Reindex a series so that row `i` is second `i`, for `i` in `0..=floor(max)`
///
/// Samples join only on an exact whole-second duration. Fractional or
/// negative durations have no second to land on and are dropped. When two
/// samples share a second the earlier one wins.
///
/// # Errors
///
/// Returns `PipelineError::Schema` if the maximum duration does not fit in
/// memory-addressable seconds.
pub fn fill_gaps(series: &CanonicalTimeSeries) -> PipelineResult<DenseTimeSeries> {
    let Some(max) = series.max_duration().filter(|max| *max >= TimeDelta::zero()) else {
        return DenseTimeSeries::new(Vec::new(), Vec::new());
    };
    let last = usize::try_from(max.num_seconds())
        .map_err(|_| PipelineError::schema(format!("duration {max} is too long to densify")))?;

    let mut power = vec![0.0; last + 1];
    let mut is_moving = vec![false; last + 1];
    let mut filled = vec![false; last + 1];
    let mut dropped = 0_usize;

    let samples = series
        .duration()
        .iter()
        .zip(series.power())
        .zip(series.is_moving());
    for ((duration, &sample_power), &sample_moving) in samples {
        let second = (duration.subsec_nanos() == 0)
            .then(|| usize::try_from(duration.num_seconds()).ok())
            .flatten();
        match second {
            Some(second) if !filled[second] => {
                power[second] = sample_power;
                is_moving[second] = sample_moving;
                filled[second] = true;
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, seconds = last + 1, "samples without a free whole-second slot");
    }
    DenseTimeSeries::new(power, is_moving)
}
