// ABOUTME: Reduces a wide table of either source kind to the canonical power series
// ABOUTME: Remote exports carry motion directly, device logs derive it from speed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Power Schema Adapter
//!
//! | Source     | duration                 | power           | isMoving                                |
//! |------------|--------------------------|-----------------|-----------------------------------------|
//! | remote API | `time` seconds offset    | `watts`         | `moving`                                |
//! | device log | `timestamp` minus first  | `power (watts)` | `speed` or `enhanced_speed` >= threshold |
//!
//! Unmeasured power becomes zero in both cases. Power values are passed
//! through as recorded, including negative or implausibly large readings.

use chrono::{DateTime, TimeDelta, Utc};
use ridepower_core::constants::analytics::DEFAULT_MOVING_SPEED_THRESHOLD;
use ridepower_core::constants::{device_fields, remote_streams};
use ridepower_core::errors::{PipelineError, PipelineResult};
use ridepower_core::models::{CanonicalTimeSeries, Column, FieldKey, SourceKind, WideTable};
use tracing::debug;

/// Microseconds per second, for fractional elapsed times
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Converts wide tables into [`CanonicalTimeSeries`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSchemaAdapter {
    moving_speed_threshold: f64,
}

impl Default for PowerSchemaAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MOVING_SPEED_THRESHOLD)
    }
}

impl PowerSchemaAdapter {
    /// Adapter classifying device samples at or above `moving_speed_threshold` m/s as moving
    #[must_use]
    pub const fn new(moving_speed_threshold: f64) -> Self {
        Self {
            moving_speed_threshold,
        }
    }

    /// Speed in m/s at or above which a device sample counts as moving
    #[must_use]
    pub const fn moving_speed_threshold(&self) -> f64 {
        self.moving_speed_threshold
    }

    /// Reduce a table to the canonical series according to its source kind
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Schema` when a required column is missing,
    /// has the wrong type, or the time column contains nulls.
    pub fn adapt(&self, table: &WideTable) -> PipelineResult<CanonicalTimeSeries> {
        let series = match table.kind() {
            SourceKind::RemoteApi => Self::adapt_remote(table),
            SourceKind::Device => self.adapt_device(table),
        }?;
        debug!(
            kind = %table.kind(),
            samples = series.len(),
            moving = series.is_moving().iter().filter(|&&m| m).count(),
            "adapted table to canonical series"
        );
        Ok(series)
    }

    fn adapt_remote(table: &WideTable) -> PipelineResult<CanonicalTimeSeries> {
        let time_key = FieldKey::unitless(remote_streams::TIME);
        let duration = elapsed_from_offsets(&time_key, required(table, &time_key)?)?;

        let watts_key = FieldKey::unitless(remote_streams::WATTS);
        let power = zero_filled_power(&watts_key, required(table, &watts_key)?)?;

        let moving_key = FieldKey::unitless(remote_streams::MOVING);
        let is_moving = motion_flags(&moving_key, table)?;

        CanonicalTimeSeries::new(duration, power, is_moving)
    }

    fn adapt_device(&self, table: &WideTable) -> PipelineResult<CanonicalTimeSeries> {
        let time_key = FieldKey::unitless(device_fields::TIMESTAMP);
        let timestamps = required(table, &time_key)?
            .as_timestamps()
            .ok_or_else(|| wrong_type(&time_key, "timestamp", table))?;
        let duration = elapsed_from_timestamps(&time_key, timestamps)?;

        let power_key = FieldKey::with_unit(device_fields::POWER, device_fields::POWER_UNIT);
        let power = zero_filled_power(&power_key, required(table, &power_key)?)?;

        let speed = self.at_or_above_threshold(
            table,
            &FieldKey::with_unit(device_fields::SPEED, device_fields::SPEED_UNIT),
        )?;
        let enhanced_speed = self.at_or_above_threshold(
            table,
            &FieldKey::with_unit(device_fields::ENHANCED_SPEED, device_fields::SPEED_UNIT),
        )?;
        let is_moving = speed
            .into_iter()
            .zip(enhanced_speed)
            .map(|(speed, enhanced)| speed || enhanced)
            .collect();

        CanonicalTimeSeries::new(duration, power, is_moving)
    }

    /// Per-row `speed >= threshold`; an absent column reads as all zeros and a null as false
    fn at_or_above_threshold(&self, table: &WideTable, key: &FieldKey) -> PipelineResult<Vec<bool>> {
        let Some(column) = table.column(key) else {
            return Ok(vec![0.0 >= self.moving_speed_threshold; table.row_count()]);
        };
        let speeds = column
            .to_f64()
            .ok_or_else(|| wrong_type(key, "numeric", table))?;
        Ok(speeds
            .into_iter()
            .map(|speed| speed.is_some_and(|s| s >= self.moving_speed_threshold))
            .collect())
    }
}

fn required<'a>(table: &'a WideTable, key: &FieldKey) -> PipelineResult<&'a Column> {
    table.column(key).ok_or_else(|| {
        PipelineError::schema(format!(
            "{} table is missing required column '{key}'",
            table.kind()
        ))
    })
}

fn wrong_type(key: &FieldKey, expected: &str, table: &WideTable) -> PipelineError {
    let found = table.column(key).map_or("absent", Column::type_name);
    PipelineError::schema(format!("column '{key}' must be {expected}, found {found}"))
}

/// Boolean motion stream with nulls as false
///
/// An empty or all-null stream carries no type of its own and reads as
/// stationary.
fn motion_flags(key: &FieldKey, table: &WideTable) -> PipelineResult<Vec<bool>> {
    let column = required(table, key)?;
    if let Some(flags) = column.as_bools() {
        return Ok(flags.iter().map(|flag| flag.unwrap_or(false)).collect());
    }
    if column.null_count() == column.len() {
        return Ok(vec![false; column.len()]);
    }
    Err(wrong_type(key, "boolean", table))
}

fn null_time(key: &FieldKey) -> PipelineError {
    PipelineError::schema(format!("time column '{key}' contains nulls"))
}

fn zero_filled_power(key: &FieldKey, column: &Column) -> PipelineResult<Vec<f64>> {
    let values = column.to_f64().ok_or_else(|| {
        PipelineError::schema(format!(
            "power column '{key}' must be numeric, found {}",
            column.type_name()
        ))
    })?;
    Ok(values.into_iter().map(|p| p.unwrap_or(0.0)).collect())
}

/// Elapsed time from numeric second offsets, relative to the first sample
fn elapsed_from_offsets(key: &FieldKey, column: &Column) -> PipelineResult<Vec<TimeDelta>> {
    match column {
        Column::Int(values) => {
            let seconds: Vec<i64> = values
                .iter()
                .copied()
                .collect::<Option<_>>()
                .ok_or_else(|| null_time(key))?;
            let Some(&first) = seconds.first() else {
                return Ok(Vec::new());
            };
            seconds
                .iter()
                .map(|&s| {
                    s.checked_sub(first)
                        .and_then(TimeDelta::try_seconds)
                        .ok_or_else(|| {
                            PipelineError::schema(format!("time offset {s} in '{key}' overflows"))
                        })
                })
                .collect()
        }
        Column::Float(values) => {
            let seconds: Vec<f64> = values
                .iter()
                .copied()
                .collect::<Option<_>>()
                .ok_or_else(|| null_time(key))?;
            let Some(&first) = seconds.first() else {
                return Ok(Vec::new());
            };
            Ok(seconds
                .iter()
                .map(|&s| TimeDelta::microseconds(((s - first) * MICROS_PER_SECOND).round() as i64))
                .collect())
        }
        other => Err(PipelineError::schema(format!(
            "time column '{key}' must be numeric seconds, found {}",
            other.type_name()
        ))),
    }
}

/// Elapsed time from absolute timestamps, relative to the first sample
fn elapsed_from_timestamps(
    key: &FieldKey,
    timestamps: &[Option<DateTime<Utc>>],
) -> PipelineResult<Vec<TimeDelta>> {
    let timestamps: Vec<DateTime<Utc>> = timestamps
        .iter()
        .copied()
        .collect::<Option<_>>()
        .ok_or_else(|| null_time(key))?;
    let Some(&first) = timestamps.first() else {
        return Ok(Vec::new());
    };
    Ok(timestamps.iter().map(|&ts| ts - first).collect())
}
