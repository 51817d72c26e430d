// ABOUTME: Shared test fixtures for building sources, records, and data roots
// ABOUTME: Writes remote exports to temp directories and synthesizes device records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use ridepower::models::FieldValue;
use ridepower::providers::{RecordField, SessionRecord};
use serde_json::json;
use tempfile::TempDir;

/// Epoch second of the first synthetic device sample
pub const START_EPOCH: i64 = 1_700_000_000;

/// Temp data root with an empty `fit_files/` directory
pub fn data_root() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("fit_files")).unwrap();
    root
}

/// Write `contents` to `<root>/fit_files/<name>` and return the relative source path
pub fn write_source(root: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let relative = PathBuf::from("fit_files").join(name);
    fs::write(root.join(&relative), contents).unwrap();
    relative
}

/// Remote API export with `time`, `watts`, and `moving` streams
pub fn remote_export(time: &[i64], watts: &[Option<i64>], moving: &[bool]) -> String {
    json!({
        "time": { "data": time, "series_type": "distance" },
        "watts": { "data": watts },
        "moving": { "data": moving },
    })
    .to_string()
}

/// Remote export of `seconds` consecutive moving samples at constant power
pub fn steady_remote_export(seconds: i64, watts: i64) -> String {
    let time: Vec<i64> = (0..seconds).collect();
    let power: Vec<Option<i64>> = time.iter().map(|_| Some(watts)).collect();
    let moving = vec![true; time.len()];
    remote_export(&time, &power, &moving)
}

/// Timestamp `offset` seconds after the synthetic start
pub fn timestamp(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(START_EPOCH, 0).unwrap() + TimeDelta::seconds(offset)
}

/// Device record with a timestamp plus optional power and speed
pub fn device_record(offset: i64, power: Option<i64>, speed: Option<f64>) -> SessionRecord {
    let mut fields = vec![RecordField::new(
        "timestamp",
        "",
        Some(FieldValue::Timestamp(timestamp(offset))),
    )];
    if let Some(power) = power {
        fields.push(RecordField::new("power", "watts", Some(FieldValue::Int(power))));
    }
    if let Some(speed) = speed {
        fields.push(RecordField::new("speed", "m/s", Some(FieldValue::Float(speed))));
    }
    SessionRecord::new(fields)
}
