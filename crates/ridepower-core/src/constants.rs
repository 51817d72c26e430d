// ABOUTME: Well-known field keys, default thresholds, and cache layout constants
// ABOUTME: Shared by parsers, adapters, and analytics so names are spelled once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants organized by pipeline stage.

/// FIT (device log) field names and units
pub mod device_fields {
    /// Time axis of every device-sourced table
    pub const TIMESTAMP: &str = "timestamp";
    /// Instantaneous power
    pub const POWER: &str = "power";
    /// Unit tag of the power field
    pub const POWER_UNIT: &str = "watts";
    /// Wheel or GPS speed
    pub const SPEED: &str = "speed";
    /// High-resolution speed field written by newer head units
    pub const ENHANCED_SPEED: &str = "enhanced_speed";
    /// Unit tag of both speed fields
    pub const SPEED_UNIT: &str = "m/s";
    /// Pedal balance, recorded with inconsistent encodings across devices
    pub const LEFT_RIGHT_BALANCE: &str = "left_right_balance";
}

/// Remote stream export names
pub mod remote_streams {
    /// Seconds since activity start
    pub const TIME: &str = "time";
    /// Power in watts
    pub const WATTS: &str = "watts";
    /// Moving flag computed by the remote service
    pub const MOVING: &str = "moving";
}

/// Canonical series column names
pub mod canonical {
    /// Elapsed time since the first sample
    pub const DURATION: &str = "duration";
    /// Zero-filled power
    pub const POWER: &str = "power";
    /// Motion flag
    pub const IS_MOVING: &str = "isMoving";
}

/// Analytics defaults
pub mod analytics {
    /// Trailing smoothing window applied before the 4th-power mean
    pub const DEFAULT_SMOOTHING_WINDOW: usize = 30;
    /// Speed at or above which a device sample counts as moving (m/s)
    pub const DEFAULT_MOVING_SPEED_THRESHOLD: f64 = 1.5;
    /// Exponent of the power mean behind normalized power
    pub const POWER_MEAN_EXPONENT: i32 = 4;
}

/// On-disk cache layout
pub mod cache {
    /// Directory segment holding raw sources
    pub const DEFAULT_SOURCE_DIR: &str = "fit_files";
    /// Directory segment that replaces it for artifacts
    pub const DEFAULT_CACHE_DIR: &str = "cache";
    /// Artifact file extension
    pub const ARTIFACT_EXTENSION: &str = "parquet";
    /// Schema metadata key recording the source kind
    pub const META_SOURCE_KIND: &str = "ridepower.source_kind";
    /// Field metadata key recording the field name
    pub const META_FIELD_NAME: &str = "ridepower.field_name";
    /// Field metadata key recording the field unit
    pub const META_FIELD_UNIT: &str = "ridepower.field_unit";
}

/// Source file extensions
pub mod extensions {
    /// Device session log
    pub const FIT: &str = "fit";
    /// Remote stream export
    pub const JSON: &str = "json";
}
