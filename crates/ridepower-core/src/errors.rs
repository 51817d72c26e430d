// ABOUTME: Error types for activity ingestion, schema adaptation, and caching
// ABOUTME: Each variant is scoped to a single activity and never retried internally
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Pipeline Error Types
//!
//! Every stage of the pipeline returns [`PipelineResult`]. Failures are
//! fail-fast: they propagate out of the per-activity call and it is up to the
//! batch layer to decide whether to skip to the next activity.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the workspace
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Coarse error category, for callers that branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Source data is internally inconsistent and cannot be repaired safely
    DataIntegrity,
    /// A required column is missing, mistyped, or misaligned
    Schema,
    /// The source file does not exist
    NotFound,
    /// The source extension maps to no known parser
    UnsupportedSource,
    /// The source bytes could not be decoded
    Decode,
    /// Reading or writing the cache artifact failed
    Cache,
    /// Underlying filesystem failure
    Io,
}

/// Errors raised while turning a source file into canonical series
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Double-sampled field whose even and odd sub-streams cannot be told apart
    #[error("Data integrity error in field '{field}': {reason}")]
    DataIntegrity {
        /// Textual key of the offending field
        field: String,
        /// Which resolution rule failed
        reason: String,
    },

    /// Missing time axis or motion column, misaligned streams, absent canonical column
    #[error("Schema error: {0}")]
    Schema(String),

    /// Source file does not exist
    #[error("Source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Extension is neither a device log nor a remote stream export
    #[error("Unsupported source: {}", .0.display())]
    UnsupportedSource(PathBuf),

    /// FIT decoding failure
    #[error("Failed to decode device log: {0}")]
    DeviceLog(String),

    /// Remote stream export is not valid JSON
    #[error("Failed to decode remote stream export: {0}")]
    RemoteStream(String),

    /// Arrow or Parquet failure while reading or writing an artifact
    #[error("Cache artifact error: {0}")]
    Cache(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PipelineError {
    /// Create a data integrity error for a named field
    #[must_use]
    pub fn data_integrity(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a schema error
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a cache artifact error
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Error category of this failure
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DataIntegrity { .. } => ErrorKind::DataIntegrity,
            Self::Schema(_) => ErrorKind::Schema,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedSource(_) => ErrorKind::UnsupportedSource,
            Self::DeviceLog(_) | Self::RemoteStream(_) => ErrorKind::Decode,
            Self::Cache(_) => ErrorKind::Cache,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            PipelineError::data_integrity("power (watts)", "both").kind(),
            ErrorKind::DataIntegrity
        );
        assert_eq!(PipelineError::schema("x").kind(), ErrorKind::Schema);
        assert_eq!(
            PipelineError::DeviceLog("bad header".to_owned()).kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            PipelineError::NotFound(PathBuf::from("fit_files/1.fit")).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_display_includes_field() {
        let err = PipelineError::data_integrity("heart_rate (bpm)", "both sub-streams carry values");
        assert_eq!(
            err.to_string(),
            "Data integrity error in field 'heart_rate (bpm)': both sub-streams carry values"
        );
    }
}
