// ABOUTME: Activity source parsers producing wide tables from raw files
// ABOUTME: Device FIT session logs and remote API JSON stream exports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Ridepower Providers
//!
//! Each provider turns one source file into a [`WideTable`] tagged with its
//! [`SourceKind`]. Providers never touch the cache; callers decide whether a
//! parse is needed.

use std::path::Path;

use ridepower_core::errors::{PipelineError, PipelineResult};
use ridepower_core::models::{SourceKind, WideTable};

/// Remote API JSON stream export parser
pub mod remote_stream;
/// Device FIT session log parser and record accumulator
pub mod session_record;

pub use remote_stream::RemoteStreamParser;
pub use session_record::{RecordAccumulator, RecordField, SessionRecord, SessionRecordParser};

/// A parser for one kind of activity source
pub trait SourceParser: Send + Sync {
    /// Kind of table this parser produces
    fn kind(&self) -> SourceKind;

    /// Parse a source file into a wide table
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NotFound` when the file is missing, a decode
    /// error when its bytes are malformed, and schema or integrity errors
    /// when its content cannot form a consistent table.
    fn parse(&self, path: &Path) -> PipelineResult<WideTable>;
}

/// Fail with `NotFound` unless `path` is an existing file
pub(crate) fn ensure_exists(path: &Path) -> PipelineResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::NotFound(path.to_path_buf()))
    }
}
