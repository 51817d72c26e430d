// ABOUTME: Remote API stream export parser turning keyed JSON arrays into a wide table
// ABOUTME: Arrays are taken verbatim and must already be row-aligned
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Remote Stream Exports
//!
//! The remote API exports one object per stream name:
//!
//! ```json
//! {
//!   "time":   { "data": [0, 1, 2], "series_type": "distance" },
//!   "watts":  { "data": [180, null, 210] },
//!   "moving": { "data": [true, true, false] }
//! }
//! ```
//!
//! Every stream becomes one unitless column. Streams are already aligned by
//! position, so nothing is padded and a length mismatch is a schema error.

use std::fs;
use std::path::Path;

use ridepower_core::errors::{PipelineError, PipelineResult};
use ridepower_core::models::{Column, FieldKey, FieldValue, SourceKind, WideTable};
use serde_json::Value;
use tracing::debug;

use crate::{ensure_exists, SourceParser};

/// Key holding a stream's samples
const DATA_KEY: &str = "data";

/// Parser for remote API JSON stream exports
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteStreamParser;

impl RemoteStreamParser {
    /// Create a parser
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse an export held in memory
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::RemoteStream` for malformed JSON and
    /// `PipelineError::Schema` for an unexpected shape or misaligned arrays.
    pub fn parse_str(&self, json: &str) -> PipelineResult<WideTable> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| PipelineError::RemoteStream(e.to_string()))?;
        self.parse_value(document)
    }

    /// Parse an already-decoded export
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Schema` when the document is not an object of
    /// `{ "data": [...] }` streams or the arrays differ in length.
    pub fn parse_value(&self, document: Value) -> PipelineResult<WideTable> {
        let Value::Object(streams) = document else {
            return Err(PipelineError::schema(
                "remote stream export must be a JSON object keyed by stream name",
            ));
        };

        let mut columns = Vec::with_capacity(streams.len());
        for (name, stream) in streams {
            let Value::Object(mut body) = stream else {
                return Err(PipelineError::schema(format!(
                    "stream '{name}' is not an object"
                )));
            };
            let Some(Value::Array(samples)) = body.remove(DATA_KEY) else {
                return Err(PipelineError::schema(format!(
                    "stream '{name}' has no '{DATA_KEY}' array"
                )));
            };
            debug!(stream = %name, samples = samples.len(), "decoded remote stream");
            let cells = samples.into_iter().map(json_cell).collect();
            columns.push((FieldKey::unitless(name), Column::from_cells(cells)));
        }

        WideTable::new(SourceKind::RemoteApi, columns)
    }
}

/// Convert one JSON sample into a cell
fn json_cell(sample: Value) -> Option<FieldValue> {
    match sample {
        Value::Null => None,
        Value::Bool(flag) => Some(FieldValue::Bool(flag)),
        Value::Number(number) => number
            .as_i64()
            .map(FieldValue::Int)
            .or_else(|| number.as_f64().map(FieldValue::Float)),
        Value::String(text) => Some(FieldValue::Text(text)),
        Value::Array(elements) => {
            let numeric: Option<Vec<f64>> = elements.iter().map(Value::as_f64).collect();
            Some(numeric.map_or_else(
                || FieldValue::Text(Value::Array(elements).to_string()),
                FieldValue::FloatList,
            ))
        }
        other @ Value::Object(_) => Some(FieldValue::Text(other.to_string())),
    }
}

impl SourceParser for RemoteStreamParser {
    fn kind(&self) -> SourceKind {
        SourceKind::RemoteApi
    }

    fn parse(&self, path: &Path) -> PipelineResult<WideTable> {
        ensure_exists(path)?;
        let json = fs::read_to_string(path)?;
        self.parse_str(&json)
    }
}
