// ABOUTME: FIT session log parser streaming record messages into a sparse wide table
// ABOUTME: Backfills late fields, pads absent ones, and repairs double-sampled columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Device Session Logs
//!
//! A FIT file is a stream of typed messages; only `record` messages carry the
//! per-sample readings we need. Fields come and go between records (a power
//! meter pairs late, a speed sensor drops out), so rows are accumulated into
//! growable columns with nulls filling every gap.
//!
//! Some head units write a field at twice the nominal rate, interleaving a
//! null sub-stream with the real one. Such columns end up exactly twice as
//! long as the time axis and are split back into the sub-stream that carries
//! data. When both or neither sub-stream carries data there is no safe
//! choice, and parsing fails.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::Utc;
use fitparser::de::from_bytes;
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use ridepower_core::constants::device_fields;
use ridepower_core::errors::{PipelineError, PipelineResult};
use ridepower_core::models::{Column, FieldKey, FieldValue, SourceKind, WideTable};
use tracing::debug;

use crate::{ensure_exists, SourceParser};

/// One decoded field of a record message
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Profile field name
    pub name: String,
    /// Unit string, empty when the field has none
    pub units: String,
    /// Reading, `None` when the decoder produced no usable scalar
    pub value: Option<FieldValue>,
}

impl RecordField {
    /// Convenience constructor
    #[must_use]
    pub fn new(name: impl Into<String>, units: impl Into<String>, value: Option<FieldValue>) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            value,
        }
    }

    fn key(&self) -> FieldKey {
        FieldKey::from_parts(&self.name, &self.units)
    }
}

/// The fields of a single `record` message, in decode order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    /// Decoded fields
    pub fields: Vec<RecordField>,
}

impl SessionRecord {
    /// Wrap a list of fields
    #[must_use]
    pub const fn new(fields: Vec<RecordField>) -> Self {
        Self { fields }
    }

    /// Absolute timestamps drop the profile's `s` unit so the time axis keys
    /// as `timestamp (None)`.
    fn from_fit(record: &FitDataRecord) -> Self {
        let fields = record
            .fields()
            .iter()
            .map(|field| {
                let units = match field.value() {
                    Value::Timestamp(_) => "",
                    _ => field.units(),
                };
                RecordField::new(field.name(), units, fit_value(field.value()))
            })
            .collect();
        Self { fields }
    }
}

/// Convert a decoded FIT value; u64 readings above `i64::MAX` become null
fn fit_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Timestamp(ts) => Some(FieldValue::Timestamp(ts.with_timezone(&Utc))),
        Value::Byte(v) | Value::Enum(v) | Value::UInt8(v) | Value::UInt8z(v) => {
            Some(FieldValue::Int(i64::from(*v)))
        }
        Value::SInt8(v) => Some(FieldValue::Int(i64::from(*v))),
        Value::SInt16(v) => Some(FieldValue::Int(i64::from(*v))),
        Value::UInt16(v) | Value::UInt16z(v) => Some(FieldValue::Int(i64::from(*v))),
        Value::SInt32(v) => Some(FieldValue::Int(i64::from(*v))),
        Value::UInt32(v) | Value::UInt32z(v) => Some(FieldValue::Int(i64::from(*v))),
        Value::SInt64(v) => Some(FieldValue::Int(*v)),
        Value::UInt64(v) | Value::UInt64z(v) => i64::try_from(*v).ok().map(FieldValue::Int),
        Value::Float32(v) => Some(FieldValue::Float(f64::from(*v))),
        Value::Float64(v) => Some(FieldValue::Float(*v)),
        Value::String(v) => Some(FieldValue::Text(v.clone())),
        Value::Array(values) => values
            .iter()
            .map(|element| fit_value(element).and_then(|v| v.as_f64()))
            .collect::<Option<Vec<f64>>>()
            .map(FieldValue::FloatList),
        Value::Invalid => None,
    }
}

/// Variable-schema row accumulator
///
/// Holds one growable column per field key in first-appearance order plus a
/// running row counter. A key first seen at row `i` is backfilled with `i`
/// nulls; after each record every column shorter than the row count is
/// padded with one null. Columns never shrink.
#[derive(Debug, Default)]
pub struct RecordAccumulator {
    columns: Vec<(FieldKey, Vec<Option<FieldValue>>)>,
    positions: HashMap<FieldKey, usize>,
    rows: usize,
}

impl RecordAccumulator {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows pushed so far
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Append one record as the next row
    pub fn push_record(&mut self, record: SessionRecord) {
        let row = self.rows;
        for field in record.fields {
            let key = field.key();
            let slot = if let Some(&slot) = self.positions.get(&key) {
                slot
            } else {
                self.columns.push((key.clone(), vec![None; row]));
                let slot = self.columns.len() - 1;
                self.positions.insert(key, slot);
                slot
            };
            self.columns[slot].1.push(field.value);
        }
        for (_, cells) in &mut self.columns {
            if cells.len() <= row {
                cells.push(None);
            }
        }
        self.rows += 1;
    }

    /// Resolve double sampling, drop ignored fields, and build the table
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Schema` when the time axis is missing or a
    /// column cannot be aligned with it, and `PipelineError::DataIntegrity`
    /// when a double-sampled column has no unique data-carrying sub-stream.
    pub fn finish(self, ignored: &HashSet<FieldKey>) -> PipelineResult<WideTable> {
        let time_axis = FieldKey::unitless(device_fields::TIMESTAMP);
        let expected = self
            .columns
            .iter()
            .find_map(|(key, cells)| (*key == time_axis).then_some(cells.len()))
            .ok_or_else(|| {
                PipelineError::schema(format!("device log has no time-axis column '{time_axis}'"))
            })?;

        let mut columns = Vec::with_capacity(self.columns.len());
        for (key, cells) in self.columns {
            let cells = if key != time_axis && expected > 0 && cells.len() == 2 * expected {
                resolve_double_sampled(&key, cells)?
            } else {
                cells
            };
            if ignored.contains(&key) {
                debug!(field = %key, "dropping ignored device field");
                continue;
            }
            columns.push((key, Column::from_cells(cells)));
        }

        WideTable::new(SourceKind::Device, columns)
    }
}

/// Keep whichever interleaved sub-stream carries data
fn resolve_double_sampled(
    key: &FieldKey,
    cells: Vec<Option<FieldValue>>,
) -> PipelineResult<Vec<Option<FieldValue>>> {
    let half = cells.len() / 2;
    let mut even = Vec::with_capacity(half);
    let mut odd = Vec::with_capacity(half);
    for (index, cell) in cells.into_iter().enumerate() {
        if index % 2 == 0 {
            even.push(cell);
        } else {
            odd.push(cell);
        }
    }

    let even_null = even.iter().all(Option::is_none);
    let odd_null = odd.iter().all(Option::is_none);
    match (even_null, odd_null) {
        (true, false) => {
            debug!(field = %key, rows = half, "double-sampled field resolved to odd sub-stream");
            Ok(odd)
        }
        (false, true) => {
            debug!(field = %key, rows = half, "double-sampled field resolved to even sub-stream");
            Ok(even)
        }
        (false, false) => Err(PipelineError::data_integrity(
            key.to_string(),
            "both even and odd sub-streams carry values",
        )),
        (true, true) => Err(PipelineError::data_integrity(
            key.to_string(),
            "neither even nor odd sub-stream carries values",
        )),
    }
}

/// Parser for device-exported FIT session logs
#[derive(Debug, Clone)]
pub struct SessionRecordParser {
    ignored_fields: HashSet<FieldKey>,
}

impl Default for SessionRecordParser {
    fn default() -> Self {
        Self::new(Self::default_ignored_fields())
    }
}

impl SessionRecordParser {
    /// Parser dropping the given field keys after resolution
    #[must_use]
    pub const fn new(ignored_fields: HashSet<FieldKey>) -> Self {
        Self { ignored_fields }
    }

    /// Fields suppressed unless configured otherwise
    #[must_use]
    pub fn default_ignored_fields() -> HashSet<FieldKey> {
        HashSet::from([FieldKey::unitless(device_fields::LEFT_RIGHT_BALANCE)])
    }

    /// Keys this parser drops
    #[must_use]
    pub const fn ignored_fields(&self) -> &HashSet<FieldKey> {
        &self.ignored_fields
    }

    /// Build a table from already-decoded record messages
    ///
    /// # Errors
    ///
    /// See [`RecordAccumulator::finish`].
    pub fn parse_records(
        &self,
        records: impl IntoIterator<Item = SessionRecord>,
    ) -> PipelineResult<WideTable> {
        let mut accumulator = RecordAccumulator::new();
        for record in records {
            accumulator.push_record(record);
        }
        debug!(rows = accumulator.rows(), "accumulated device records");
        accumulator.finish(&self.ignored_fields)
    }

    /// Decode FIT bytes and build a table from their record messages
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::DeviceLog` when the bytes are not a valid FIT
    /// stream, otherwise see [`RecordAccumulator::finish`].
    pub fn parse_bytes(&self, bytes: &[u8]) -> PipelineResult<WideTable> {
        let messages = from_bytes(bytes)
            .map_err(|e| PipelineError::DeviceLog(e.to_string()))?;
        self.parse_records(
            messages
                .into_iter()
                .filter(|message| message.kind() == MesgNum::Record)
                .map(|message| SessionRecord::from_fit(&message)),
        )
    }
}

impl SourceParser for SessionRecordParser {
    fn kind(&self) -> SourceKind {
        SourceKind::Device
    }

    fn parse(&self, path: &Path) -> PipelineResult<WideTable> {
        ensure_exists(path)?;
        let bytes = fs::read(path)?;
        self.parse_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Option<FieldValue> {
        Some(FieldValue::Int(v))
    }

    #[test]
    fn test_even_null_sub_stream_resolves_to_odd() {
        let key = FieldKey::with_unit("heart_rate", "bpm");
        let resolved = resolve_double_sampled(&key, vec![None, int(1), None, int(2)]).unwrap();
        assert_eq!(resolved, vec![int(1), int(2)]);
    }

    #[test]
    fn test_odd_null_sub_stream_resolves_to_even() {
        let key = FieldKey::with_unit("heart_rate", "bpm");
        let resolved = resolve_double_sampled(&key, vec![int(7), None, int(8), None]).unwrap();
        assert_eq!(resolved, vec![int(7), int(8)]);
    }

    #[test]
    fn test_all_null_sub_streams_are_ambiguous() {
        let key = FieldKey::with_unit("heart_rate", "bpm");
        let err = resolve_double_sampled(&key, vec![None, None]).unwrap_err();
        assert!(matches!(err, PipelineError::DataIntegrity { .. }));
    }

    #[test]
    fn test_accumulator_backfills_and_pads() {
        let mut accumulator = RecordAccumulator::new();
        accumulator.push_record(SessionRecord::new(vec![RecordField::new("a", "", int(1))]));
        accumulator.push_record(SessionRecord::new(vec![
            RecordField::new("a", "", int(2)),
            RecordField::new("b", "", int(20)),
        ]));
        accumulator.push_record(SessionRecord::new(vec![RecordField::new("b", "", int(30))]));

        assert_eq!(accumulator.rows(), 3);
        let columns: Vec<_> = accumulator.columns.iter().map(|(_, c)| c.clone()).collect();
        assert_eq!(columns[0], vec![int(1), int(2), None]);
        assert_eq!(columns[1], vec![None, int(20), int(30)]);
    }
}
