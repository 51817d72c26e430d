// ABOUTME: Wide time-series tables keyed by field, tagged with the source kind
// ABOUTME: Enforces equal column lengths and unique keys at construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::field::FieldKey;
use crate::constants::{extensions, remote_streams};
use crate::errors::{PipelineError, PipelineResult};

/// Where a wide table came from
///
/// Attached when the table is parsed and carried through the cache, so
/// adapters never have to guess from which columns happen to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Device-exported FIT session log
    Device,
    /// Remote API stream export
    RemoteApi,
}

impl SourceKind {
    /// Kind implied by a source file extension (case-insensitive)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case(extensions::FIT) {
            Some(Self::Device)
        } else if extension.eq_ignore_ascii_case(extensions::JSON) {
            Some(Self::RemoteApi)
        } else {
            None
        }
    }

    /// Structural inference for tables without a recorded kind
    ///
    /// A `moving` column marks a remote export regardless of any other field.
    #[must_use]
    pub fn infer<'a>(keys: impl IntoIterator<Item = &'a FieldKey>) -> Self {
        let moving = FieldKey::unitless(remote_streams::MOVING);
        if keys.into_iter().any(|key| *key == moving) {
            Self::RemoteApi
        } else {
            Self::Device
        }
    }

    /// Stable identifier persisted in cache metadata
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::RemoteApi => "remote_api",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "device" => Ok(Self::Device),
            "remote_api" => Ok(Self::RemoteApi),
            other => Err(PipelineError::schema(format!("unknown source kind '{other}'"))),
        }
    }
}

/// Column-oriented table with one row per time sample
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    kind: SourceKind,
    columns: Vec<(FieldKey, Column)>,
    row_count: usize,
}

impl WideTable {
    /// Create a table, checking that keys are unique and lengths agree
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Schema` on a duplicate key or a column whose
    /// length differs from the first column's.
    pub fn new(kind: SourceKind, columns: Vec<(FieldKey, Column)>) -> PipelineResult<Self> {
        let row_count = columns.first().map_or(0, |(_, column)| column.len());
        for (index, (key, column)) in columns.iter().enumerate() {
            if column.len() != row_count {
                return Err(PipelineError::schema(format!(
                    "column '{key}' has {} rows, expected {row_count}",
                    column.len()
                )));
            }
            if columns[..index].iter().any(|(other, _)| other == key) {
                return Err(PipelineError::schema(format!("duplicate column '{key}'")));
            }
        }
        Ok(Self {
            kind,
            columns,
            row_count,
        })
    }

    /// Create a table whose kind is inferred from its columns
    ///
    /// # Errors
    ///
    /// Same as [`WideTable::new`].
    pub fn with_inferred_kind(columns: Vec<(FieldKey, Column)>) -> PipelineResult<Self> {
        let kind = SourceKind::infer(columns.iter().map(|(key, _)| key));
        Self::new(kind, columns)
    }

    /// Source kind recorded at parse time
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Number of rows shared by every column
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column by key
    #[must_use]
    pub fn column(&self, key: &FieldKey) -> Option<&Column> {
        self.columns
            .iter()
            .find_map(|(candidate, column)| (candidate == key).then_some(column))
    }

    /// Whether a column with this key exists
    #[must_use]
    pub fn contains(&self, key: &FieldKey) -> bool {
        self.column(key).is_some()
    }

    /// Keys in column order
    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.columns.iter().map(|(key, _)| key)
    }

    /// Columns in order
    pub fn columns(&self) -> impl Iterator<Item = (&FieldKey, &Column)> {
        self.columns.iter().map(|(key, column)| (key, column))
    }

    /// Consume the table, yielding its columns
    #[must_use]
    pub fn into_columns(self) -> Vec<(FieldKey, Column)> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_ragged_columns() {
        let result = WideTable::new(
            SourceKind::RemoteApi,
            vec![
                (FieldKey::unitless("time"), Column::Int(vec![Some(0), Some(1)])),
                (FieldKey::unitless("watts"), Column::Int(vec![Some(100)])),
            ],
        );
        assert!(matches!(result, Err(PipelineError::Schema(_))));
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let result = WideTable::new(
            SourceKind::Device,
            vec![
                (FieldKey::unitless("timestamp"), Column::Int(vec![Some(0)])),
                (FieldKey::unitless("timestamp"), Column::Int(vec![Some(1)])),
            ],
        );
        assert!(matches!(result, Err(PipelineError::Schema(_))));
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(
            SourceKind::from_path(Path::new("fit_files/123.FIT")),
            Some(SourceKind::Device)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("fit_files/123.json")),
            Some(SourceKind::RemoteApi)
        );
        assert_eq!(SourceKind::from_path(Path::new("fit_files/123.gpx")), None);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [SourceKind::Device, SourceKind::RemoteApi] {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
    }
}
