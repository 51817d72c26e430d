// ABOUTME: Typed nullable columns for wide tables with inference from raw cells
// ABOUTME: Integers widen to floats on mixing, any other mix falls back to text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::field::FieldValue;

/// One column of a wide table; every variant stores explicit nulls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Column {
    /// Integral readings
    Int(Vec<Option<i64>>),
    /// Floating point readings
    Float(Vec<Option<f64>>),
    /// Flags
    Bool(Vec<Option<bool>>),
    /// Text or enumerated values
    Text(Vec<Option<String>>),
    /// Absolute instants in UTC
    Timestamp(Vec<Option<DateTime<Utc>>>),
    /// Numeric tuples
    FloatList(Vec<Option<Vec<f64>>>),
}

/// Settled type of a sequence of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellShape {
    Empty,
    Int,
    Float,
    Bool,
    Text,
    Timestamp,
    FloatList,
    Mixed,
}

impl CellShape {
    const fn of(value: &FieldValue) -> Self {
        match value {
            FieldValue::Int(_) => Self::Int,
            FieldValue::Float(_) => Self::Float,
            FieldValue::Bool(_) => Self::Bool,
            FieldValue::Text(_) => Self::Text,
            FieldValue::Timestamp(_) => Self::Timestamp,
            FieldValue::FloatList(_) => Self::FloatList,
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, shape) | (shape, Self::Empty) => shape,
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Mixed,
        }
    }
}

impl Column {
    /// Build a typed column from dynamically typed cells
    ///
    /// All-null input yields a float column of nulls.
    #[must_use]
    pub fn from_cells(cells: Vec<Option<FieldValue>>) -> Self {
        let shape = cells
            .iter()
            .flatten()
            .fold(CellShape::Empty, |shape, value| shape.merge(CellShape::of(value)));

        match shape {
            CellShape::Empty | CellShape::Float => Self::Float(
                cells
                    .into_iter()
                    .map(|cell| cell.and_then(|value| value.as_f64()))
                    .collect(),
            ),
            CellShape::Int => Self::Int(
                cells
                    .into_iter()
                    .map(|cell| match cell {
                        Some(FieldValue::Int(v)) => Some(v),
                        _ => None,
                    })
                    .collect(),
            ),
            CellShape::Bool => Self::Bool(
                cells
                    .into_iter()
                    .map(|cell| match cell {
                        Some(FieldValue::Bool(v)) => Some(v),
                        _ => None,
                    })
                    .collect(),
            ),
            CellShape::Timestamp => Self::Timestamp(
                cells
                    .into_iter()
                    .map(|cell| match cell {
                        Some(FieldValue::Timestamp(v)) => Some(v),
                        _ => None,
                    })
                    .collect(),
            ),
            CellShape::FloatList => Self::FloatList(
                cells
                    .into_iter()
                    .map(|cell| match cell {
                        Some(FieldValue::FloatList(v)) => Some(v),
                        _ => None,
                    })
                    .collect(),
            ),
            CellShape::Text | CellShape::Mixed => Self::Text(
                cells
                    .into_iter()
                    .map(|cell| {
                        cell.map(|value| match value {
                            FieldValue::Text(text) => text,
                            other => other.to_string(),
                        })
                    })
                    .collect(),
            ),
        }
    }

    /// Number of rows, nulls included
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Timestamp(v) => v.len(),
            Self::FloatList(v) => v.len(),
        }
    }

    /// Whether the column has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of null rows
    #[must_use]
    pub fn null_count(&self) -> usize {
        fn nulls<T>(values: &[Option<T>]) -> usize {
            values.iter().filter(|v| v.is_none()).count()
        }
        match self {
            Self::Int(v) => nulls(v),
            Self::Float(v) => nulls(v),
            Self::Bool(v) => nulls(v),
            Self::Text(v) => nulls(v),
            Self::Timestamp(v) => nulls(v),
            Self::FloatList(v) => nulls(v),
        }
    }

    /// Short type label used in schema error messages
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::FloatList(_) => "float_list",
        }
    }

    /// Numeric cast of the column, `None` if the type has no numeric reading
    ///
    /// Flags cast to 1.0 and 0.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Sensor readings are far below 2^53
    pub fn to_f64(&self) -> Option<Vec<Option<f64>>> {
        match self {
            Self::Float(values) => Some(values.clone()),
            Self::Int(values) => Some(values.iter().map(|v| v.map(|x| x as f64)).collect()),
            Self::Bool(values) => Some(
                values
                    .iter()
                    .map(|v| v.map(|flag| if flag { 1.0 } else { 0.0 }))
                    .collect(),
            ),
            Self::Text(_) | Self::Timestamp(_) | Self::FloatList(_) => None,
        }
    }

    /// Borrow as flags
    #[must_use]
    pub fn as_bools(&self) -> Option<&[Option<bool>]> {
        match self {
            Self::Bool(values) => Some(values),
            _ => None,
        }
    }

    /// Borrow as timestamps
    #[must_use]
    pub fn as_timestamps(&self) -> Option<&[Option<DateTime<Utc>>]> {
        match self {
            Self::Timestamp(values) => Some(values),
            _ => None,
        }
    }
}
