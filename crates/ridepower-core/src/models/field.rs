// ABOUTME: Composite (name, unit) field keys and dynamically typed field values
// ABOUTME: Keys render as "name (unit)" with "None" standing in for a missing unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// Textual stand-in for an absent unit
pub const NO_UNIT_TAG: &str = "None";

/// Composite column key: field name plus optional unit tag
///
/// Two fields with the same name but different units are distinct columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    name: String,
    unit: Option<String>,
}

impl FieldKey {
    /// Key for a field carrying a unit tag
    #[must_use]
    pub fn with_unit(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: Some(unit.into()),
        }
    }

    /// Key for a field without a unit
    #[must_use]
    pub fn unitless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: None,
        }
    }

    /// Key from decoder output, where an empty unit string means no unit
    #[must_use]
    pub fn from_parts(name: &str, units: &str) -> Self {
        if units.is_empty() {
            Self::unitless(name)
        } else {
            Self::with_unit(name, units)
        }
    }

    /// Field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit tag, `None` when the field is unitless
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name,
            self.unit.as_deref().unwrap_or(NO_UNIT_TAG)
        )
    }
}

impl FromStr for FieldKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PipelineError::schema("empty field key"));
        }
        let Some((name, rest)) = s.rsplit_once(" (") else {
            return Ok(Self::unitless(s));
        };
        let unit = rest
            .strip_suffix(')')
            .ok_or_else(|| PipelineError::schema(format!("unterminated unit in field key '{s}'")))?;
        if unit == NO_UNIT_TAG {
            Ok(Self::unitless(name))
        } else {
            Ok(Self::with_unit(name, unit))
        }
    }
}

/// A single observed value before its column type is settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Integral reading
    Int(i64),
    /// Floating point reading
    Float(f64),
    /// Flag
    Bool(bool),
    /// Enumerated or free-form text
    Text(String),
    /// Absolute instant
    Timestamp(DateTime<Utc>),
    /// Fixed-size numeric tuple such as a lat/lng pair
    FloatList(Vec<f64>),
}

impl FieldValue {
    /// Numeric view of integral and floating point values
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Sensor readings are far below 2^53
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::FloatList(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}
