// ABOUTME: Data model for the ingestion pipeline from raw fields to canonical series
// ABOUTME: Re-exports field keys, typed columns, wide tables, and power series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Core data models.
//!
//! A source file is parsed once into a [`WideTable`]: an ordered set of
//! nullable, typed [`Column`]s keyed by [`FieldKey`]. Adapters reduce wide
//! tables of either [`SourceKind`] to a three-column
//! [`CanonicalTimeSeries`], which can be densified into a
//! [`DenseTimeSeries`] on a 1 Hz axis.

/// Typed nullable columns and inference from dynamically typed cells
pub mod column;
/// Composite field keys and dynamically typed field values
pub mod field;
/// Canonical and dense power/motion series
pub mod series;
/// Wide tables and source kind tagging
pub mod table;

pub use column::Column;
pub use field::{FieldKey, FieldValue};
pub use series::{CanonicalTimeSeries, DenseSample, DenseTimeSeries};
pub use table::{SourceKind, WideTable};
