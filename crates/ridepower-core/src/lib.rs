// ABOUTME: Core types and constants for the ridepower ingestion pipeline
// ABOUTME: Foundation crate with error handling, wide tables, and canonical power series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Ridepower Core
//!
//! Shared types for every stage of the activity time-series pipeline. Parsers
//! produce a [`models::WideTable`], adapters reduce it to a
//! [`models::CanonicalTimeSeries`], and analytics consume the canonical or
//! [`models::DenseTimeSeries`] form.
//!
//! ## Modules
//!
//! - **errors**: `PipelineError` and the `PipelineResult` alias
//! - **constants**: well-known field keys, thresholds, and window sizes
//! - **models**: field keys, typed columns, wide tables, and canonical series

/// Unified error handling for per-activity pipeline failures
pub mod errors;

/// Well-known field names, defaults, and cache layout constants
pub mod constants;

/// Wide tables, typed columns, and canonical power series
pub mod models;
