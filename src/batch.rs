// ABOUTME: Parallel batch summaries over many activities using rayon
// ABOUTME: One failing activity is reported and skipped, never aborting the batch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Batch Runner
//!
//! Work is sharded by artifact path: sources that map to one artifact (for
//! example `fit_files/1.fit` and `./fit_files/1.fit`) are collapsed before
//! dispatch so no two workers ever parse or write the same artifact.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use ridepower_core::errors::ErrorKind;
use serde::Serialize;
use tracing::{info, warn};

use crate::pipeline::{ActivityPipeline, ActivitySummary};

/// Result of one activity in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActivityOutcome {
    /// Summary computed
    Summarized(ActivitySummary),
    /// Activity skipped after an error
    Failed {
        /// Source that failed
        source: PathBuf,
        /// Error category
        kind: ErrorKind,
        /// Rendered error
        error: String,
    },
}

impl ActivityOutcome {
    /// Summary, if the activity succeeded
    #[must_use]
    pub const fn summary(&self) -> Option<&ActivitySummary> {
        match self {
            Self::Summarized(summary) => Some(summary),
            Self::Failed { .. } => None,
        }
    }

    /// Source path this outcome belongs to
    #[must_use]
    pub fn source(&self) -> &Path {
        match self {
            Self::Summarized(summary) => &summary.source,
            Self::Failed { source, .. } => source,
        }
    }
}

/// Sources in first-seen order, one per artifact path
fn unique_sources<'a>(pipeline: &ActivityPipeline, sources: &'a [PathBuf]) -> Vec<&'a Path> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .map(PathBuf::as_path)
        .filter(|source| seen.insert(pipeline.cache().artifact_path(source)))
        .collect()
}

/// Summarize every source in parallel, preserving first-seen order
#[must_use]
pub fn summarize_activities(
    pipeline: &ActivityPipeline,
    sources: &[PathBuf],
    peak_windows: &[usize],
) -> Vec<ActivityOutcome> {
    let unique = unique_sources(pipeline, sources);
    let outcomes: Vec<ActivityOutcome> = unique
        .par_iter()
        .map(|&source| match pipeline.summarize(source, peak_windows) {
            Ok(summary) => ActivityOutcome::Summarized(summary),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "skipping activity");
                ActivityOutcome::Failed {
                    source: source.to_path_buf(),
                    kind: e.kind(),
                    error: e.to_string(),
                }
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.summary().is_none()).count();
    info!(
        activities = outcomes.len(),
        failed, "batch summary complete"
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_sources_keeps_first_occurrence_order() {
        let sources = vec![
            PathBuf::from("fit_files/b.fit"),
            PathBuf::from("fit_files/a.json"),
            PathBuf::from("fit_files/b.fit"),
        ];
        assert_eq!(
            unique_sources(&ActivityPipeline::default(), &sources),
            vec![Path::new("fit_files/b.fit"), Path::new("fit_files/a.json")]
        );
    }

    #[test]
    fn test_unique_sources_collapses_spellings_of_one_artifact() {
        let sources = vec![
            PathBuf::from("fit_files/a.json"),
            PathBuf::from("./fit_files/a.json"),
            PathBuf::from("fit_files/./a.json"),
        ];
        assert_eq!(
            unique_sources(&ActivityPipeline::default(), &sources),
            vec![Path::new("fit_files/a.json")]
        );
    }
}
