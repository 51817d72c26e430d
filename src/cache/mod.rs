// ABOUTME: Source cache memoizing parsed wide tables as columnar artifacts on disk
// ABOUTME: Artifact paths mirror source paths with the source directory swapped out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Source Cache
//!
//! Parsing a session log is far slower than reading back its table, so every
//! parse result is persisted next to the sources:
//!
//! ```text
//! <root>/fit_files/123.fit   ->  <root>/cache/123.parquet
//! <root>/fit_files/456.json  ->  <root>/cache/456.parquet
//! ```
//!
//! A present artifact is trusted unconditionally. There is no staleness
//! check against the source file.

/// Parquet encoding of wide tables
pub mod artifact;

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use ridepower_core::constants::cache::{ARTIFACT_EXTENSION, DEFAULT_CACHE_DIR, DEFAULT_SOURCE_DIR};
use ridepower_core::errors::{PipelineError, PipelineResult};
use ridepower_core::models::{SourceKind, WideTable};
use ridepower_providers::{RemoteStreamParser, SessionRecordParser, SourceParser};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where sources live and where their artifacts go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheLayout {
    /// Directory that relative source paths are resolved against
    pub root: PathBuf,
    /// Path segment identifying the source directory
    pub source_dir: String,
    /// Segment substituted for `source_dir` in artifact paths
    pub cache_dir: String,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

impl CacheLayout {
    /// Layout rooted at `root` with the default directory names
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source_dir: DEFAULT_SOURCE_DIR.to_owned(),
            cache_dir: DEFAULT_CACHE_DIR.to_owned(),
        }
    }

    /// Source path resolved against the root
    #[must_use]
    pub fn source_path(&self, source: &Path) -> PathBuf {
        self.root.join(source)
    }

    /// Derive the artifact path for a source
    ///
    /// The first path segment equal to `source_dir` becomes `cache_dir` and
    /// the extension becomes `parquet`. A path without that segment keeps its
    /// directories. `.` segments are dropped, so spellings of one source map
    /// to one artifact.
    #[must_use]
    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        let source_dir = OsStr::new(&self.source_dir);
        let mut replaced = false;
        let mut artifact = PathBuf::new();

        for component in source.components() {
            match component {
                Component::Normal(segment) if !replaced && segment == source_dir => {
                    artifact.push(&self.cache_dir);
                    replaced = true;
                }
                Component::CurDir => {}
                other => artifact.push(other),
            }
        }
        artifact.set_extension(ARTIFACT_EXTENSION);
        self.root.join(artifact)
    }
}

/// Memoizing front of the source parsers
#[derive(Debug, Clone, Default)]
pub struct SourceCache {
    layout: CacheLayout,
    device: SessionRecordParser,
    remote: RemoteStreamParser,
}

impl SourceCache {
    /// Cache over `layout` using the given device-log parser
    #[must_use]
    pub const fn new(layout: CacheLayout, device: SessionRecordParser) -> Self {
        Self {
            layout,
            device,
            remote: RemoteStreamParser::new(),
        }
    }

    /// Directory layout in use
    #[must_use]
    pub const fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Artifact path for a source
    #[must_use]
    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        self.layout.artifact_path(source)
    }

    /// Whether an artifact already exists for a source
    #[must_use]
    pub fn is_cached(&self, source: &Path) -> bool {
        self.artifact_path(source).is_file()
    }

    fn parser(&self, kind: SourceKind) -> &dyn SourceParser {
        match kind {
            SourceKind::Device => &self.device,
            SourceKind::RemoteApi => &self.remote,
        }
    }

    /// Return the wide table for a source, parsing it on a cache miss
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::UnsupportedSource` for an unknown extension,
    /// `PipelineError::NotFound` when neither artifact nor source exists,
    /// any parser error on a miss, and `PipelineError::Cache` or
    /// `PipelineError::Io` when the artifact cannot be read or written.
    pub fn get(&self, source: &Path) -> PipelineResult<WideTable> {
        let artifact = self.artifact_path(source);
        if artifact.is_file() {
            debug!(source = %source.display(), artifact = %artifact.display(), "source cache hit");
            return artifact::read_table(&artifact);
        }

        let kind = SourceKind::from_path(source)
            .ok_or_else(|| PipelineError::UnsupportedSource(source.to_path_buf()))?;
        let table = self.parser(kind).parse(&self.layout.source_path(source))?;
        artifact::write_table(&artifact, &table)?;
        info!(
            source = %source.display(),
            artifact = %artifact.display(),
            kind = %kind,
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed source and cached table"
        );
        Ok(table)
    }

    /// Remove the artifact for a source, returning whether one existed
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the file exists but cannot be removed.
    pub fn invalidate(&self, source: &Path) -> PipelineResult<bool> {
        let artifact = self.artifact_path(source);
        if !artifact.is_file() {
            return Ok(false);
        }
        fs::remove_file(&artifact)?;
        Ok(true)
    }
}
