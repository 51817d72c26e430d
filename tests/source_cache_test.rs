// ABOUTME: Tests for the on-disk source cache and its Parquet artifacts
// ABOUTME: Covers path derivation, miss and hit behavior, and typed round trips
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Barrier;
use std::thread;

use common::{data_root, remote_export, steady_remote_export, timestamp, write_source};
use ridepower::cache::artifact::{read_table, write_table};
use ridepower::cache::{CacheLayout, SourceCache};
use ridepower::errors::PipelineError;
use ridepower::models::{Column, FieldKey, SourceKind, WideTable};
use ridepower::providers::SessionRecordParser;

fn cache_at(root: &Path) -> SourceCache {
    SourceCache::new(CacheLayout::new(root), SessionRecordParser::default())
}

#[test]
fn test_artifact_path_mirrors_source_path() {
    let layout = CacheLayout::new("/data");
    assert_eq!(
        layout.artifact_path(Path::new("fit_files/123.fit")),
        PathBuf::from("/data/cache/123.parquet")
    );
    assert_eq!(
        layout.artifact_path(Path::new("fit_files/456.json")),
        PathBuf::from("/data/cache/456.parquet")
    );
}

#[test]
fn test_current_dir_segments_map_to_one_artifact() {
    let layout = CacheLayout::new("/data");
    let expected = PathBuf::from("/data/cache/123.parquet");
    assert_eq!(layout.artifact_path(Path::new("./fit_files/123.fit")), expected);
    assert_eq!(layout.artifact_path(Path::new("fit_files/./123.fit")), expected);
}

#[test]
fn test_custom_directory_names() {
    let layout = CacheLayout {
        root: PathBuf::from("/data"),
        source_dir: "raw".to_owned(),
        cache_dir: "tables".to_owned(),
    };
    assert_eq!(
        layout.artifact_path(Path::new("raw/2024/7.fit")),
        PathBuf::from("/data/tables/2024/7.parquet")
    );
}

#[test]
fn test_miss_parses_and_writes_artifact() {
    let root = data_root();
    let source = write_source(root.path(), "1.json", steady_remote_export(60, 200));
    let cache = cache_at(root.path());

    assert!(!cache.is_cached(&source));
    let table = cache.get(&source).unwrap();
    assert_eq!(table.row_count(), 60);
    assert_eq!(table.kind(), SourceKind::RemoteApi);
    assert!(root.path().join("cache/1.parquet").is_file());
    assert!(cache.is_cached(&source));
}

#[test]
fn test_hit_returns_same_table_without_source() {
    let root = data_root();
    let source = write_source(
        root.path(),
        "2.json",
        remote_export(&[0, 1, 3], &[Some(150), None, Some(300)], &[true, false, true]),
    );
    let cache = cache_at(root.path());
    let parsed = cache.get(&source).unwrap();

    fs::remove_file(root.path().join(&source)).unwrap();
    let cached = cache.get(&source).unwrap();
    assert_eq!(parsed, cached);
}

#[test]
fn test_missing_source_without_artifact_is_not_found() {
    let root = data_root();
    let err = cache_at(root.path())
        .get(Path::new("fit_files/missing.fit"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[test]
fn test_unknown_extension_is_unsupported() {
    let root = data_root();
    let source = write_source(root.path(), "3.gpx", "<gpx/>");
    let err = cache_at(root.path()).get(&source).unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedSource(_)));
}

#[test]
fn test_failed_parse_leaves_no_artifact() {
    let root = data_root();
    let source = write_source(root.path(), "4.fit", b"not a fit file".as_slice());
    let cache = cache_at(root.path());
    let err = cache.get(&source).unwrap_err();
    assert!(matches!(err, PipelineError::DeviceLog(_)));
    assert!(!cache.is_cached(&source));
}

#[test]
fn test_nested_artifact_directories_are_created() {
    let root = data_root();
    fs::create_dir_all(root.path().join("fit_files/2024")).unwrap();
    let source = write_source(root.path(), "2024/5.json", steady_remote_export(10, 100));
    cache_at(root.path()).get(&source).unwrap();
    assert!(root.path().join("cache/2024/5.parquet").is_file());
}

#[test]
fn test_invalidate_removes_artifact() {
    let root = data_root();
    let source = write_source(root.path(), "6.json", steady_remote_export(5, 100));
    let cache = cache_at(root.path());
    cache.get(&source).unwrap();

    assert!(cache.invalidate(&source).unwrap());
    assert!(!cache.is_cached(&source));
    assert!(!cache.invalidate(&source).unwrap());
}

#[test]
fn test_artifact_preserves_every_column_type_and_kind() {
    let table = WideTable::new(
        SourceKind::Device,
        vec![
            (
                FieldKey::unitless("timestamp"),
                Column::Timestamp(vec![Some(timestamp(0)), Some(timestamp(1))]),
            ),
            (
                FieldKey::with_unit("power", "watts"),
                Column::Int(vec![Some(250), None]),
            ),
            (
                FieldKey::with_unit("speed", "m/s"),
                Column::Float(vec![None, Some(8.5)]),
            ),
            (
                FieldKey::unitless("is_paired"),
                Column::Bool(vec![Some(true), None]),
            ),
            (
                FieldKey::unitless("sport"),
                Column::Text(vec![Some("cycling".to_owned()), None]),
            ),
            (
                FieldKey::with_unit("position", "semicircles"),
                Column::FloatList(vec![Some(vec![1.0, 2.0]), None]),
            ),
        ],
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache/artifact.parquet");
    write_table(&path, &table).unwrap();
    assert_eq!(read_table(&path).unwrap(), table);
}

#[test]
fn test_remote_kind_survives_without_moving_column() {
    let table = WideTable::new(
        SourceKind::RemoteApi,
        vec![(FieldKey::unitless("watts"), Column::Int(vec![Some(1)]))],
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remote.parquet");
    write_table(&path, &table).unwrap();
    assert_eq!(read_table(&path).unwrap().kind(), SourceKind::RemoteApi);
}

fn constant_power_table(rows: usize, watts: i64) -> WideTable {
    WideTable::new(
        SourceKind::RemoteApi,
        vec![
            (
                FieldKey::unitless("time"),
                Column::Int((0..rows as i64).map(Some).collect()),
            ),
            (FieldKey::unitless("watts"), Column::Int(vec![Some(watts); rows])),
            (
                FieldKey::unitless("velocity_smooth"),
                Column::Float((0..rows).map(|i| Some(i as f64 * 0.25)).collect()),
            ),
        ],
    )
    .unwrap()
}

#[test]
fn test_concurrent_writers_of_one_artifact_leave_a_whole_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache/shared.parquet");
    let tables = [constant_power_table(100_000, 150), constant_power_table(100_000, 300)];

    for _ in 0..8 {
        let barrier = Barrier::new(tables.len());
        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = tables
                .iter()
                .map(|table| {
                    let barrier = &barrier;
                    let path = &path;
                    scope.spawn(move || {
                        barrier.wait();
                        write_table(path, table)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in results {
            result.unwrap();
        }
        let stored = read_table(&path).unwrap();
        assert!(tables.contains(&stored));
    }

    let entries: Vec<_> = fs::read_dir(dir.path().join("cache")).unwrap().collect();
    assert_eq!(entries.len(), 1, "staging files must not outlive their writer");
}

#[test]
fn test_failed_write_leaves_no_staging_file() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    // A directory squatting on the artifact path makes the final rename fail
    let path = cache_dir.join("blocked.parquet");
    fs::create_dir_all(&path).unwrap();

    assert!(write_table(&path, &constant_power_table(10, 100)).is_err());

    let entries: Vec<PathBuf> = fs::read_dir(&cache_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries, vec![path]);
}
