// ABOUTME: Parquet encoding of wide tables for the on-disk source cache
// ABOUTME: Field keys and source kind travel as Arrow schema metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, StringArray,
    TimestampMicrosecondArray,
};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, Float64Type, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use ridepower_core::constants::cache::{META_FIELD_NAME, META_FIELD_UNIT, META_SOURCE_KIND};
use ridepower_core::errors::{PipelineError, PipelineResult};
use ridepower_core::models::{Column, FieldKey, SourceKind, WideTable};
use tempfile::NamedTempFile;

/// Timezone recorded on timestamp columns
const UTC_TZ: &str = "UTC";

fn cache_error(context: &str, error: impl Display) -> PipelineError {
    PipelineError::cache(format!("{context}: {error}"))
}

/// Write a table to `path`, creating parent directories
///
/// Each writer stages into its own temporary file beside the destination and
/// renames it into place. Concurrent writers of one path never share a file,
/// the last rename wins, and a failed write leaves nothing behind.
pub fn write_table(path: &Path, table: &WideTable) -> PipelineResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let batch = encode_table(table)?;

    let mut staging = NamedTempFile::new_in(parent)?;
    let properties = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();
    let mut writer = ArrowWriter::try_new(staging.as_file_mut(), batch.schema(), Some(properties))
        .map_err(|e| cache_error("create parquet writer", e))?;
    writer
        .write(&batch)
        .map_err(|e| cache_error("write record batch", e))?;
    writer
        .close()
        .map_err(|e| cache_error("finalize parquet file", e))?;

    staging.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a table previously written with [`write_table`]
pub fn read_table(path: &Path) -> PipelineResult<WideTable> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| cache_error("open parquet file", e))?;
    let schema = Arc::clone(builder.schema());
    let reader = builder
        .build()
        .map_err(|e| cache_error("build parquet reader", e))?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| cache_error("read record batch", e))?;
    let batch = concat_batches(&schema, &batches)
        .map_err(|e| cache_error("concatenate record batches", e))?;
    decode_batch(&batch)
}

fn encode_table(table: &WideTable) -> PipelineResult<RecordBatch> {
    let mut fields = Vec::with_capacity(table.column_count());
    let mut arrays = Vec::with_capacity(table.column_count());

    for (key, column) in table.columns() {
        let array = encode_column(column);
        let mut metadata = HashMap::from([(META_FIELD_NAME.to_owned(), key.name().to_owned())]);
        if let Some(unit) = key.unit() {
            metadata.insert(META_FIELD_UNIT.to_owned(), unit.to_owned());
        }
        fields.push(
            Field::new(key.to_string(), array.data_type().clone(), true).with_metadata(metadata),
        );
        arrays.push(array);
    }

    let schema = Schema::new(fields).with_metadata(HashMap::from([(
        META_SOURCE_KIND.to_owned(),
        table.kind().as_str().to_owned(),
    )]));
    let options = RecordBatchOptions::new().with_row_count(Some(table.row_count()));
    RecordBatch::try_new_with_options(Arc::new(schema), arrays, &options)
        .map_err(|e| cache_error("assemble record batch", e))
}

fn encode_column(column: &Column) -> ArrayRef {
    match column {
        Column::Int(values) => Arc::new(Int64Array::from(values.clone())),
        Column::Float(values) => Arc::new(Float64Array::from(values.clone())),
        Column::Bool(values) => Arc::new(BooleanArray::from(values.clone())),
        Column::Text(values) => Arc::new(StringArray::from(values.clone())),
        Column::Timestamp(values) => {
            let micros: Vec<Option<i64>> = values
                .iter()
                .map(|value| value.map(|ts| ts.timestamp_micros()))
                .collect();
            Arc::new(TimestampMicrosecondArray::from(micros).with_timezone(UTC_TZ))
        }
        Column::FloatList(values) => Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(
            values
                .iter()
                .map(|value| value.as_ref().map(|list| list.iter().copied().map(Some))),
        )),
    }
}

fn decode_batch(batch: &RecordBatch) -> PipelineResult<WideTable> {
    let schema = batch.schema();
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let key = decode_key(field)?;
        let column = decode_column(&key, field.data_type(), array.as_ref())?;
        columns.push((key, column));
    }

    match schema.metadata().get(META_SOURCE_KIND) {
        Some(kind) => WideTable::new(kind.parse::<SourceKind>()?, columns),
        None => WideTable::with_inferred_kind(columns),
    }
}

/// Key from field metadata, falling back to parsing the column name
fn decode_key(field: &Field) -> PipelineResult<FieldKey> {
    let metadata = field.metadata();
    metadata.get(META_FIELD_NAME).map_or_else(
        || field.name().parse(),
        |name| {
            Ok(metadata.get(META_FIELD_UNIT).map_or_else(
                || FieldKey::unitless(name.as_str()),
                |unit| FieldKey::with_unit(name.as_str(), unit.as_str()),
            ))
        },
    )
}

fn downcast<'a, T: 'static>(key: &FieldKey, array: &'a dyn Array) -> PipelineResult<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        PipelineError::cache(format!(
            "column '{key}' does not match its declared type {}",
            array.data_type()
        ))
    })
}

fn decode_column(key: &FieldKey, data_type: &DataType, array: &dyn Array) -> PipelineResult<Column> {
    let column = match data_type {
        DataType::Int64 => Column::Int(downcast::<Int64Array>(key, array)?.iter().collect()),
        DataType::Float64 => Column::Float(downcast::<Float64Array>(key, array)?.iter().collect()),
        DataType::Boolean => Column::Bool(downcast::<BooleanArray>(key, array)?.iter().collect()),
        DataType::Utf8 => Column::Text(
            downcast::<StringArray>(key, array)?
                .iter()
                .map(|value| value.map(str::to_owned))
                .collect(),
        ),
        DataType::Timestamp(TimeUnit::Microsecond, _) => Column::Timestamp(
            downcast::<TimestampMicrosecondArray>(key, array)?
                .iter()
                .map(|value| value.map(|micros| decode_timestamp(key, micros)).transpose())
                .collect::<PipelineResult<_>>()?,
        ),
        DataType::List(_) => Column::FloatList(
            downcast::<ListArray>(key, array)?
                .iter()
                .map(|value| {
                    value
                        .map(|list| {
                            downcast::<Float64Array>(key, list.as_ref())
                                .map(|floats| floats.iter().map(|x| x.unwrap_or(f64::NAN)).collect())
                        })
                        .transpose()
                })
                .collect::<PipelineResult<_>>()?,
        ),
        other => {
            return Err(PipelineError::cache(format!(
                "column '{key}' has unsupported type {other}"
            )))
        }
    };
    Ok(column)
}

fn decode_timestamp(key: &FieldKey, micros: i64) -> PipelineResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        PipelineError::cache(format!("column '{key}' holds out-of-range timestamp {micros}"))
    })
}
