use anyhow::Result;
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int16Array, Int64Array, Int8Array, RecordBatch,
    StringArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use log::{debug, info};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::{ChronologicalEvent, FieldValue, Record, SectionResult, UwbDistanceSample};
use crate::registry::{Column, ColumnType, EventKindRegistry};

/// Table name of the chronological index.
pub const EVENTS_TABLE: &str = "events";
/// Table name of the UWB distance samples.
pub const UWB_DISTANCES_TABLE: &str = "uwb_distances";

pub fn arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Bool => DataType::Boolean,
        ColumnType::Int8 => DataType::Int8,
        ColumnType::Int16 => DataType::Int16,
        ColumnType::Int => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::String => DataType::Utf8,
    }
}

/// Replace path separators so a fingerprint name can be used as a directory name.
pub fn sanitize_path_component(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

/// Writes the tables of one section into a directory, one set of
/// `<table>_partNNN.parquet` files per table.
pub struct ParquetFormatter {
    output_directory: PathBuf,
    chunk_size: usize,
}

impl ParquetFormatter {
    pub fn new<P: Into<PathBuf>>(output_directory: P, chunk_size: usize) -> Self {
        Self {
            output_directory: output_directory.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Write every non-empty table of the section. Returns the files created.
    pub fn convert(&self, section: &SectionResult) -> Result<Vec<PathBuf>> {
        create_dir_all(&self.output_directory)?;
        let mut written = Vec::new();

        written.extend(self.write_table(EVENTS_TABLE, &section.events, events_batch)?);

        for (kind, records) in &section.records {
            let schema = EventKindRegistry::global().schema_for(*kind)?;
            let columns = schema.columns();
            written.extend(self.write_table(kind.name(), records, |rows| {
                records_batch(columns, rows)
            })?);
        }

        written.extend(self.write_table(
            UWB_DISTANCES_TABLE,
            &section.uwb_distances,
            uwb_batch,
        )?);

        info!(
            "Wrote {} file(s) to {}",
            written.len(),
            self.output_directory.display()
        );
        Ok(written)
    }

    fn write_table<T, F>(&self, table: &str, rows: &[T], build: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(&[T]) -> Result<RecordBatch>,
    {
        if rows.is_empty() {
            debug!("Skipping empty table {}", table);
            return Ok(Vec::new());
        }

        let total_chunks = (rows.len() + self.chunk_size - 1) / self.chunk_size;
        let mut written = Vec::with_capacity(total_chunks);
        for (i, chunk) in rows.chunks(self.chunk_size).enumerate() {
            info!(
                "Writing {} chunk {}/{}, {} rows",
                table,
                i + 1,
                total_chunks,
                chunk.len()
            );
            let output_path = self
                .output_directory
                .join(format!("{}_part{:03}.parquet", table, i));
            write_batch(&build(chunk)?, &output_path)?;
            written.push(output_path);
        }
        Ok(written)
    }
}

fn write_batch(batch: &RecordBatch, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn index_fields() -> Vec<Field> {
    vec![
        Field::new("eventIdx", DataType::UInt64, false),
        Field::new("timestamp", DataType::UInt64, false),
    ]
}

fn events_batch(rows: &[ChronologicalEvent]) -> Result<RecordBatch> {
    let mut fields = index_fields();
    fields.push(Field::new("eventID", DataType::Int64, false));
    let schema = Arc::new(Schema::new(fields));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.event_index as u64))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.timestamp))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.kind.discriminant()))),
    ];
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn uwb_batch(rows: &[UwbDistanceSample]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("eventIdx", DataType::UInt64, false),
        Field::new("nodeId", DataType::Int16, false),
        Field::new("distance", DataType::Int64, false),
        Field::new("qualityFactor", DataType::Int8, false),
    ]));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.event_index as u64))),
        Arc::new(Int16Array::from_iter_values(rows.iter().map(|r| r.node_id))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.distance_mm))),
        Arc::new(Int8Array::from_iter_values(rows.iter().map(|r| r.quality_factor))),
    ];
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn records_batch(columns: &[Column], rows: &[Record]) -> Result<RecordBatch> {
    let mut fields = index_fields();
    fields.extend(
        columns
            .iter()
            .map(|c| Field::new(c.name, arrow_type(c.ty), false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.event_index as u64))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.timestamp))),
    ];
    for (i, column) in columns.iter().enumerate() {
        arrays.push(build_typed_array(rows, i, column)?);
    }
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn build_typed_array(rows: &[Record], index: usize, column: &Column) -> Result<ArrayRef> {
    let values = rows.iter().map(|r| r.fields.get(index));
    let mismatch = || anyhow::anyhow!("Column {} holds a value of another type", column.name);

    let array: ArrayRef = match column.ty {
        ColumnType::Bool => Arc::new(BooleanArray::from(
            values
                .map(|v| v.and_then(FieldValue::as_bool).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Int8 => Arc::new(Int8Array::from(
            values
                .map(|v| match v {
                    Some(FieldValue::Int8(x)) => Ok(*x),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Int16 => Arc::new(Int16Array::from(
            values
                .map(|v| match v {
                    Some(FieldValue::Int16(x)) => Ok(*x),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Int => Arc::new(Int64Array::from(
            values
                .map(|v| match v {
                    Some(FieldValue::Int(x)) => Ok(*x),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Float => Arc::new(Float64Array::from(
            values
                .map(|v| v.and_then(FieldValue::as_f64).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::String => Arc::new(StringArray::from(
            values
                .map(|v| v.and_then(FieldValue::as_str).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()?,
        )),
    };
    Ok(array)
}
