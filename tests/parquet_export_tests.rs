mod common;

use arrow::array::{Array, Int16Array, Int8Array, StringArray, UInt64Array};
use arrow::datatypes::DataType;
use common::ReadoutBuilder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use sensor_readout_parser::{
    Error, ParquetWriter, ParquetWriterBuilder, ParseResult, SensorReadoutReaderBuilder,
};
use std::fs::File;
use std::path::Path;
use tempfile::tempdir;

fn parse(text: &str) -> ParseResult {
    SensorReadoutReaderBuilder::new().parse_str(text).unwrap()
}

fn row_count(path: &Path) -> i64 {
    let reader = SerializedFileReader::new(File::open(path).unwrap()).unwrap();
    reader.metadata().file_metadata().num_rows()
}

fn column_types(path: &Path) -> Vec<(String, DataType)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap()).unwrap();
    builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), f.data_type().clone()))
        .collect()
}

fn sample_document() -> String {
    ReadoutBuilder::new()
        .file_metadata(0, "2024-05-01", "sam", "office")
        .accel(10, 0.1, 0.2, 9.8)
        .accel(20, 0.1, 0.3, 9.7)
        .wifi(30, "aa:bb:cc:dd:ee:ff", 2412, -58)
        .uwb(40, (1.0, 2.0, 0.5), 88, &[(3, 1450, 70), (4, 2250, 55)])
        .event(50, 17, &["1", "aa:bb", "1200", "35", "-50", "8", "7"])
        .end_section()
        .build()
}

// ============================================================================
// SINGLE SECTION
// ============================================================================

#[test]
fn test_single_section_tables() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    let stats = ParquetWriter::new(&out)
        .write_with_stats(&parse(&sample_document()))
        .unwrap();

    assert_eq!(stats.num_sections, 1);
    assert_eq!(stats.num_records, 6);
    // events, accelerometer, wifi, wifi_rtt, decawave_uwb, file_metadata, uwb_distances
    assert_eq!(stats.num_files, 7);
    assert!(stats.summary().contains("6 records"));

    assert_eq!(row_count(&out.join("events_part000.parquet")), 6);
    assert_eq!(row_count(&out.join("accelerometer_part000.parquet")), 2);
    assert_eq!(row_count(&out.join("uwb_distances_part000.parquet")), 2);
    assert!(!out.join("gyroscope_part000.parquet").exists());
}

#[test]
fn test_column_types_follow_schemas() {
    let dir = tempdir().unwrap();
    ParquetWriter::new(dir.path())
        .write(&parse(&sample_document()))
        .unwrap();

    assert_eq!(
        column_types(&dir.path().join("wifi_rtt_part000.parquet")),
        vec![
            ("eventIdx".to_string(), DataType::UInt64),
            ("timestamp".to_string(), DataType::UInt64),
            ("success".to_string(), DataType::Boolean),
            ("mac".to_string(), DataType::Utf8),
            ("distInMM".to_string(), DataType::Int64),
            ("distInStdDevMM".to_string(), DataType::Int64),
            ("rssi".to_string(), DataType::Int64),
            ("numAttempted".to_string(), DataType::Int64),
            ("numSuccessful".to_string(), DataType::Int64),
        ]
    );

    let uwb = column_types(&dir.path().join("decawave_uwb_part000.parquet"));
    assert_eq!(uwb[2], ("X".to_string(), DataType::Float64));
    assert_eq!(uwb[5], ("qualityFactor".to_string(), DataType::Int8));

    let events = column_types(&dir.path().join("events_part000.parquet"));
    assert_eq!(events[2], ("eventID".to_string(), DataType::Int64));
}

#[test]
fn test_uwb_distance_values() {
    let dir = tempdir().unwrap();
    ParquetWriter::new(dir.path())
        .write(&parse(&sample_document()))
        .unwrap();

    let file = File::open(dir.path().join("uwb_distances_part000.parquet")).unwrap();
    let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.next().unwrap().unwrap();
    assert_eq!(batch.num_rows(), 2);

    let event_idx = batch.column(0).as_any().downcast_ref::<UInt64Array>().unwrap();
    let node = batch.column(1).as_any().downcast_ref::<Int16Array>().unwrap();
    let quality = batch.column(3).as_any().downcast_ref::<Int8Array>().unwrap();
    assert_eq!(event_idx.value(0), 4);
    assert_eq!(node.value(0), 3);
    assert_eq!(node.value(1), 4);
    assert_eq!(quality.value(1), 55);
}

#[test]
fn test_string_column_values() {
    let dir = tempdir().unwrap();
    ParquetWriter::new(dir.path())
        .write(&parse(&sample_document()))
        .unwrap();

    let file = File::open(dir.path().join("file_metadata_part000.parquet")).unwrap();
    let batch = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let person = batch
        .column_by_name("person")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(person.len(), 1);
    assert_eq!(person.value(0), "sam");
}

// ============================================================================
// NAMED SECTIONS AND CHUNKING
// ============================================================================

#[test]
fn test_named_sections_get_subdirectories() {
    let text = ReadoutBuilder::new()
        .point_header("FP/1", &[])
        .accel(1, 0.0, 0.0, 1.0)
        .end_section()
        .point_header("FP 2", &[])
        .wifi(2, "m", 2412, -40)
        .end_section()
        .build();

    let dir = tempdir().unwrap();
    let stats = ParquetWriter::new(dir.path())
        .write_with_stats(&parse(&text))
        .unwrap();

    assert_eq!(stats.num_sections, 2);
    assert!(dir.path().join("section=FP_1/accelerometer_part000.parquet").exists());
    assert!(dir.path().join("section=FP 2/wifi_part000.parquet").exists());
    assert!(!dir.path().join("section=FP 2/accelerometer_part000.parquet").exists());
}

#[test]
fn test_chunked_output() {
    let mut builder = ReadoutBuilder::new();
    for i in 0..25u64 {
        builder = builder.accel(i, i as f64, 0.0, 0.0);
    }
    let dir = tempdir().unwrap();
    ParquetWriter::new(dir.path())
        .chunk_size(10)
        .write(&parse(&builder.build()))
        .unwrap();

    assert_eq!(row_count(&dir.path().join("accelerometer_part000.parquet")), 10);
    assert_eq!(row_count(&dir.path().join("accelerometer_part001.parquet")), 10);
    assert_eq!(row_count(&dir.path().join("accelerometer_part002.parquet")), 5);
    assert!(!dir.path().join("accelerometer_part003.parquet").exists());
}

#[test]
fn test_builder_requires_output_directory() {
    assert!(matches!(
        ParquetWriterBuilder::new().chunk_size(10).build(),
        Err(Error::Output(_))
    ));

    let dir = tempdir().unwrap();
    let writer = ParquetWriterBuilder::new()
        .output_directory(dir.path())
        .chunk_size(5)
        .build()
        .unwrap();
    writer.write(&parse("1;13;2.5\n")).unwrap();
    assert!(dir.path().join("light_part000.parquet").exists());
}

#[test]
fn test_colliding_section_directories_are_rejected() {
    let text = ReadoutBuilder::new()
        .point_header("a/b", &[])
        .accel(1, 0.0, 0.0, 1.0)
        .end_section()
        .point_header("a_b", &[])
        .accel(2, 0.0, 0.0, 1.0)
        .accel(3, 0.0, 0.0, 1.0)
        .end_section()
        .build();

    let dir = tempdir().unwrap();
    match ParquetWriter::new(dir.path()).write(&parse(&text)) {
        Err(Error::Output(msg)) => assert!(msg.contains("section=a_b"), "message: {}", msg),
        other => panic!("expected output error, got {:?}", other),
    }
    // Nothing is written once a collision is found
    assert!(!dir.path().join("section=a_b").exists());
}

#[test]
fn test_anonymous_section_collides_with_underscore_name() {
    let text = ReadoutBuilder::new()
        .accel(1, 0.0, 0.0, 1.0)
        .end_section()
        .point_header("_", &[])
        .accel(2, 0.0, 0.0, 1.0)
        .end_section()
        .build();

    let dir = tempdir().unwrap();
    assert!(matches!(
        ParquetWriter::new(dir.path()).write(&parse(&text)),
        Err(Error::Output(_))
    ));
}
