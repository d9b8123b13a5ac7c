//! # Sensor Readout Parser
//!
//! A Rust library for parsing sensor readout recordings: line-oriented,
//! semicolon-delimited event logs written by a mobile data-collection app for
//! indoor-positioning research.
//!
//! ## Features
//!
//! - **Typed tables**: one record list per event kind, driven by a static schema registry
//! - **Chronological index**: every data line with its position, timestamp and kind
//! - **UWB measurements**: variable-length anchor distance tails extracted into their own table
//! - **Fingerprints**: optional `[fingerprint:point]` / `[fingerprint:path]` section headers
//! - **Parquet output**: per-kind tables with column types taken from the schemas
//!
//! ## Quick Start
//!
//! ```no_run
//! use sensor_readout_parser::{ParquetWriter, ParseResult, SensorReadoutReader};
//!
//! let reader = SensorReadoutReader::from_file("recording.csv")?;
//! let result = reader.parse(None)?;
//!
//! if let ParseResult::Single(section) = &result {
//!     println!("{} accelerometer samples", section.accel().len());
//! }
//!
//! ParquetWriter::new("output_directory")
//!     .chunk_size(100_000)
//!     .write(&result)?;
//! # Ok::<(), sensor_readout_parser::Error>(())
//! ```
//!
//! ## File Format
//!
//! ```text
//! [fingerprint:point]          <- optional header
//! name=FP 053
//! position=(1.5;2;0)
//!                              <- blank line ends the header
//! 1000;0;0.1;9.8;0.2           <- timestamp;discriminant;fields...
//! 2000;20;1;2;3;90;5;1200;80   <- UWB: x;y;z;quality then node triples
//!                              <- blank line ends the section
//! ```
//!
//! A document holding a single section without header parses into
//! [`ParseResult::Single`]; otherwise sections are keyed by fingerprint name.
//!
//! ## Error Handling
//!
//! Parsing is all-or-nothing: the first malformed line rejects the document.
//!
//! ```no_run
//! use sensor_readout_parser::{Error, SensorReadoutReader};
//!
//! match SensorReadoutReader::from_file("recording.csv").and_then(|r| r.parse_radio()) {
//!     Ok(result) => println!("{} section(s)", result.len()),
//!     Err(Error::UnrecognizedDiscriminant { at, discriminant }) => {
//!         eprintln!("unknown event {} at {}", discriminant, at);
//!     }
//!     Err(err) => eprintln!("Error: {}", err),
//! }
//! ```

// Public API modules
pub mod error;
pub mod event;
pub mod reader;
pub mod serializer;
pub mod writer;

// Re-export commonly used types
pub use error::{Error, Location, Result};
pub use event::{EventKind, PedestrianActivity};
pub use header::{Fingerprint, FingerprintType, HeaderValue, PathFingerprint, PointFingerprint};
pub use models::{
    ChronologicalEvent, FieldValue, ParseResult, Record, SectionResult, Timestamp,
    UwbDistanceSample, Vec3,
};
pub use reader::{DocumentParser, SensorReadoutReader, SensorReadoutReaderBuilder};
pub use writer::{ParquetWriter, ParquetWriterBuilder, WriteStats};

// Internal modules (public but not part of the high-level API)
pub mod cursor;
pub mod decoder;
pub mod formats;
pub mod header;
pub mod models;
pub mod registry;
pub mod section;

use std::path::Path;

use registry::EventKindRegistry;

/// Parse a readout file, materializing `active_kinds` (all supported kinds when `None`).
pub fn parse<P: AsRef<Path>>(path: P, active_kinds: Option<&[EventKind]>) -> Result<ParseResult> {
    SensorReadoutReader::from_file(path)?.parse(active_kinds)
}

/// Parse a readout file keeping only Wi-Fi, Wi-Fi RTT, BLE and UWB events
/// (plus the structural kinds).
pub fn parse_radio_only<P: AsRef<Path>>(path: P) -> Result<ParseResult> {
    SensorReadoutReader::from_file(path)?.parse_radio()
}

/// Whether the registry has a schema for `kind`.
pub fn is_sensor_supported(kind: EventKind) -> bool {
    EventKindRegistry::global().is_supported(kind)
}
