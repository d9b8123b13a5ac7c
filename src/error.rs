//! Error types for the sensor readout parser library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::event::EventKind;

/// Result type alias for sensor readout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Position of an offending line inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number within the whole document
    pub line: usize,
    /// Key of the section being read (fingerprint name, empty when anonymous)
    pub section: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.section.is_empty() {
            write!(f, "line {}", self.line)
        } else {
            write!(f, "line {} (section {:?})", self.line, self.section)
        }
    }
}

/// Errors that can occur when parsing or exporting sensor readout files.
///
/// Every error is fatal: a document is rejected as a whole on the first one.
#[derive(Debug, Error)]
pub enum Error {
    /// Input path does not exist
    #[error("Input file {0:?} not found")]
    FileNotFound(PathBuf),

    /// Input path exists but is not a regular file
    #[error("Input path {0:?} is not a file")]
    NotAFile(PathBuf),

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not valid UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Unknown tag line, missing `=`, missing array entries or required keys
    #[error("Malformed fingerprint header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    /// The header block ran into the end of input without its blank line
    #[error("Expected blank line after fingerprint header at line {line}")]
    MissingBlankLine { line: usize },

    /// A `(x;y;z)` literal could not be parsed
    #[error("Malformed vector literal {raw:?} for header key {key:?} in header at line {line}")]
    MalformedVector {
        line: usize,
        key: String,
        raw: String,
    },

    /// Data line with fewer tokens than its kind requires
    #[error("Truncated data line at {at}: expected at least {expected} tokens, found {found}")]
    TruncatedLine {
        at: Location,
        expected: usize,
        found: usize,
    },

    /// UWB node measurements must come in (nodeId, distance, quality) triples
    #[error("Truncated UWB measurement tail at {at}: {remainder} dangling token(s)")]
    TruncatedUwbTail { at: Location, remainder: usize },

    /// Timestamp or discriminant token is not an integer
    #[error("Invalid {column} {raw:?} at {at}")]
    InvalidLineHead {
        at: Location,
        column: &'static str,
        raw: String,
    },

    /// Discriminant outside the closed set of event kinds
    #[error("Unrecognized event discriminant {discriminant} at {at}")]
    UnrecognizedDiscriminant { at: Location, discriminant: i64 },

    /// Event kind has no schema in the registry
    #[error("No schema registered for event kind {0}")]
    UnknownKind(EventKind),

    /// Two sections share one fingerprint name
    #[error("Duplicated fingerprint name {name:?} at line {line}")]
    DuplicateFingerprintName { name: String, line: usize },

    /// A field token does not parse as its declared column type
    #[error("Cannot coerce {raw:?} into field {field} of {kind} at {at}")]
    FieldCoercion {
        at: Location,
        kind: EventKind,
        field: &'static str,
        raw: String,
    },

    /// Output format error (e.g., Parquet write error)
    #[error("Output error: {0}")]
    Output(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Output(err.to_string())
    }
}
