//! Writes parsed sections back to the readout line grammar.
//!
//! Only materialized records are written; lines of inactive or unsupported
//! kinds are not part of a [`SectionResult`] and cannot be restored.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::header::{Fingerprint, HeaderValue};
use crate::models::{FieldValue, ParseResult, Record, SectionResult, UwbDistanceSample};

pub struct Serializer<W: Write> {
    out: W,
}

impl<W: Write> Serializer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write every section of a parse result.
    pub fn write_result(&mut self, result: &ParseResult) -> io::Result<()> {
        for (_, section) in result.sections() {
            self.write_section(section)?;
        }
        Ok(())
    }

    /// Write an optional header, the section's records in event order and the
    /// terminating blank line.
    pub fn write_section(&mut self, section: &SectionResult) -> io::Result<()> {
        if let Some(fingerprint) = &section.fingerprint {
            self.write_header(fingerprint)?;
        }

        let mut records: Vec<&Record> = section.records.values().flatten().collect();
        records.sort_by_key(|record| record.event_index);

        let mut tails: HashMap<usize, Vec<&UwbDistanceSample>> = HashMap::new();
        for sample in &section.uwb_distances {
            tails.entry(sample.event_index).or_default().push(sample);
        }

        for record in records {
            let tail = tails.get(&record.event_index).map(Vec::as_slice).unwrap_or(&[]);
            self.write_record(record, tail)?;
        }
        writeln!(self.out)
    }

    pub fn write_header(&mut self, fingerprint: &Fingerprint) -> io::Result<()> {
        writeln!(self.out, "{}", fingerprint.fingerprint_type().tag())?;
        for (key, value) in fingerprint.parameters() {
            match value {
                HeaderValue::Scalar(value) => writeln!(self.out, "{}={}", key, value)?,
                HeaderValue::Array(items) => {
                    writeln!(self.out, "{}[]={}", key, items.len())?;
                    for (i, item) in items.iter().enumerate() {
                        writeln!(self.out, "{}[{}]={}", key, i, item)?;
                    }
                }
            }
        }
        writeln!(self.out)
    }

    fn write_record(&mut self, record: &Record, tail: &[&UwbDistanceSample]) -> io::Result<()> {
        write!(self.out, "{};{}", record.timestamp, record.kind.discriminant())?;
        for field in &record.fields {
            write!(self.out, ";")?;
            write_field(&mut self.out, field)?;
        }
        for sample in tail {
            write!(
                self.out,
                ";{};{};{}",
                sample.node_id, sample.distance_mm, sample.quality_factor
            )?;
        }
        writeln!(self.out)
    }
}

fn write_field<W: Write>(out: &mut W, field: &FieldValue) -> io::Result<()> {
    match field {
        // Booleans are decoded by truthiness, so false must be the empty token
        FieldValue::Bool(true) => write!(out, "1"),
        FieldValue::Bool(false) => Ok(()),
        FieldValue::Int8(v) => write!(out, "{}", v),
        FieldValue::Int16(v) => write!(out, "{}", v),
        FieldValue::Int(v) => write!(out, "{}", v),
        FieldValue::Float(v) => write!(out, "{}", v),
        FieldValue::Str(v) => write!(out, "{}", v),
    }
}

/// Serialize a parse result into a string.
pub fn to_string(result: &ParseResult) -> io::Result<String> {
    let mut serializer = Serializer::new(Vec::new());
    serializer.write_result(result)?;
    String::from_utf8(serializer.into_inner())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
