//! Assembly of one section: optional header, then data lines up to a blank line.

use log::debug;

use crate::cursor::LineCursor;
use crate::decoder::{LineContext, RecordDecoder};
use crate::error::Result;
use crate::header::{parse_header, Fingerprint};
use crate::models::SectionResult;

pub struct SectionAssembler<'d> {
    decoder: &'d RecordDecoder,
}

impl<'d> SectionAssembler<'d> {
    pub fn new(decoder: &'d RecordDecoder) -> Self {
        Self { decoder }
    }

    /// Read one section starting at the cursor.
    ///
    /// A header is consumed when the next line starts with `[`. Data lines are
    /// read until a blank line (consumed) or the end of input.
    pub fn assemble(&self, cursor: &mut LineCursor<'_>) -> Result<SectionResult> {
        let fingerprint = if cursor.peek_char() == Some('[') {
            Some(parse_header(cursor)?)
        } else {
            None
        };
        self.read_data(cursor, fingerprint)
    }

    fn read_data(
        &self,
        cursor: &mut LineCursor<'_>,
        fingerprint: Option<Fingerprint>,
    ) -> Result<SectionResult> {
        let first_line = cursor.line_number() + 1;
        let key = fingerprint
            .as_ref()
            .map(|fp| fp.name().to_string())
            .unwrap_or_default();
        let mut section = SectionResult::new(fingerprint);
        let mut event_index = 0usize;

        while let Some(line) = cursor.next_line() {
            let line = line.trim();
            if line.is_empty() {
                break;
            }

            let ctx = LineContext {
                line: cursor.line_number(),
                section: &key,
            };
            let decoded = self.decoder.decode(line, event_index, &ctx)?;
            event_index += 1;

            section.events.push(decoded.event);
            if let Some(record) = decoded.record {
                section.records.entry(record.kind).or_default().push(record);
            }
            if let Some(distances) = decoded.uwb_distances {
                section.uwb_distances.extend(distances);
            }
        }

        debug!(
            "Section {:?} (from line {}): {} events, {} records, {} UWB distances",
            key,
            first_line,
            section.events.len(),
            section.record_count(),
            section.uwb_distances.len()
        );

        Ok(section)
    }
}
