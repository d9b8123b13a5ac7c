//! High-level API for reading sensor readout files.

use log::{debug, info};
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::cursor::LineCursor;
use crate::decoder::{ActiveKinds, RecordDecoder};
use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::models::{ParseResult, SectionResult};
use crate::section::SectionAssembler;

/// Splits a whole document into sections and collects them by fingerprint name.
pub struct DocumentParser {
    decoder: RecordDecoder,
}

impl DocumentParser {
    pub fn new(active: ActiveKinds) -> Self {
        Self {
            decoder: RecordDecoder::new(active),
        }
    }

    pub fn active_kinds(&self) -> &ActiveKinds {
        self.decoder.active_kinds()
    }

    /// Parse a complete document.
    ///
    /// Returns [`ParseResult::Single`] when the document consists of exactly one
    /// section without a header, otherwise every section keyed by name.
    pub fn parse_str(&self, text: &str) -> Result<ParseResult> {
        let assembler = SectionAssembler::new(&self.decoder);
        let mut cursor = LineCursor::new(text);
        let mut sections: BTreeMap<String, SectionResult> = BTreeMap::new();

        while cursor.peek_char().is_some() {
            // Stray separator lines between sections do not open a section
            if cursor.at_blank_line() {
                cursor.next_line();
                continue;
            }

            let start_line = cursor.line_number() + 1;
            let section = assembler.assemble(&mut cursor)?;
            let key = section
                .fingerprint
                .as_ref()
                .map(|fp| fp.name().to_string())
                .unwrap_or_default();

            if sections.contains_key(&key) {
                return Err(Error::DuplicateFingerprintName {
                    name: key,
                    line: start_line,
                });
            }
            sections.insert(key, section);
        }

        debug!("Parsed {} section(s)", sections.len());

        if sections.len() == 1 {
            if let Some(single) = sections.remove("") {
                return Ok(ParseResult::Single(single));
            }
        }
        Ok(ParseResult::Named(sections))
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(ActiveKinds::all())
    }
}

enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Source {
    fn bytes(&self) -> &[u8] {
        match self {
            Source::Mapped(map) => &map[..],
            Source::Owned(data) => data.as_slice(),
        }
    }
}

/// A reader for sensor readout files.
///
/// # Examples
///
/// ```no_run
/// use sensor_readout_parser::SensorReadoutReader;
///
/// let reader = SensorReadoutReader::from_file("recording.csv")?;
/// let result = reader.parse(None)?;
/// println!("{} section(s)", result.len());
/// # Ok::<(), sensor_readout_parser::Error>(())
/// ```
pub struct SensorReadoutReader {
    source: Source,
    path: Option<PathBuf>,
}

impl SensorReadoutReader {
    /// Open a readout file. The file is memory-mapped for the lifetime of the reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] or [`Error::NotAFile`] before any parsing,
    /// or an I/O error if the file cannot be opened.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let source = if file.metadata()?.len() == 0 {
            Source::Owned(Vec::new())
        } else {
            // SAFETY: the mapping is read-only and readout files are not
            // modified while a recording is being parsed.
            Source::Mapped(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            source,
            path: Some(path.to_path_buf()),
        })
    }

    /// Create a reader over raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            source: Source::Owned(data),
            path: None,
        }
    }

    /// Create a reader over an in-memory document.
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Self::from_bytes(text.into().into_bytes())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Parse with the given active kinds; `None` reads every supported kind.
    ///
    /// Structural kinds (file metadata, ground truth, pedestrian activity) are
    /// always read.
    pub fn parse(&self, active_kinds: Option<&[EventKind]>) -> Result<ParseResult> {
        self.parse_with(ActiveKinds::from_option(active_kinds))
    }

    /// Parse only the radio positioning kinds (Wi-Fi, Wi-Fi RTT, BLE, UWB).
    pub fn parse_radio(&self) -> Result<ParseResult> {
        self.parse_with(ActiveKinds::radio())
    }

    pub fn parse_with(&self, active: ActiveKinds) -> Result<ParseResult> {
        let text = std::str::from_utf8(self.source.bytes())?;
        if let Some(path) = &self.path {
            info!("Parsing {} ({} bytes)", path.display(), text.len());
        }
        DocumentParser::new(active).parse_str(text)
    }
}

/// Builder for configuring which event kinds are materialized.
///
/// # Examples
///
/// ```no_run
/// use sensor_readout_parser::{EventKind, SensorReadoutReaderBuilder};
///
/// let result = SensorReadoutReaderBuilder::new()
///     .active_kinds([EventKind::Accelerometer, EventKind::Wifi])
///     .parse_file("recording.csv")?;
/// # Ok::<(), sensor_readout_parser::Error>(())
/// ```
pub struct SensorReadoutReaderBuilder {
    active: ActiveKinds,
}

impl SensorReadoutReaderBuilder {
    /// Create a builder that reads every supported kind.
    pub fn new() -> Self {
        Self {
            active: ActiveKinds::all(),
        }
    }

    /// Restrict to the given kinds (plus the structural kinds).
    pub fn active_kinds<I: IntoIterator<Item = EventKind>>(mut self, kinds: I) -> Self {
        self.active = ActiveKinds::from_requested(kinds);
        self
    }

    pub fn radio_only(mut self) -> Self {
        self.active = ActiveKinds::radio();
        self
    }

    pub fn all_kinds(mut self) -> Self {
        self.active = ActiveKinds::all();
        self
    }

    pub fn build(self) -> DocumentParser {
        DocumentParser::new(self.active)
    }

    /// Open and parse a file with the configured kinds.
    pub fn parse_file<P: AsRef<Path>>(self, path: P) -> Result<ParseResult> {
        SensorReadoutReader::from_file(path)?.parse_with(self.active)
    }

    pub fn parse_str(self, text: &str) -> Result<ParseResult> {
        self.build().parse_str(text)
    }
}

impl Default for SensorReadoutReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
