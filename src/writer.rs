//! High-level API for writing parsed sensor readouts to Parquet.

use crate::error::{Error, Result};
use crate::formats::parquet::{sanitize_path_component, ParquetFormatter};
use crate::models::{ParseResult, SectionResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Writer for outputting parsed sections to Apache Parquet format.
///
/// Every section becomes one set of tables: `events` (chronological index),
/// one table per materialized event kind, and `uwb_distances`. A single
/// anonymous section is written directly into the output directory; named
/// sections go into `section=<name>` subdirectories.
///
/// # Examples
///
/// ```no_run
/// use sensor_readout_parser::{ParquetWriter, SensorReadoutReader};
///
/// let result = SensorReadoutReader::from_file("recording.csv")?.parse(None)?;
///
/// ParquetWriter::new("output_dir")
///     .write(&result)?;
/// # Ok::<(), sensor_readout_parser::Error>(())
/// ```
pub struct ParquetWriter {
    output_directory: PathBuf,
    chunk_size: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer that will write to the specified directory.
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
            chunk_size: 50_000, // Default chunk size
        }
    }

    /// Set the number of rows per Parquet file. Default is 50,000.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Write every section of a parse result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if a directory or Parquet file cannot be written.
    pub fn write(self, result: &ParseResult) -> Result<()> {
        self.write_with_stats(result).map(|_| ())
    }

    /// Write every section and report what was written.
    pub fn write_with_stats(self, result: &ParseResult) -> Result<WriteStats> {
        let mut stats = WriteStats::default();
        match result {
            ParseResult::Single(section) => {
                self.write_section(&self.output_directory, section, &mut stats)?;
            }
            ParseResult::Named(sections) => {
                // Directories are checked before anything is written
                let mut claimed: HashMap<String, &str> = HashMap::new();
                let mut targets = Vec::with_capacity(sections.len());
                for (name, section) in sections {
                    let component = sanitize_path_component(name);
                    if let Some(other) = claimed.insert(component.clone(), name.as_str()) {
                        return Err(Error::Output(format!(
                            "Sections {:?} and {:?} both map to directory section={}",
                            other, name, component
                        )));
                    }
                    let dir = self.output_directory.join(format!("section={}", component));
                    targets.push((dir, section));
                }
                for (dir, section) in targets {
                    self.write_section(&dir, section, &mut stats)?;
                }
            }
        }
        Ok(stats)
    }

    fn write_section(&self, dir: &Path, section: &SectionResult, stats: &mut WriteStats) -> Result<()> {
        let files = ParquetFormatter::new(dir, self.chunk_size)
            .convert(section)
            .map_err(|e| Error::Output(e.to_string()))?;

        stats.num_sections += 1;
        stats.num_records += section.record_count();
        stats.num_files += files.len();
        stats.files.extend(files);
        Ok(())
    }
}

/// Statistics about a Parquet write operation.
#[derive(Debug, Clone, Default)]
pub struct WriteStats {
    /// Number of sections written
    pub num_sections: usize,
    /// Total number of typed records written (excluding index and UWB tables)
    pub num_records: usize,
    /// Number of Parquet files created
    pub num_files: usize,
    /// Paths of the files created
    pub files: Vec<PathBuf>,
}

impl WriteStats {
    /// Get a human-readable summary of the write operation.
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} records from {} section(s) across {} file(s)",
            self.num_records, self.num_sections, self.num_files
        )
    }
}

/// Builder for configuring Parquet write options.
pub struct ParquetWriterBuilder {
    output_directory: Option<PathBuf>,
    chunk_size: usize,
}

impl ParquetWriterBuilder {
    /// Create a new Parquet writer builder with default options.
    pub fn new() -> Self {
        Self {
            output_directory: None,
            chunk_size: 50_000,
        }
    }

    /// Set the output directory.
    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the chunk size.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Build the Parquet writer.
    ///
    /// # Errors
    ///
    /// Returns an error if output_directory was not set.
    pub fn build(self) -> Result<ParquetWriter> {
        let output_directory = self
            .output_directory
            .ok_or_else(|| Error::Output("Output directory not set".to_string()))?;

        Ok(ParquetWriter {
            output_directory,
            chunk_size: self.chunk_size,
        })
    }
}

impl Default for ParquetWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
