//! Command-line interface for the sensor readout parser.
//!
//! Converts readout recordings into per-kind Parquet tables or a JSON dump.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use sensor_readout_parser::{EventKind, ParquetWriter, ParseResult, SensorReadoutReader};
use sensor_readout_parser::decoder::ActiveKinds;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Parquet,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convert sensor readout recordings to Parquet tables",
    long_about = "Parses semicolon-delimited sensor readout recordings (optionally with \
                  fingerprint headers) into one typed table per event kind.\n\n\
                  Parquet output writes one directory per input file; named fingerprint \
                  sections get their own section=<name> subdirectory."
)]
struct Args {
    /// Readout files to convert
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Root output directory
    #[arg(short, long, value_name = "OUT_ROOT")]
    out_root: PathBuf,

    /// Number of rows per Parquet file chunk
    #[arg(long, default_value = "50000")]
    chunk_size: usize,

    /// Only read Wi-Fi, Wi-Fi RTT, BLE and UWB events
    #[arg(long, conflicts_with = "sensors")]
    radio_only: bool,

    /// Comma separated event kinds to read, e.g. accelerometer,wifi
    #[arg(long, value_delimiter = ',')]
    sensors: Option<Vec<EventKind>>,

    /// Output format
    #[arg(long, value_enum, default_value = "parquet")]
    format: OutputFormat,
}

impl Args {
    fn active_kinds(&self) -> ActiveKinds {
        if self.radio_only {
            ActiveKinds::radio()
        } else {
            ActiveKinds::from_option(self.sensors.as_deref())
        }
    }
}

fn log_summary(result: &ParseResult) {
    for (name, section) in result.sections() {
        let label = if name.is_empty() { "<anonymous>" } else { name };
        info!(
            "   ├─ Section {}: {} events, {} records, {} UWB distances",
            label,
            section.events.len(),
            section.record_count(),
            section.uwb_distances.len()
        );
        for (kind, records) in &section.records {
            info!("   │    {:<22} {:>8}", kind.name(), records.len());
        }
    }
}

fn convert_one_file(input_file: &Path, output_dir: &Path, args: &Args) -> Result<()> {
    info!("📄 Processing: {}", input_file.display());
    let start_time = Instant::now();

    let reader = SensorReadoutReader::from_file(input_file)?;

    let t0 = Instant::now();
    let result = reader.parse_with(args.active_kinds())?;
    info!("   ├─ Parsed {} section(s) in {:.2?}", result.len(), t0.elapsed());
    log_summary(&result);

    let t1 = Instant::now();
    match args.format {
        OutputFormat::Parquet => {
            let stats = ParquetWriter::new(output_dir)
                .chunk_size(args.chunk_size)
                .write_with_stats(&result)?;
            info!("   ├─ Wrote Parquet in {:.2?}", t1.elapsed());
            info!("   ├─ {}", stats.summary());
        }
        OutputFormat::Json => {
            fs::create_dir_all(output_dir)?;
            let json_path = output_dir.join("readout.json");
            serde_json::to_writer_pretty(BufWriter::new(File::create(&json_path)?), &result)?;
            info!("   ├─ Wrote {} in {:.2?}", json_path.display(), t1.elapsed());
        }
    }
    info!("   └─ ✓ Total time: {:.2?}\n", start_time.elapsed());

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let args = Args::parse();

    info!("");
    info!("╔════════════════════════════════════════════╗");
    info!("║     Sensor Readout → Table Converter       ║");
    info!("╚════════════════════════════════════════════╝");
    info!("");
    info!("📂 {} input file(s)", args.inputs.len());
    info!("📁 Output directory: {}", args.out_root.display());
    info!(
        "📡 Active kinds: {}",
        args.active_kinds()
            .iter()
            .map(EventKind::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!("");

    let total_start = Instant::now();
    let mut failures = 0usize;

    for (idx, input_file) in args.inputs.iter().enumerate() {
        let file_name = input_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        info!("[{}/{}]", idx + 1, args.inputs.len());

        let output_dir = args.out_root.join(format!("filename={}", file_name));

        if let Err(e) = convert_one_file(input_file, &output_dir, &args) {
            log::error!("   └─ ✗ Error: {}", e);
            log::error!("");
            failures += 1;
            continue;
        }
    }

    info!("═══════════════════════════════════════════");
    info!("🏁 All files processed in {:.2?}", total_start.elapsed());
    info!("");

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed", failures, args.inputs.len());
    }
    Ok(())
}
