//! HARP Log Reader CLI Application
//!
//! This is the command-line interface for the HARP log decoder.
//! It uses the harp-decoder library and adds:
//! - Command line and config.toml handling
//! - Message type selection
//! - CSV / JSON / summary output to a file or stdout

use anyhow::{bail, Context, Result};
use clap::Parser;
use harp_decoder::Decoder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// HARP Log Reader - Decode HARP device binary logs
#[derive(Parser, Debug)]
#[command(name = "harp-cli")]
#[command(about = "Decode HARP binary log files to CSV, JSON or a summary", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the HARP .bin file to decode
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip read messages
    #[arg(long)]
    no_read: bool,

    /// Skip write messages
    #[arg(long)]
    no_write: bool,

    /// Skip event messages
    #[arg(long)]
    no_event: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("HARP Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", harp_decoder::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    run(&args, &app_config)
}

/// Merge command line flags over the config file, decode and write output
fn run(args: &Args, app_config: &AppConfig) -> Result<()> {
    let input = match args.input.as_ref().or(app_config.input.file.as_ref()) {
        Some(path) => path,
        None => bail!("No input file given (use --input or [input] file in the config)"),
    };

    let mut decoder_config = app_config.filter.decoder_config()?;
    if args.no_read {
        decoder_config = decoder_config.with_read(false);
    }
    if args.no_write {
        decoder_config = decoder_config.with_write(false);
    }
    if args.no_event {
        decoder_config = decoder_config.with_event(false);
    }
    log::debug!("Decoder configuration: {:?}", decoder_config);

    let decoder = Decoder::new();
    let records = decoder
        .decode_file(input, &decoder_config)
        .with_context(|| format!("Failed to decode {:?}", input))?;

    let format = args.format.unwrap_or(app_config.output.format);
    let cache = decoder.cache_stats();

    match args.output.as_ref().or(app_config.output.path.as_ref()) {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut out = BufWriter::new(file);
            report::write_records(&mut out, format, &records, &cache)?;
            out.flush()?;
            log::info!("Wrote {} records to {:?}", records.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            report::write_records(&mut out, format, &records, &cache)?;
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    // Logs go to stderr so CSV/JSON on stdout stays clean
    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
