//! Standalone HARP log decoder tool
//!
//! Decodes a HARP binary file and prints the first records plus a summary.
//!
//! Usage:
//!   decode_harp <file.bin> [--limit <count>] [--no-read] [--no-write] [--no-event]
//!
//! Example:
//!   cargo run --example decode_harp -- Behavior_32.bin --limit 20

use harp_decoder::{Decoder, DecoderConfig, MessageType, Record};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

fn print_record(record: &Record) {
    let kind = record
        .kind()
        .map(|k| k.to_string())
        .unwrap_or_else(|| format!("type {}", record.message_type));
    let timestamp = record
        .timestamp
        .map(|t| format!("{:.6}s", t))
        .unwrap_or_else(|| "-".to_string());
    let values: Vec<String> = record.elements.iter().map(|v| v.to_string()).collect();

    println!(
        "[{:>14}] {:<5} reg {:>3}: {}",
        timestamp,
        kind,
        record.address,
        values.join(", ")
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <file.bin> [--limit <count>] [--no-read] [--no-write] [--no-event]",
            args[0]
        );
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let mut limit = 20usize;
    let mut config = DecoderConfig::new();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" if i + 1 < args.len() => {
                limit = args[i + 1].parse()?;
                i += 1;
            }
            "--no-read" => config = config.with_read(false),
            "--no-write" => config = config.with_write(false),
            "--no-event" => config = config.with_event(false),
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let decoder = Decoder::new();
    let records = decoder.decode_file(&path, &config)?;

    for record in records.iter().take(limit) {
        print_record(record);
    }
    if records.len() > limit {
        println!("... and {} more records", records.len() - limit);
    }

    let mut per_type: BTreeMap<String, usize> = BTreeMap::new();
    for record in &records {
        let key = record
            .kind()
            .map(|k: MessageType| k.to_string())
            .unwrap_or_else(|| "other".to_string());
        *per_type.entry(key).or_default() += 1;
    }

    println!("\n=== DECODING SUMMARY ===");
    println!("Total records: {}", records.len());
    for (kind, count) in &per_type {
        println!("  {}: {}", kind, count);
    }
    let stats = decoder.cache_stats();
    println!("Distinct payload layouts: {}", stats.entries);

    Ok(())
}
