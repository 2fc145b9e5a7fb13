//! Inspect command implementation.

use super::scan::{scan_log, ScanStop};
use serde::Serialize;
use std::path::Path;

/// Machine-readable inspection report.
#[derive(Debug, Serialize)]
struct InspectReport {
    path: String,
    file_len: u64,
    magic: String,
    version: u32,
    crc32c: bool,
    created_at: u64,
    records: u64,
    max_lsn: u64,
    valid_up_to: u64,
    trailing_bytes: u64,
    tail_state: String,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = scan_log(path, |_, _| true)?;

    let out = InspectReport {
        path: path.display().to_string(),
        file_len: report.file_len,
        magic: format!("{:#010x}", report.header.magic),
        version: report.header.version,
        crc32c: report.header.has_crc32c(),
        created_at: report.header.created_at,
        records: report.records,
        max_lsn: report.max_lsn,
        valid_up_to: report.valid_up_to,
        trailing_bytes: report.trailing_bytes(),
        tail_state: report.stop.describe().to_string(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&out)?),
        "text" => {
            println!("Log file:    {}", out.path);
            println!("Size:        {} bytes", out.file_len);
            println!("Magic:       {}", out.magic);
            println!("Version:     {}", out.version);
            println!(
                "Features:    {}",
                if out.crc32c { "crc32c" } else { "(none)" }
            );
            println!("Created at:  {} (unix seconds)", out.created_at);
            println!("Records:     {}", out.records);
            println!("Max LSN:     {}", out.max_lsn);
            if report.stop == ScanStop::CleanEnd {
                println!("Tail state:  clean");
            } else {
                println!(
                    "Tail state:  {} ({} unreplayable bytes from offset {})",
                    out.tail_state, out.trailing_bytes, out.valid_up_to
                );
            }
        }
        other => return Err(format!("unknown output format: {other}").into()),
    }

    Ok(())
}
