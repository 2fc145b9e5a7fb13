//! Dump command implementation.

use super::scan::scan_log;
use std::path::Path;

/// Renders bytes as UTF-8 when printable, hex otherwise.
fn render(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) if s.chars().all(|c| !c.is_control()) => format!("{s:?}"),
        _ => {
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("0x{hex}")
        }
    }
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    after_lsn: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut printed = 0usize;

    let report = scan_log(path, |offset, fields| {
        if fields.lsn.as_u64() <= after_lsn {
            return true;
        }

        println!(
            "{offset:>10}  lsn={} ts={} key={} value={}",
            fields.lsn.as_u64(),
            fields.ts,
            render(fields.key),
            render(fields.value),
        );

        printed += 1;
        limit.map_or(true, |limit| printed < limit)
    })?;

    println!();
    println!(
        "{printed} records shown ({} valid in log, max lsn {})",
        report.records, report.max_lsn
    );

    Ok(())
}
