//! Reset command implementation.

use redolog_core::{CancelToken, Policy, Wal};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Runs the reset command.
///
/// Truncates the log back to header-only length after confirmation. Takes
/// the writer lock, so it refuses to reset a log another process has open.
pub fn run(path: &Path, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !yes {
        print!(
            "This discards every record in {}. Proceed? [y/N] ",
            path.display()
        );
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let wal = Wal::open(path, Policy::default(), CancelToken::new())?;
    wal.reset()?;
    wal.close()?;

    println!("Log reset to header-only length.");
    Ok(())
}
