//! Output formatting for the CLI.
//!
//! Produces human-readable listings of the report log with colors and
//! formatting, plus the shared status-line helpers.

use crate::storage::{LogEntry, LogStats};
use console::style;
use std::io::{self, Write};

/// Print log entries as a human-readable table.
///
/// Malformed lines are shown truncated and marked, never hidden — they are
/// part of the file and survive rewrites.
pub fn print_entries(entries: &[LogEntry]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if entries.is_empty() {
        writeln!(out, "  {}", style("Report log is empty.").dim())?;
        return Ok(());
    }

    writeln!(
        out,
        "  {}",
        style("──────────────────────────────────────────────────────────────").dim()
    )?;
    writeln!(
        out,
        "  {:<14}  {:<10}  {:<8}  {}",
        style("REPORT ID").bold(),
        style("USER").bold(),
        style("STATUS").bold(),
        style("DESCRIPTION").bold()
    )?;
    writeln!(
        out,
        "  {}",
        style("──────────────────────────────────────────────────────────────").dim()
    )?;

    for entry in entries {
        match entry {
            LogEntry::Record(record) => {
                writeln!(
                    out,
                    "  {:<14}  {:<10}  {:<8}  {}",
                    record.report_id().unwrap_or("-"),
                    record.user_id().unwrap_or("-"),
                    record.display_field("status"),
                    style(truncate_string(record.description().unwrap_or(""), 40)).dim()
                )?;
            }
            LogEntry::Malformed(line) => {
                writeln!(
                    out,
                    "  {} {}",
                    style("not JSON:").yellow().bold(),
                    style(truncate_string(line, 60)).dim()
                )?;
            }
        }
    }

    writeln!(
        out,
        "  {}",
        style("──────────────────────────────────────────────────────────────").dim()
    )?;

    Ok(())
}

/// Print the stats footer after a listing.
pub fn print_stats(stats: &LogStats) {
    println!(
        "  {} {} records, {} malformed lines, {} bytes",
        style("Total:").bold(),
        style(stats.records).green().bold(),
        if stats.malformed > 0 {
            style(stats.malformed).yellow().bold()
        } else {
            style(stats.malformed).dim()
        },
        stats.size_bytes
    );
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length, appending an ellipsis.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
