//! List subcommand implementation.
//!
//! Handles the `reportlog list` command for inspecting the log.

use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::{LogEntry, ReportLog};
use clap::Parser;
use std::io::{self, Write};

/// Show the log's contents.
#[derive(Parser, Debug)]
pub struct ListCommand {
    /// Show only the most recent COUNT entries
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub count: Option<usize>,

    /// Emit raw JSON lines instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(&self, log: &ReportLog, quiet: bool) -> CliResult<()> {
        let mut entries = log.entries()?;
        if let Some(count) = self.count {
            let skip = entries.len().saturating_sub(count);
            entries.drain(..skip);
        }

        if self.json {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for entry in &entries {
                match entry {
                    LogEntry::Record(record) => {
                        let line = serde_json::to_string(record)
                            .map_err(|e| CliError::Other(e.to_string()))?;
                        writeln!(out, "{line}")?;
                    }
                    LogEntry::Malformed(line) => writeln!(out, "{line}")?,
                }
            }
            return Ok(());
        }

        output::print_entries(&entries)?;
        if !quiet {
            output::print_stats(&log.stats()?);
        }

        Ok(())
    }
}
