//! Save subcommand implementation.
//!
//! Handles the `reportlog save [FILE]` command for appending records.

use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::ReportLog;
use crate::types::ReportRecord;
use clap::Parser;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

/// Append a report record to the log.
#[derive(Parser, Debug)]
pub struct SaveCommand {
    /// File holding one JSON object
    ///
    /// Reads standard input when omitted or given as "-".
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl SaveCommand {
    /// Execute the save command.
    pub fn execute(&self, log: &ReportLog, quiet: bool) -> CliResult<()> {
        let raw = match &self.file {
            Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)?,
            _ => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let value: serde_json::Value =
            serde_json::from_str(raw.trim()).map_err(|e| CliError::InvalidRecord(e.to_string()))?;
        let record = ReportRecord::from_value(value)
            .ok_or_else(|| CliError::InvalidRecord("expected a JSON object".to_string()))?;

        log.save_report(&record)?;

        if !quiet {
            output::print_success(&format!(
                "Saved report {} to {}",
                record.display_field("report_id"),
                log.path().display()
            ));
        }

        Ok(())
    }
}
