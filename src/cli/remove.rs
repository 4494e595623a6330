//! Remove subcommand implementation.
//!
//! Handles the `reportlog remove` command. A miss is a normal outcome,
//! reported but not an error.

use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::{RemoveQuery, ReportLog};
use clap::Parser;

/// Remove one report from the log.
///
/// Only the first matching line is removed, even if several match.
#[derive(Parser, Debug)]
pub struct RemoveCommand {
    /// Report id to remove
    #[arg(long = "id", value_name = "REPORT_ID")]
    pub report_id: Option<String>,

    /// Description to match when no id is known
    #[arg(long, value_name = "TEXT", requires = "user")]
    pub description: Option<String>,

    /// Submitting user to match, together with --description
    #[arg(long, value_name = "USER_ID", requires = "description")]
    pub user: Option<String>,
}

impl RemoveCommand {
    /// Execute the remove command.
    pub fn execute(&self, log: &ReportLog, quiet: bool) -> CliResult<()> {
        let mut query = RemoveQuery::new();
        if let Some(id) = &self.report_id {
            query = query.with_report_id(id);
        }
        if let (Some(description), Some(user)) = (&self.description, &self.user) {
            query = query.with_submission(description, user);
        }
        if query.is_unconstrained() {
            return Err(CliError::Other(
                "specify --id, or --description together with --user".to_string(),
            ));
        }

        if log.remove_report(&query)? {
            if !quiet {
                output::print_success(&format!("Removed report from {}", log.path().display()));
            }
        } else if !quiet {
            output::print_warning("No matching report found");
        }

        Ok(())
    }
}
