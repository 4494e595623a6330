//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `reportlog save [FILE]` - Append a report record to the log
//! - `reportlog remove --id <ID>` - Remove a report from the log
//! - `reportlog list` - Show the log's contents

mod list;
mod remove;
mod save;

pub use list::ListCommand;
pub use remove::RemoveCommand;
pub use save::SaveCommand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// reportlog - append-only JSONL report storage.
///
/// Records are persisted one JSON object per line. Removal matches a
/// record by its id, or by its description and submitting user when no id
/// is available.
#[derive(Parser, Debug)]
#[command(name = "reportlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Append-only JSONL report storage", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report log file to operate on (overrides configuration)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append a report record to the log
    #[command(alias = "s")]
    Save(SaveCommand),

    /// Remove one report from the log
    #[command(alias = "rm")]
    Remove(RemoveCommand),

    /// Show the log's contents
    #[command(alias = "ls")]
    List(ListCommand),
}
