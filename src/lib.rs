//! # reportlog - Append-Only JSONL Report Storage
//!
//! reportlog persists free-form report records to an append-only,
//! line-delimited JSON file and can later excise a single record by id or
//! by a (description, user) fallback match.
//!
//! ## Features
//!
//! - **Append-only persistence**: One JSON object per line; appends are
//!   flushed and synced before returning
//! - **Schema-free records**: Arbitrary fields ride along untouched;
//!   well-known fields get typed accessors
//! - **Safe field handling**: Binary image payloads are stripped before
//!   persisting; unserializable values degrade to their string form
//! - **Tolerant removal**: Lines that fail to parse are preserved verbatim
//!   through every rewrite
//! - **Injected storage path**: The log location is a constructor argument,
//!   so tests run against temporary directories
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use reportlog::{RemoveQuery, ReportLog, ReportRecord};
//!
//! let log = ReportLog::new("data/dataset.jsonl");
//!
//! let mut record = ReportRecord::new();
//! record
//!     .insert("report_id", "r-1024")
//!     .insert("description", "Streetlight out on 5th")
//!     .insert("user_id", "u42");
//! log.save_report(&record)?;
//!
//! let removed = log.remove_report(&RemoveQuery::new().with_report_id("r-1024"))?;
//! assert!(removed);
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`types`] - The schema-free record type and its field handling
//! - [`storage`] - The append-only log and its removal queries
//! - [`config`] - Settings and platform-default paths
//! - [`error`] - Comprehensive error types
//! - [`cli`] - Subcommand definitions for the binary
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, StoreError};
pub use storage::{LogEntry, LogStats, RemoveQuery, ReportLog};
pub use types::{ReportRecord, IMAGE_BYTES_KEY};
