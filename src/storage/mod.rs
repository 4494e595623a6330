//! Report persistence.
//!
//! Provides the append-only JSONL report log and its removal queries.

mod report_log;

pub use report_log::{LogEntry, LogStats, RemoveQuery, ReportLog};
