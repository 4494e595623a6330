//! Core type definitions for report records.

mod record;

pub use record::{ReportRecord, IMAGE_BYTES_KEY};
