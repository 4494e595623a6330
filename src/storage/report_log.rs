//! Append-only JSONL storage for report records.
//!
//! One JSON object per line, UTF-8, newline-terminated. The file only ever
//! grows through appends; it shrinks exclusively through the full rewrite a
//! successful removal performs. Lines that fail to parse are carried through
//! every rewrite untouched so that no data is ever silently dropped.
//!
//! There is no cross-process coordination: a removal's read-then-rewrite is
//! not atomic with respect to a concurrent append. Single-writer usage is
//! the supported pattern.

use crate::config::Paths;
use crate::error::{StoreError, StoreResult};
use crate::types::ReportRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Append-only report log backed by a JSON Lines file.
///
/// The storage path is fixed at construction. The file and its parent
/// directory are created lazily by the first append.
pub struct ReportLog {
    path: PathBuf,
}

impl ReportLog {
    /// Create a log handle for the given file path.
    ///
    /// No I/O happens here; the path only has to be creatable once the
    /// first record is saved.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a log handle at the platform-default location.
    pub fn open_default() -> Self {
        Self::new(Paths::get().data_file())
    }

    /// The file this log reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record to the log.
    ///
    /// The record is persisted without its `image_bytes` field. The JSON
    /// payload and its terminating newline go out in a single write, and
    /// the file is flushed and synced before this returns, so a successful
    /// call means the record is durably on disk. Existing content is never
    /// touched.
    pub fn save_report(&self, record: &ReportRecord) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                self.log_io_failure("create storage directory", &err, Some(record));
                StoreError::from_io(err, parent)
            })?;
        }

        let clean = record.sanitized();
        let mut line = serde_json::to_string(&clean)?;
        line.push('\n');

        self.append_line(&line).map_err(|err| {
            self.log_io_failure("append report", &err, Some(record));
            StoreError::from_io(err, &self.path)
        })?;

        debug!(
            path = %self.path.display(),
            report_id = %record.display_field("report_id"),
            status = %record.display_field("status"),
            accept = %record.display_field("accept"),
            "report appended"
        );
        Ok(())
    }

    /// Remove at most one record matching the query.
    ///
    /// Returns `Ok(false)` when the log file does not exist (without
    /// creating it) or when nothing matches (leaving the file untouched).
    /// Only the first matching line is removed; any later lines that would
    /// also match are kept. Lines that are not valid JSON are preserved
    /// verbatim. On a successful removal the file is rewritten in place,
    /// flushed, and synced.
    pub fn remove_report(&self, query: &RemoveQuery) -> StoreResult<bool> {
        if query.is_unconstrained() {
            debug!("removal query has no criteria, nothing to match");
            return Ok(false);
        }
        if !self.path.exists() {
            warn!(path = %self.path.display(), "report log does not exist, nothing to remove");
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|err| {
            self.log_io_failure("read report log", &err, None);
            StoreError::from_io(err, &self.path)
        })?;

        let mut retained: Vec<&str> = Vec::new();
        let mut removed: Option<ReportRecord> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if removed.is_some() {
                // Only the first match is dropped per call.
                retained.push(line);
                continue;
            }
            match serde_json::from_str::<ReportRecord>(line) {
                Ok(record) if query.matches(&record) => {
                    debug!(
                        report_id = %record.display_field("report_id"),
                        "removing report from log"
                    );
                    removed = Some(record);
                }
                Ok(_) => retained.push(line),
                Err(err) => {
                    // Keep unparseable lines, never lose data.
                    debug!(error = %err, "keeping unparseable log line");
                    retained.push(line);
                }
            }
        }

        let Some(record) = removed else {
            warn!(
                path = %self.path.display(),
                report_id = query.report_id().unwrap_or("<none>"),
                "no report matched removal query"
            );
            return Ok(false);
        };

        self.rewrite(&retained).map_err(|err| {
            self.log_io_failure("rewrite report log", &err, Some(&record));
            StoreError::from_io(err, &self.path)
        })?;

        debug!(
            path = %self.path.display(),
            report_id = %record.display_field("report_id"),
            "report removed"
        );
        Ok(true)
    }

    /// Read every non-empty line of the log, in order.
    ///
    /// Valid JSON objects come back as records; anything else comes back
    /// raw. A missing file reads as an empty log.
    pub fn entries(&self) -> StoreResult<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|err| {
            self.log_io_failure("read report log", &err, None);
            StoreError::from_io(err, &self.path)
        })?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match serde_json::from_str::<ReportRecord>(line) {
                Ok(record) => LogEntry::Record(record),
                Err(_) => LogEntry::Malformed(line.to_string()),
            })
            .collect())
    }

    /// Summarize the log: record count, malformed-line count, file size.
    pub fn stats(&self) -> StoreResult<LogStats> {
        let mut stats = LogStats::default();
        if !self.path.exists() {
            return Ok(stats);
        }
        for entry in self.entries()? {
            match entry {
                LogEntry::Record(_) => stats.records += 1,
                LogEntry::Malformed(_) => stats.malformed += 1,
            }
        }
        stats.size_bytes = fs::metadata(&self.path)
            .map_err(|err| StoreError::from_io(err, &self.path))?
            .len();
        Ok(stats)
    }

    /// Single append of an already newline-terminated payload.
    fn append_line(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        file.sync_all()
    }

    /// Replace the file contents with the given lines, newline-terminated.
    fn rewrite(&self, lines: &[&str]) -> io::Result<()> {
        let mut file = File::create(&self.path)?;
        for line in lines {
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.flush()?;
        file.sync_all()
    }

    /// Emit the diagnostic context an operator needs before the error
    /// propagates: which file, whether its directory is even writable, and
    /// which record was involved.
    fn log_io_failure(&self, action: &str, err: &io::Error, record: Option<&ReportRecord>) {
        let dir_writable = self
            .path
            .parent()
            .map(|dir| {
                fs::metadata(dir)
                    .map(|meta| !meta.permissions().readonly())
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        match record {
            Some(record) => error!(
                path = %self.path.display(),
                error = %err,
                dir_writable,
                report_id = %record.display_field("report_id"),
                "failed to {action}"
            ),
            None => error!(
                path = %self.path.display(),
                error = %err,
                dir_writable,
                "failed to {action}"
            ),
        }
    }
}

/// One line of the log, as read back.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    /// A line that parsed as a JSON object.
    Record(ReportRecord),
    /// A line that did not parse; kept verbatim.
    Malformed(String),
}

/// Aggregate numbers over the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    /// Lines that parsed as records.
    pub records: usize,
    /// Lines that did not parse.
    pub malformed: usize,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Criteria for selecting a record to remove.
///
/// A query can carry a report id, a (description, user id) pair, or both.
/// Per line, the id comparison runs first; the pair is only consulted when
/// the id did not match that line. Description matching is case-insensitive
/// and collapses runs of whitespace; user ids are compared trimmed.
#[derive(Debug, Clone, Default)]
pub struct RemoveQuery {
    report_id: Option<String>,
    description: Option<String>,
    user_id: Option<String>,
}

impl RemoveQuery {
    /// An empty query; matches nothing until criteria are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match records whose `report_id` equals the given id.
    pub fn with_report_id(mut self, report_id: impl Into<String>) -> Self {
        self.report_id = Some(report_id.into());
        self
    }

    /// Match records by their description and submitting user.
    ///
    /// Both fields must be non-blank for this arm to apply.
    pub fn with_submission(
        mut self,
        description: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        self.description = Some(description.into());
        self.user_id = Some(user_id.into());
        self
    }

    /// The id criterion, if set.
    pub fn report_id(&self) -> Option<&str> {
        self.report_id.as_deref()
    }

    /// Whether the query carries no usable criteria.
    pub fn is_unconstrained(&self) -> bool {
        self.report_id.is_none() && (self.description.is_none() || self.user_id.is_none())
    }

    /// Whether a record satisfies this query.
    pub fn matches(&self, record: &ReportRecord) -> bool {
        if let Some(id) = &self.report_id {
            if record.report_id() == Some(id.as_str()) {
                return true;
            }
        }

        let (Some(description), Some(user_id)) = (&self.description, &self.user_id) else {
            return false;
        };
        let want_description = normalize_description(description);
        let want_user = user_id.trim();
        if want_description.is_empty() || want_user.is_empty() {
            return false;
        }

        let have_description = normalize_description(record.description().unwrap_or(""));
        let have_user = record.user_id().unwrap_or("").trim();
        have_description == want_description && have_user == want_user
    }
}

/// Lowercase and collapse all whitespace runs to single spaces.
fn normalize_description(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IMAGE_BYTES_KEY;
    use tempfile::TempDir;

    fn record(id: &str, description: &str, user: &str) -> ReportRecord {
        let mut record = ReportRecord::new();
        record
            .insert("report_id", id)
            .insert("description", description)
            .insert("user_id", user)
            .insert("status", "pending");
        record
    }

    fn temp_log() -> (TempDir, ReportLog) {
        let dir = TempDir::new().unwrap();
        let log = ReportLog::new(dir.path().join("data").join("dataset.jsonl"));
        (dir, log)
    }

    #[test]
    fn test_append_preserves_order() {
        let (_dir, log) = temp_log();
        for i in 0..5 {
            log.save_report(&record(&format!("r-{i}"), "desc", "u1"))
                .unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines.iter().enumerate() {
            let parsed: ReportRecord = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.report_id(), Some(format!("r-{i}").as_str()));
        }
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("dataset.jsonl");
        let log = ReportLog::new(&path);
        log.save_report(&record("r-1", "d", "u")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_image_bytes_never_persisted() {
        let (_dir, log) = temp_log();
        let mut with_image = record("r-img", "has image", "u2");
        with_image.insert(IMAGE_BYTES_KEY, vec![1u8, 2, 3, 4]);
        log.save_report(&with_image).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(!content.contains(IMAGE_BYTES_KEY));
        let parsed: ReportRecord = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.report_id(), Some("r-img"));
    }

    #[test]
    fn test_remove_by_id_keeps_other_lines_verbatim() {
        let (_dir, log) = temp_log();
        for id in ["r-1", "r-2", "r-3"] {
            log.save_report(&record(id, "desc", "u1")).unwrap();
        }
        let before: Vec<String> = std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();

        let removed = log
            .remove_report(&RemoveQuery::new().with_report_id("r-2"))
            .unwrap();
        assert!(removed);

        let after: Vec<String> = std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(after, vec![before[0].clone(), before[2].clone()]);
    }

    #[test]
    fn test_remove_missing_id_leaves_file_untouched() {
        let (_dir, log) = temp_log();
        log.save_report(&record("r-1", "desc", "u1")).unwrap();
        let before = std::fs::read(log.path()).unwrap();

        let removed = log
            .remove_report(&RemoveQuery::new().with_report_id("missing"))
            .unwrap();
        assert!(!removed);
        assert_eq!(std::fs::read(log.path()).unwrap(), before);
    }

    #[test]
    fn test_remove_by_submission_is_normalized() {
        let (_dir, log) = temp_log();
        log.save_report(&record("r-1", "foo bar", "u1")).unwrap();

        let removed = log
            .remove_report(&RemoveQuery::new().with_submission("  Foo   Bar ", " u1 "))
            .unwrap();
        assert!(removed);
        assert_eq!(log.stats().unwrap().records, 0);
    }

    #[test]
    fn test_malformed_line_survives_removal() {
        let (_dir, log) = temp_log();
        log.save_report(&record("r-1", "a", "u1")).unwrap();
        let mut content = std::fs::read_to_string(log.path()).unwrap();
        content.push_str("this is { not json\n");
        std::fs::write(log.path(), &content).unwrap();
        log.save_report(&record("r-2", "b", "u2")).unwrap();

        let removed = log
            .remove_report(&RemoveQuery::new().with_report_id("r-1"))
            .unwrap();
        assert!(removed);

        let after = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = after.lines().collect();
        assert_eq!(lines[0], "this is { not json");
        let parsed: ReportRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.report_id(), Some("r-2"));
    }

    #[test]
    fn test_remove_on_missing_file_does_not_create_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("dataset.jsonl");
        let log = ReportLog::new(&path);

        let removed = log
            .remove_report(&RemoveQuery::new().with_report_id("r-1"))
            .unwrap();
        assert!(!removed);
        assert!(!path.exists());
    }

    #[test]
    fn test_only_first_match_is_removed() {
        let (_dir, log) = temp_log();
        log.save_report(&record("r-dup", "first copy", "u1")).unwrap();
        log.save_report(&record("r-dup", "second copy", "u1")).unwrap();

        let query = RemoveQuery::new().with_report_id("r-dup");
        assert!(log.remove_report(&query).unwrap());

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            LogEntry::Record(kept) => assert_eq!(kept.description(), Some("second copy")),
            other => panic!("unexpected entry: {other:?}"),
        }

        assert!(log.remove_report(&query).unwrap());
        assert!(log.entries().unwrap().is_empty());
    }

    #[test]
    fn test_unconstrained_query_removes_nothing() {
        let (_dir, log) = temp_log();
        log.save_report(&record("r-1", "desc", "u1")).unwrap();

        assert!(!log.remove_report(&RemoveQuery::new()).unwrap());
        // A lone description without a user id is not a usable criterion.
        let mut partial = RemoveQuery::new();
        partial.description = Some("desc".into());
        assert!(!log.remove_report(&partial).unwrap());
        assert_eq!(log.stats().unwrap().records, 1);
    }

    #[test]
    fn test_entries_and_stats_report_malformed_lines() {
        let (_dir, log) = temp_log();
        log.save_report(&record("r-1", "a", "u1")).unwrap();
        let mut content = std::fs::read_to_string(log.path()).unwrap();
        content.push_str("garbage line\n\n");
        std::fs::write(log.path(), &content).unwrap();
        log.save_report(&record("r-2", "b", "u2")).unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], LogEntry::Record(_)));
        assert_eq!(entries[1], LogEntry::Malformed("garbage line".into()));
        assert!(matches!(entries[2], LogEntry::Record(_)));

        let stats = log.stats().unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.malformed, 1);
        assert!(stats.size_bytes > 0);
    }

    #[test]
    fn test_entries_on_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = ReportLog::new(dir.path().join("dataset.jsonl"));
        assert!(log.entries().unwrap().is_empty());
        assert_eq!(log.stats().unwrap(), LogStats::default());
    }

    #[test]
    fn test_query_id_takes_precedence_over_submission() {
        let query = RemoveQuery::new()
            .with_report_id("r-1")
            .with_submission("other text", "u9");

        // Id matches even though the submission pair does not.
        assert!(query.matches(&record("r-1", "desc", "u1")));
        // Fallback still applies to lines where the id does not match.
        assert!(query.matches(&record("r-2", "Other  TEXT", "u9")));
        assert!(!query.matches(&record("r-3", "desc", "u1")));
    }

    #[test]
    fn test_query_blank_submission_fields_do_not_match() {
        let query = RemoveQuery::new().with_submission("   ", "u1");
        assert!(!query.matches(&record("r-1", "", "u1")));

        let query = RemoveQuery::new().with_submission("desc", "  ");
        assert!(!query.matches(&record("r-1", "desc", "")));
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  Foo   Bar "), "foo bar");
        assert_eq!(normalize_description("foo\tbar\nbaz"), "foo bar baz");
        assert_eq!(normalize_description("   "), "");
    }
}
