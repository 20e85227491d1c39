use chrono::{DateTime, Datelike, Local};
use tracing::warn;

use super::timestamp::{age_seconds, parse_leading_timestamp};
use crate::errors::TimestampError;
use crate::metrics::ScanMetrics;
use crate::results::MatchCollection;

/// What happened to a single line
#[derive(Debug)]
pub enum LineVerdict {
    /// The error substring does not occur in the line
    NoMatch,
    /// Matched, and the timestamp is inside the age window
    Counted { age_secs: i64 },
    /// Matched, but the timestamp is older than the window
    Stale { age_secs: i64 },
    /// Matched, but no usable timestamp could be read
    Unparseable(TimestampError),
}

/// Decides which lines of a chunk count towards the status.
///
/// One classifier is built per scan and shared by reference across all
/// classifier tasks; it holds no mutable state of its own.
#[derive(Debug)]
pub struct LineClassifier<'a> {
    needle: String,
    max_age_secs: i64,
    now: DateTime<Local>,
    year: i32,
    sink: &'a MatchCollection,
    metrics: &'a ScanMetrics,
}

impl<'a> LineClassifier<'a> {
    pub fn new(
        error_pattern: &str,
        max_age_secs: u64,
        now: DateTime<Local>,
        sink: &'a MatchCollection,
        metrics: &'a ScanMetrics,
    ) -> Self {
        Self {
            needle: error_pattern.to_lowercase(),
            max_age_secs: i64::try_from(max_age_secs).unwrap_or(i64::MAX),
            now,
            year: now.year(),
            sink,
            metrics,
        }
    }

    /// Classifies a single line without recording anything
    pub fn classify_line(&self, line: &str) -> LineVerdict {
        if !line.to_lowercase().contains(&self.needle) {
            return LineVerdict::NoMatch;
        }

        match parse_leading_timestamp(line, self.year) {
            Ok(timestamp) => {
                let age_secs = age_seconds(self.now, timestamp);
                if age_secs <= self.max_age_secs {
                    LineVerdict::Counted { age_secs }
                } else {
                    LineVerdict::Stale { age_secs }
                }
            }
            Err(e) => LineVerdict::Unparseable(e),
        }
    }

    /// Splits a chunk into lines and records every counted one.
    ///
    /// A chunk normally holds one line, but any number of embedded
    /// terminators is handled.
    pub fn classify_chunk(&self, chunk: &[u8]) {
        for raw in chunk.split(|&b| b == b'\n') {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            if raw.is_empty() {
                continue;
            }
            let line = String::from_utf8_lossy(raw);
            self.metrics.record_line();

            match self.classify_line(&line) {
                LineVerdict::NoMatch => {}
                LineVerdict::Counted { .. } => {
                    self.metrics.record_substring_match();
                    self.metrics.record_counted();
                    self.sink.push(line.into_owned());
                }
                LineVerdict::Stale { .. } => {
                    self.metrics.record_substring_match();
                    self.metrics.record_stale_match();
                }
                LineVerdict::Unparseable(e) => {
                    self.metrics.record_substring_match();
                    self.metrics.record_unparseable();
                    warn!("Skipping line with unusable timestamp: {}: {}", e, line);
                }
            }
        }
    }
}
