use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};

use crate::errors::TimestampError;

/// Layout of the candidate built from a line's leading fields plus the year
const TIMESTAMP_FORMAT: &str = "%Y %b %d %H:%M:%S";

/// Number of whitespace-delimited fields that make up the timestamp
const TIMESTAMP_FIELDS: usize = 3;

/// Parses a syslog-style `Mon Day HH:MM:SS` prefix in the local time zone.
///
/// The text carries no year, so `year` is prefixed before parsing. Entries
/// written in late December and scanned in early January therefore land in
/// the wrong year and get a large negative age.
///
/// Parsing is somewhat looser than the classic syslog layout: the month may
/// also be spelled out in full (`January 5 ...`), and a leap second
/// (`23:59:60`) is accepted.
pub fn parse_leading_timestamp(line: &str, year: i32) -> Result<DateTime<Local>, TimestampError> {
    let fields: Vec<&str> = line.split_whitespace().take(TIMESTAMP_FIELDS).collect();
    if fields.len() < TIMESTAMP_FIELDS {
        return Err(TimestampError::TooFewFields {
            found: fields.len(),
        });
    }

    let candidate = format!("{} {} {} {}", year, fields[0], fields[1], fields[2]);
    let naive = match NaiveDateTime::parse_from_str(&candidate, TIMESTAMP_FORMAT) {
        Ok(naive) => naive,
        Err(source) => return Err(TimestampError::Malformed { candidate, source }),
    };

    earliest_instant(Local.from_local_datetime(&naive), candidate)
}

/// Picks the first instant of an ambiguous wall-clock time (DST fall-back);
/// a time skipped by a DST gap is an error.
fn earliest_instant<T>(mapped: LocalResult<T>, candidate: String) -> Result<T, TimestampError> {
    mapped
        .earliest()
        .ok_or(TimestampError::NonexistentLocalTime { candidate })
}

/// Whole seconds elapsed from `then` to `now`, truncated toward zero
pub fn age_seconds(now: DateTime<Local>, then: DateTime<Local>) -> i64 {
    now.signed_duration_since(then).num_seconds()
}
