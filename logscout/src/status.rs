use std::fmt;

use crate::errors::{ScanError, ScanResult};

/// Exit code reported when no status could be determined
pub const UNKNOWN_EXIT_CODE: u8 = 3;

/// Tri-level outcome of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

impl Status {
    /// Monitoring-plugin exit code for this status
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated pair of match-count thresholds.
///
/// Both bounds are inclusive and critical is checked first, so a count equal
/// to both resolves to [`Status::Critical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    warning: u64,
    critical: u64,
}

impl Thresholds {
    pub fn new(warning: u64, critical: u64) -> ScanResult<Self> {
        if warning > critical {
            return Err(ScanError::invalid_thresholds(warning, critical));
        }
        Ok(Self { warning, critical })
    }

    pub fn warning(&self) -> u64 {
        self.warning
    }

    pub fn critical(&self) -> u64 {
        self.critical
    }

    /// Maps a match count onto a status
    pub fn resolve(&self, count: usize) -> Status {
        let count = count as u64;
        if count >= self.critical {
            Status::Critical
        } else if count >= self.warning {
            Status::Warning
        } else {
            Status::Ok
        }
    }
}
