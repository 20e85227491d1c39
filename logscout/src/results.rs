/// Result types shared between the classifier tasks and the caller.
///
/// Classifier tasks only ever see a `&MatchCollection` and can do nothing but
/// append to it. Once every task has finished, the engine takes the
/// collection by value and turns it into a [`ScanOutcome`].
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::metrics::ScanStats;
use crate::status::Status;

/// Lines that passed both the substring and the age test.
///
/// Insertion order follows task completion and carries no meaning.
#[derive(Debug, Default)]
pub struct MatchCollection {
    lines: Mutex<Vec<String>>,
}

impl MatchCollection {
    /// Creates a new empty collection
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends one line; the lock is held for the push only
    pub fn push(&self, line: String) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the collection, returning the recorded lines
    pub fn into_lines(self) -> Vec<String> {
        self.lines
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Final result of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Status derived from the count and thresholds
    pub status: Status,
    /// Number of lines that were counted
    pub count: usize,
    /// The counted lines, in no particular order
    pub matches: Vec<String>,
    /// The file that was scanned, after date-pattern resolution
    pub path: PathBuf,
    /// Counters for this scan alone
    pub stats: ScanStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_collection_new() {
        let collection = MatchCollection::new();
        assert!(collection.is_empty());
        assert!(collection.into_lines().is_empty());
    }

    #[test]
    fn test_collection_push() {
        let collection = MatchCollection::new();
        collection.push("Jan 5 10:00:00 server ERROR disk full".to_string());
        collection.push("Jan 5 10:00:01 server ERROR disk full".to_string());

        assert_eq!(collection.len(), 2);
        let lines = collection.into_lines();
        assert!(lines.iter().all(|l| l.contains("ERROR")));
    }

    #[test]
    fn test_concurrent_pushes_are_not_lost() {
        let collection = Arc::new(MatchCollection::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let collection = Arc::clone(&collection);
                thread::spawn(move || {
                    for i in 0..250 {
                        collection.push(format!("thread {} line {}", t, i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(collection.len(), 2000);
    }
}
