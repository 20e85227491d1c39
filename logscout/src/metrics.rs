use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters collected while a scan runs
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    // Reader metrics
    chunks_dispatched: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    peak_in_flight: Arc<AtomicU64>,

    // Classifier metrics
    lines_examined: Arc<AtomicU64>,
    substring_matches: Arc<AtomicU64>,
    stale_matches: Arc<AtomicU64>,
    unparseable_timestamps: Arc<AtomicU64>,
    counted_matches: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            chunks_dispatched: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            peak_in_flight: Arc::new(AtomicU64::new(0)),
            lines_examined: Arc::new(AtomicU64::new(0)),
            substring_matches: Arc::new(AtomicU64::new(0)),
            stale_matches: Arc::new(AtomicU64::new(0)),
            unparseable_timestamps: Arc::new(AtomicU64::new(0)),
            counted_matches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a chunk handed to a classifier task
    pub fn record_chunk(&self, bytes: u64) {
        self.chunks_dispatched.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records the number of tasks in flight after a slot was taken
    pub fn record_in_flight(&self, in_flight: u64) {
        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while in_flight > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                in_flight,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => peak = current,
            }
        }
    }

    pub fn record_line(&self) {
        self.lines_examined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_substring_match(&self) {
        self.substring_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_match(&self) {
        self.stale_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unparseable(&self) {
        self.unparseable_timestamps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_counted(&self) {
        self.counted_matches.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets a snapshot of the counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            chunks_dispatched: self.chunks_dispatched.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
            lines_examined: self.lines_examined.load(Ordering::Relaxed),
            substring_matches: self.substring_matches.load(Ordering::Relaxed),
            stale_matches: self.stale_matches.load(Ordering::Relaxed),
            unparseable_timestamps: self.unparseable_timestamps.load(Ordering::Relaxed),
            counted_matches: self.counted_matches.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Chunks dispatched: {}\n\
             Bytes read: {}\n\
             Peak tasks in flight: {}\n\
             Lines examined: {}\n\
             Matches (substring/stale/unparseable/counted): {}/{}/{}/{}",
            stats.chunks_dispatched,
            stats.bytes_read,
            stats.peak_in_flight,
            stats.lines_examined,
            stats.substring_matches,
            stats.stale_matches,
            stats.unparseable_timestamps,
            stats.counted_matches
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub chunks_dispatched: u64,
    pub bytes_read: u64,
    pub peak_in_flight: u64,
    pub lines_examined: u64,
    pub substring_matches: u64,
    pub stale_matches: u64,
    pub unparseable_timestamps: u64,
    pub counted_matches: u64,
}
