use chrono::{DateTime, Local};
use rayon::ThreadPoolBuilder;
use std::fs::File;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::classifier::LineClassifier;
use super::reader::{dispatch_chunks, ConcurrencyBudget};
use crate::clock::{Clock, SystemClock};
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::{MatchCollection, ScanOutcome};
use crate::status::Thresholds;

/// Classifier tasks allowed to run at once
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Runs scans of one log file at a time.
///
/// The scanner keeps nothing between scans; every call builds its own worker
/// pool, budget, metrics and result collection.
#[derive(Clone)]
pub struct Scanner {
    concurrency: NonZeroUsize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            concurrency: NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            clock: Arc::new(SystemClock),
        }
    }

    /// Overrides the number of classifier tasks that may run at once
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Overrides where "now" comes from
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Validates `config`, scans the configured file and resolves a status.
    ///
    /// The clock is read once; the same instant picks the dated log file and
    /// ages every line. Nothing is read unless the configuration is valid.
    pub fn scan(&self, config: &ScanConfig) -> ScanResult<ScanOutcome> {
        let thresholds = config.validate()?;
        let now = self.clock.now();
        let path = config.resolve_log_path(now.date_naive())?;

        info!(
            "Scanning {} for \"{}\" within the last {}",
            path.display(),
            config.error_pattern,
            humantime::format_duration(Duration::from_secs(config.max_age_secs))
        );

        let file = File::open(&path).map_err(|e| ScanError::open_failed(&path, e))?;
        self.scan_source_at(file, &path, config, thresholds, now)
    }

    /// Scans an already opened source; `path` is used for reporting only
    pub fn scan_source<R: Read>(
        &self,
        source: R,
        path: &Path,
        config: &ScanConfig,
        thresholds: Thresholds,
    ) -> ScanResult<ScanOutcome> {
        self.scan_source_at(source, path, config, thresholds, self.clock.now())
    }

    /// Like [`Scanner::scan_source`], judging line ages against `now`
    pub fn scan_source_at<R: Read>(
        &self,
        source: R,
        path: &Path,
        config: &ScanConfig,
        thresholds: Thresholds,
        now: DateTime<Local>,
    ) -> ScanResult<ScanOutcome> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.concurrency.get())
            .thread_name(|i| format!("logscout-classifier-{}", i))
            .build()?;
        let budget = ConcurrencyBudget::new(self.concurrency.get());
        let matches = MatchCollection::new();
        let metrics = ScanMetrics::new();
        let classifier = LineClassifier::new(
            &config.error_pattern,
            config.max_age_secs,
            now,
            &matches,
            &metrics,
        );

        let dispatched = dispatch_chunks(source, &pool, &budget, &metrics, |chunk| {
            classifier.classify_chunk(chunk)
        })
        .map_err(|e| {
            error!("Reading {} failed: {}", path.display(), e);
            ScanError::read_failed(path, e)
        })?;
        debug!(
            "Dispatched {} chunks with at most {} in flight",
            dispatched,
            budget.capacity()
        );

        let matches = matches.into_lines();
        let count = matches.len();
        let status = thresholds.resolve(count);

        metrics.log_stats();
        info!(
            "Scan complete. {} matching lines in {}, status {}",
            count,
            path.display(),
            status
        );

        Ok(ScanOutcome {
            status,
            count,
            matches,
            path: path.to_path_buf(),
            stats: metrics.get_stats(),
        })
    }
}

/// Scans with the default concurrency and the system clock
pub fn scan(config: &ScanConfig) -> ScanResult<ScanOutcome> {
    Scanner::new().scan(config)
}
