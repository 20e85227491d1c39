/// Concurrent scan-and-classify pipeline.
///
/// A scan is one pass over one file:
///
/// 1. **Reading** ([`reader`]): the calling thread reads the file in
///    `\n`-terminated chunks. Before each chunk is handed off it takes a slot
///    from a fixed [`ConcurrencyBudget`], so a huge file never queues more than
///    a handful of chunks.
/// 2. **Classifying** ([`classifier`]): each chunk runs as a task on a small
///    rayon pool. Lines containing the error substring have their leading
///    `Mon Day HH:MM:SS` parsed ([`timestamp`]) and are kept when young enough.
/// 3. **Resolving** ([`engine`]): once the scope has joined every task, the
///    number of kept lines is compared against the thresholds.
///
/// ```rust,ignore
/// let outcome = Scanner::new().scan(&ScanConfig::new("/var/log/syslog", "error", 5, 20, 3600))?;
/// println!("{}: {}", outcome.status, outcome.count);
/// ```
pub mod classifier;
pub mod engine;
pub mod reader;
pub mod timestamp;

pub use classifier::{LineClassifier, LineVerdict};
pub use engine::{scan, Scanner, DEFAULT_CONCURRENCY};
pub use reader::{ChunkReader, ConcurrencyBudget};
