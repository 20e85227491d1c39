pub mod clock;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod scan;
pub mod status;

pub use config::{ConfigOverrides, ScanConfig};
pub use errors::{ScanError, ScanResult, TimestampError};
pub use metrics::ScanStats;
pub use results::{MatchCollection, ScanOutcome};
pub use scan::{scan, Scanner};
pub use status::{Status, Thresholds, UNKNOWN_EXIT_CODE};
