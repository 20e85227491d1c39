use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};
use crate::status::Thresholds;

/// Configuration for a scan.
///
/// # Configuration Locations
///
/// Values are read from these files in increasing order of precedence, and
/// command-line flags override all of them:
/// 1. Global `$CONFIG_DIR/logscout/config.yaml`
/// 2. Local `.logscout.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// # Configuration Format
///
/// ```yaml
/// # Log file, or the directory holding it when log_pattern is set
/// log_path: "/var/log"
///
/// # Rotating file name; strftime items are filled with today's date
/// log_pattern: "mail-%Y-%m-%d.log"
///
/// # Case-insensitive substring to look for
/// error_pattern: "connection refused"
///
/// # Match counts that raise WARNING and CRITICAL
/// warning: 5
/// critical: 20
///
/// # Only lines at most this many seconds old are counted
/// max_age_secs: 3600
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Path to the log file, or its directory when `log_pattern` is set
    #[serde(default)]
    pub log_path: PathBuf,

    /// Optional file name pattern for date-rotated logs
    #[serde(default)]
    pub log_pattern: Option<String>,

    /// Substring that marks an error line (compared case-insensitively)
    #[serde(default)]
    pub error_pattern: String,

    /// Match count at which the status becomes WARNING
    #[serde(default)]
    pub warning: Option<u64>,

    /// Match count at which the status becomes CRITICAL
    #[serde(default)]
    pub critical: Option<u64>,

    /// Maximum age, in seconds, of a counted line
    #[serde(default)]
    pub max_age_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Values supplied on the command line; `None` leaves the file value alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_path: Option<PathBuf>,
    pub log_pattern: Option<String>,
    pub error_pattern: Option<String>,
    pub warning: Option<u64>,
    pub critical: Option<u64>,
    pub max_age_secs: Option<u64>,
    pub log_level: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::new(),
            log_pattern: None,
            error_pattern: String::new(),
            warning: None,
            critical: None,
            max_age_secs: 0,
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Builds a ready-to-scan configuration for a fixed path
    pub fn new(
        log_path: impl Into<PathBuf>,
        error_pattern: impl Into<String>,
        warning: u64,
        critical: u64,
        max_age_secs: u64,
    ) -> Self {
        Self {
            log_path: log_path.into(),
            error_pattern: error_pattern.into(),
            warning: Some(warning),
            critical: Some(critical),
            max_age_secs,
            ..Default::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("logscout/config.yaml")),
            Some(PathBuf::from(".logscout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(path) = cli.log_path {
            self.log_path = path;
        }
        if cli.log_pattern.is_some() {
            self.log_pattern = cli.log_pattern;
        }
        if let Some(pattern) = cli.error_pattern {
            self.error_pattern = pattern;
        }
        if cli.warning.is_some() {
            self.warning = cli.warning;
        }
        if cli.critical.is_some() {
            self.critical = cli.critical;
        }
        if let Some(secs) = cli.max_age_secs {
            self.max_age_secs = secs;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Checks everything a scan needs before the log file is touched
    pub fn validate(&self) -> ScanResult<Thresholds> {
        let (warning, critical) = match (self.warning, self.critical) {
            (Some(w), Some(c)) => (w, c),
            (None, _) => return Err(ScanError::config_error("warning threshold is required")),
            (_, None) => return Err(ScanError::config_error("critical threshold is required")),
        };
        let thresholds = Thresholds::new(warning, critical)?;

        if self.error_pattern.is_empty() {
            return Err(ScanError::config_error("error pattern must not be empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ScanError::config_error("log path is required"));
        }
        if let Some(pattern) = &self.log_pattern {
            validate_date_pattern(pattern)?;
        }

        Ok(thresholds)
    }

    /// The file to scan on `today`.
    ///
    /// Without a `log_pattern` this is `log_path` itself. With one, the
    /// pattern's strftime items are filled from `today` and the resulting
    /// file name is joined onto `log_path`.
    pub fn resolve_log_path(&self, today: NaiveDate) -> ScanResult<PathBuf> {
        match &self.log_pattern {
            None => Ok(self.log_path.clone()),
            Some(pattern) => {
                let file_name = format_date_pattern(pattern, today)?;
                Ok(self.log_path.join(file_name))
            }
        }
    }
}

fn validate_date_pattern(pattern: &str) -> ScanResult<()> {
    if pattern.is_empty() {
        return Err(ScanError::config_error("log pattern must not be empty"));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ScanError::config_error(format!(
            "invalid date pattern '{}'",
            pattern
        )));
    }
    // Time and zone items parse fine but a bare date cannot fill them
    format_date_pattern(pattern, NaiveDate::MIN).map(|_| ())
}

fn format_date_pattern(pattern: &str, date: NaiveDate) -> ScanResult<String> {
    let mut file_name = String::new();
    if write!(file_name, "{}", date.format(pattern)).is_err() {
        return Err(ScanError::config_error(format!(
            "date pattern '{}' uses items a date cannot supply",
            pattern
        )));
    }
    Ok(file_name)
}
