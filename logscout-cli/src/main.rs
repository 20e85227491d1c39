use clap::Parser;
use colored::{ColoredString, Colorize};
use logscout::{
    ConfigOverrides, ScanConfig, ScanError, ScanOutcome, Scanner, Status, UNKNOWN_EXIT_CODE,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ScanError>;

/// Search a log file for recent error lines and report OK, WARNING or CRITICAL.
///
/// For dynamically named log files, pass the directory with -p and the file
/// name with -l. Any strftime items in the name (%Y, %m, %d, ...) are replaced
/// with today's local date, so -l 'SpamCop-%Y-%m-%d.log' picks up
/// SpamCop-2024-01-02.log on the 2nd of January 2024.
///
/// Timestamps in the log are read as local time; make sure the log is written
/// in the host's time zone.
#[derive(Parser)]
#[command(author, version, about, long_about)]
struct Cli {
    /// Log file to analyze, or its directory when --log-pattern is given
    #[arg(short = 'p', long)]
    path: Option<PathBuf>,

    /// Error string to search for (case-insensitive)
    #[arg(short = 'e', long)]
    error: Option<String>,

    /// Number of errors that triggers a critical alert
    #[arg(short = 'c', long)]
    critical: Option<u64>,

    /// Number of errors that triggers a warning alert
    #[arg(short = 'w', long)]
    warning: Option<u64>,

    /// Only count errors from the last N seconds
    #[arg(short = 't', long = "time-point")]
    time_point: Option<u64>,

    /// Log file name with a date placeholder, e.g. 'app-%Y-%m-%d.log'
    #[arg(short = 'l', long = "log-pattern")]
    log_pattern: Option<String>,

    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Print every counted line after the status line
    #[arg(short = 'v', long)]
    show_matches: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(UNKNOWN_EXIT_CODE);
        }
    };

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            println!("{}: {}", "UNKNOWN".magenta().bold(), e);
            ExitCode::from(UNKNOWN_EXIT_CODE)
        }
    }
}

fn run(cli: Cli) -> Result<Status> {
    let show_matches = cli.show_matches;
    let config = ScanConfig::load_from(cli.config.as_deref())?.merge_with_cli(ConfigOverrides {
        log_path: cli.path,
        log_pattern: cli.log_pattern,
        error_pattern: cli.error,
        warning: cli.warning,
        critical: cli.critical,
        max_age_secs: cli.time_point,
        log_level: cli.log_level,
    });

    init_tracing(&config.log_level);

    let outcome = Scanner::new().scan(&config)?;
    print_outcome(&outcome, &config, show_matches);
    Ok(outcome.status)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Ok => status.as_str().green().bold(),
        Status::Warning => status.as_str().yellow().bold(),
        Status::Critical => status.as_str().red().bold(),
    }
}

fn print_outcome(outcome: &ScanOutcome, config: &ScanConfig, show_matches: bool) {
    match outcome.status {
        Status::Critical | Status::Warning => println!(
            "{}: {} errors \"{}\" were found in the log file {} for the last {} sec!",
            status_label(outcome.status),
            outcome.count,
            config.error_pattern,
            outcome.path.display(),
            config.max_age_secs
        ),
        Status::Ok => println!(
            "{}: {} errors \"{}\" found in the log file {} for the last {} sec",
            status_label(outcome.status),
            outcome.count,
            config.error_pattern,
            outcome.path.display(),
            config.max_age_secs
        ),
    }

    if show_matches {
        for line in &outcome.matches {
            println!("  {}", line.dimmed());
        }
    }
}
