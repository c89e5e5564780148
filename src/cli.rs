//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Campaign Advisor - data-driven targeted campaign strategies
///
/// Gathers market trends, customer behavior and campaign performance,
/// derives a targeted campaign strategy and submits it for execution.
///
/// Examples:
///   campaign-advisor --customer-id cust-42 --campaign-id spring-sale
///   campaign-advisor --campaign-id spring-sale --monitor --poll-interval-ms 5000
///   campaign-advisor --config ./advisor.toml --format json --output cycle.json
///   campaign-advisor --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Bearer token for the market trend API
    #[arg(long, env = "ADVISOR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Customer whose behavior is analyzed
    #[arg(long, value_name = "ID")]
    pub customer_id: Option<String>,

    /// Campaign to analyze, execute and monitor
    #[arg(long, value_name = "ID")]
    pub campaign_id: Option<String>,

    /// Region of the object storage service
    #[arg(long, value_name = "REGION")]
    pub aws_region: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .campaign-advisor.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Monitor campaign performance instead of running an advisory cycle
    #[arg(long)]
    pub monitor: bool,

    /// Delay between monitor polls in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Maximum number of monitor polls
    #[arg(long, value_name = "COUNT")]
    pub max_polls: Option<usize>,

    /// Stop monitoring after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .campaign-advisor.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(interval) = self.poll_interval_ms {
            if interval == 0 {
                return Err("Poll interval must be at least 1 millisecond".to_string());
            }
        }

        if self.max_polls == Some(0) {
            return Err("Max polls must be at least 1".to_string());
        }

        if !self.monitor
            && (self.poll_interval_ms.is_some()
                || self.max_polls.is_some()
                || self.deadline_secs.is_some())
        {
            return Err("Polling options require --monitor".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            api_key: Some("key".to_string()),
            customer_id: Some("cust-1".to_string()),
            campaign_id: Some("camp-1".to_string()),
            aws_region: None,
            config: None,
            monitor: false,
            poll_interval_ms: None,
            max_polls: None,
            deadline_secs: None,
            timeout: None,
            format: OutputFormat::Markdown,
            output: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "campaign-advisor",
            "--customer-id",
            "c1",
            "--campaign-id",
            "spring",
            "--monitor",
            "--max-polls",
            "5",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.customer_id.as_deref(), Some("c1"));
        assert_eq!(args.campaign_id.as_deref(), Some("spring"));
        assert!(args.monitor);
        assert_eq!(args.max_polls, Some(5));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_polling_requires_monitor() {
        let mut args = make_args();
        args.max_polls = Some(3);
        assert!(args.validate().is_err());

        args.monitor = true;
        assert!(args.validate().is_ok());

        args.max_polls = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_config_file() {
        let mut args = make_args();
        args.config = Some(PathBuf::from("/definitely/not/here.toml"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
