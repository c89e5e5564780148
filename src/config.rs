//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.campaign-advisor.toml` files.

use crate::error::AdvisorError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".campaign-advisor.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identity of the customer and campaign being advised.
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Remote API locations.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Campaign monitoring settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Caller-supplied identifiers and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Bearer token for the market trend API.
    #[serde(default)]
    pub api_key: String,

    /// Customer whose behavior is analyzed.
    #[serde(default)]
    pub customer_id: String,

    /// Campaign that is analyzed and executed.
    #[serde(default)]
    pub campaign_id: String,

    /// Region of the object storage service.
    #[serde(default = "default_region")]
    pub aws_region: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            customer_id: String::new(),
            campaign_id: String::new(),
            aws_region: default_region(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Base URLs of the remote services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_market_trends_url")]
    pub market_trends_url: String,

    /// Customer id is appended as a path segment.
    #[serde(default = "default_customer_behavior_url")]
    pub customer_behavior_url: String,

    /// `/{campaign_id}/performance` is appended.
    #[serde(default = "default_campaign_analytics_url")]
    pub campaign_analytics_url: String,

    #[serde(default = "default_execution_url")]
    pub execution_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            market_trends_url: default_market_trends_url(),
            customer_behavior_url: default_customer_behavior_url(),
            campaign_analytics_url: default_campaign_analytics_url(),
            execution_url: default_execution_url(),
        }
    }
}

fn default_market_trends_url() -> String {
    "https://market-trend-api.com".to_string()
}

fn default_customer_behavior_url() -> String {
    "https://analytics-tool.com/behavior".to_string()
}

fn default_campaign_analytics_url() -> String {
    "https://campaign-analytics.com".to_string()
}

fn default_execution_url() -> String {
    "https://marketing-automation.com/execute".to_string()
}

impl EndpointsConfig {
    /// Points every endpoint at one base URL, using the default path layout.
    #[allow(dead_code)] // Convenience for local stubs
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            market_trends_url: format!("{}/trends", base),
            customer_behavior_url: format!("{}/behavior", base),
            campaign_analytics_url: base.to_string(),
            execution_url: format!("{}/execute", base),
        }
    }

    /// URL of the customer behavior resource.
    pub fn customer_behavior(&self, customer_id: &str) -> String {
        format!(
            "{}/{}",
            self.customer_behavior_url.trim_end_matches('/'),
            customer_id
        )
    }

    /// URL of the campaign performance resource.
    pub fn campaign_performance(&self, campaign_id: &str) -> String {
        format!(
            "{}/{}/performance",
            self.campaign_analytics_url.trim_end_matches('/'),
            campaign_id
        )
    }

    fn all(&self) -> [(&'static str, &str); 4] {
        [
            ("market_trends_url", self.market_trends_url.as_str()),
            ("customer_behavior_url", self.customer_behavior_url.as_str()),
            ("campaign_analytics_url", self.campaign_analytics_url.as_str()),
            ("execution_url", self.execution_url.as_str()),
        ]
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Campaign monitoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay between polls in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum number of polls.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Overall monitoring deadline in seconds.
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            max_iterations: default_max_iterations(),
            deadline_seconds: default_deadline(),
        }
    }
}

fn default_poll_interval() -> u64 {
    60_000
}

fn default_max_iterations() -> usize {
    60
}

fn default_deadline() -> u64 {
    3600
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_seconds)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref api_key) = args.api_key {
            self.advisor.api_key = api_key.clone();
        }
        if let Some(ref customer_id) = args.customer_id {
            self.advisor.customer_id = customer_id.clone();
        }
        if let Some(ref campaign_id) = args.campaign_id {
            self.advisor.campaign_id = campaign_id.clone();
        }
        if let Some(ref region) = args.aws_region {
            self.advisor.aws_region = region.clone();
        }

        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = timeout;
        }

        if let Some(interval) = args.poll_interval_ms {
            self.monitor.poll_interval_ms = interval;
        }
        if let Some(max_polls) = args.max_polls {
            self.monitor.max_iterations = max_polls;
        }
        if let Some(deadline) = args.deadline_secs {
            self.monitor.deadline_seconds = deadline;
        }
    }

    /// Check that the configuration can drive an advisory cycle.
    pub fn validate(&self) -> std::result::Result<(), AdvisorError> {
        require("customer_id", &self.advisor.customer_id)?;
        require("aws_region", &self.advisor.aws_region)?;
        self.validate_monitor()
    }

    /// Check that the configuration can drive campaign monitoring.
    ///
    /// Monitoring only polls campaign performance, so no customer or
    /// storage region is needed.
    pub fn validate_monitor(&self) -> std::result::Result<(), AdvisorError> {
        require("campaign_id", &self.advisor.campaign_id)?;

        for (name, url) in self.endpoints.all() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AdvisorError::Config(format!(
                    "{} must start with 'http://' or 'https://'",
                    name
                )));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(AdvisorError::Config(
                "Timeout must be at least 1 second".to_string(),
            ));
        }
        if self.monitor.poll_interval_ms == 0 {
            return Err(AdvisorError::Config(
                "Poll interval must be at least 1 millisecond".to_string(),
            ));
        }
        if self.monitor.max_iterations == 0 {
            return Err(AdvisorError::Config(
                "Monitor must allow at least one poll".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn require(name: &str, value: &str) -> std::result::Result<(), AdvisorError> {
    if value.trim().is_empty() {
        return Err(AdvisorError::Config(format!("{} must be set", name)));
    }
    Ok(())
}
