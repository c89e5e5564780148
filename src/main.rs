//! Campaign Advisor - targeted campaign strategies from live market data
//!
//! A CLI tool that gathers market trends, customer behavior and campaign
//! performance, derives a targeted strategy and submits it for execution,
//! or monitors a running campaign.
//!
//! Exit codes:
//!   0 - Success (strategy executed, or monitoring finished)
//!   1 - Runtime error (configuration, storage, malformed data, etc.)
//!   2 - Cycle finished without executing a strategy

mod advisor;
mod analysis;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod monitor;
mod report;
mod storage;
mod strategy;

use advisor::Advisor;
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::CycleOutcome;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Campaign Advisor v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = if args.monitor {
        run_monitor(&args).await
    } else {
        run_advisor(&args).await
    };

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .campaign-advisor.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Fill in customer_id, campaign_id and api_key before running.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one advisory cycle. Returns exit code (0 or 2).
async fn run_advisor(args: &Args) -> Result<i32> {
    let config = load_config(args)?;
    let advisor = Advisor::new(config);

    let spinner = spinner(args, "Gathering market data and building strategy...");
    let result = advisor.run().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };
    emit(args, &output)?;

    if report.outcome == CycleOutcome::Executed {
        Ok(0)
    } else {
        warn!("No strategy was executed: {}", report.outcome);
        Ok(2)
    }
}

/// Monitor the configured campaign until it stops, or Ctrl-C.
async fn run_monitor(args: &Args) -> Result<i32> {
    let config = load_config(args)?;
    let advisor = Advisor::new(config);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping monitor");
            on_interrupt.cancel();
        }
    });

    let report = advisor.monitor(cancel).await;

    let output = match args.format {
        OutputFormat::Json => report::generate_monitor_json(&report)?,
        OutputFormat::Markdown => report::generate_monitor_markdown(&report),
    };
    emit(args, &output)?;

    Ok(0)
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default()? {
            Some(config) => {
                info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
                config
            }
            None => {
                debug!("No config file found, using defaults");
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    if args.monitor {
        config.validate_monitor()?;
    } else {
        config.validate()?;
    }

    if config.advisor.api_key.is_empty() && !args.monitor {
        warn!("No API key configured; the market trend request will be unauthenticated");
    }

    Ok(config)
}

/// Spinner shown while a cycle runs, unless quiet.
fn spinner(args: &Args, message: &'static str) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

/// Write the report to --output or stdout.
fn emit(args: &Args, output: &str) -> Result<()> {
    match args.output {
        Some(ref path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                println!("✅ Report saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }
    Ok(())
}
