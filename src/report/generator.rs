//! Markdown and JSON report generation.
//!
//! This module renders advisory cycle and monitoring results for the
//! command line.

use crate::models::{CampaignMetrics, CycleReport, Insights, MonitorReport, Strategy};
use anyhow::Result;
use serde_json::Value;

/// Generate a Markdown report for an advisory cycle.
pub fn generate_markdown_report(report: &CycleReport) -> String {
    let mut output = String::new();

    output.push_str("# Campaign Advisor Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_data_section(report));
    output.push_str(&generate_insights_section(report.insights.as_ref()));
    output.push_str(&generate_strategy_section(report.strategy.as_ref()));
    output.push_str(&generate_execution_section(report.execution.as_ref()));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &CycleReport) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Customer:** `{}`\n", report.customer_id));
    section.push_str(&format!("- **Campaign:** `{}`\n", report.campaign_id));
    section.push_str(&format!(
        "- **Completed:** {}\n",
        report.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Outcome:** {}\n", report.outcome));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        report.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the gathered data section.
fn generate_data_section(report: &CycleReport) -> String {
    let mut section = String::new();

    section.push_str("## Market Data\n\n");
    section.push_str("| Trends | Segments |\n");
    section.push_str("|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} |\n\n",
        report.trend_count, report.segment_count
    ));

    if let Some(ref metrics) = report.campaign_metrics {
        section.push_str(&format_metrics(metrics));
        section.push('\n');
    }

    section
}

fn format_metrics(metrics: &CampaignMetrics) -> String {
    format!(
        "**Revenue:** {:.2} | **Conversion rate:** {:.2}%\n",
        metrics.revenue,
        metrics.conversion_rate * 100.0
    )
}

/// Generate the insights section.
fn generate_insights_section(insights: Option<&Insights>) -> String {
    let mut section = String::new();

    section.push_str("## Insights\n\n");

    match insights {
        Some(insights) => {
            section.push_str(&format!("- **Top trend:** {}\n", insights.top_trend));
            section.push_str(&format!(
                "- **Target segment:** `{}`\n\n",
                insights.target_segment.to_value()
            ));
        }
        None => section.push_str("Insufficient data for analysis.\n\n"),
    }

    section
}

/// Generate the strategy section.
fn generate_strategy_section(strategy: Option<&Strategy>) -> String {
    let Some(strategy) = strategy else {
        return String::new();
    };

    let mut section = String::new();

    section.push_str("## Strategy\n\n```json\n");
    section.push_str(&serde_json::to_string_pretty(strategy).unwrap_or_default());
    section.push_str("\n```\n\n");

    section
}

/// Generate the execution section.
fn generate_execution_section(execution: Option<&Value>) -> String {
    let mut section = String::new();

    section.push_str("## Execution\n\n");

    match execution {
        Some(body) => {
            section.push_str("Strategy executed successfully.\n\n```json\n");
            section.push_str(&serde_json::to_string_pretty(body).unwrap_or_default());
            section.push_str("\n```\n\n");
        }
        None => section.push_str("No strategy was executed.\n\n"),
    }

    section
}

/// Generate a Markdown report for a monitoring run.
pub fn generate_monitor_markdown(report: &MonitorReport) -> String {
    let mut output = String::new();

    output.push_str("# Campaign Monitor Report\n\n");
    output.push_str(&format!("- **Campaign:** `{}`\n", report.campaign_id));
    output.push_str(&format!(
        "- **Started:** {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("- **Polls with data:** {}\n", report.snapshots.len()));
    output.push_str(&format!("- **Stopped:** {}\n", report.stop_reason));
    if let Some(peak) = report.peak_revenue() {
        output.push_str(&format!("- **Peak revenue:** {:.2}\n", peak));
    }
    if let Some(latest) = report.latest() {
        output.push_str(&format!(
            "- **Latest conversion rate:** {:.2}%\n",
            latest.conversion_rate * 100.0
        ));
    }
    output.push('\n');

    if !report.snapshots.is_empty() {
        output.push_str("| Poll | Revenue | Conversion rate |\n");
        output.push_str("|:---:|---:|---:|\n");
        for (i, metrics) in report.snapshots.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {:.2} | {:.2}% |\n",
                i + 1,
                metrics.revenue,
                metrics.conversion_rate * 100.0
            ));
        }
        output.push('\n');
    }

    output.push_str(&generate_footer());
    output
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by Campaign Advisor*\n".to_string()
}

/// Generate a JSON report for an advisory cycle.
pub fn generate_json_report(report: &CycleReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a JSON report for a monitoring run.
pub fn generate_monitor_json(report: &MonitorReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
