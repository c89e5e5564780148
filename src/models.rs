//! Data models for the campaign advisor.
//!
//! This module contains the records passed between the pipeline stages:
//! the aggregated market data, the derived insights, the strategy sent to
//! the execution endpoint, and the reports produced for the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single market trend and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Trend name (the key in the trends response).
    pub name: String,
    /// Trend score.
    pub score: f64,
}

/// A customer segment, kept exactly as the analytics API returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Segment(pub Map<String, Value>);

impl Segment {
    /// Size of the segment. Missing or non-numeric sizes count as zero.
    pub fn size(&self) -> f64 {
        self.0.get("size").and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Returns the segment as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Segment {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Market data gathered for one advisory cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Trends in the order the API listed them.
    pub trends: Vec<Trend>,
    /// Customer segments.
    pub customer_segments: Vec<Segment>,
    /// Raw campaign performance metrics, if any were returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_metrics: Option<Map<String, Value>>,
}

impl MarketData {
    /// True when no source returned anything.
    pub fn is_empty(&self) -> bool {
        self.trends.is_empty() && self.customer_segments.is_empty() && self.campaign_metrics.is_none()
    }
}

/// Insights derived from market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    /// Name of the highest scoring trend.
    pub top_trend: String,
    /// The largest customer segment.
    pub target_segment: Segment,
}

/// Kind of strategy. Only targeted campaigns are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    TargetedCampaign,
}

/// Objective of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    CustomerAcquisition,
}

/// A campaign strategy ready to be sent to the execution endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(rename = "type")]
    pub kind: StrategyType,
    pub objective: Objective,
    pub segments: Vec<Segment>,
    pub trend_focus: String,
}

/// Body of the execution request.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPayload<'a> {
    pub id: &'a str,
    pub strategy: &'a Strategy,
}

/// Revenue and conversion figures from a campaign performance response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignMetrics {
    pub revenue: f64,
    pub conversion_rate: f64,
}

impl CampaignMetrics {
    /// Extracts the metrics from a performance body, defaulting missing fields to zero.
    pub fn from_body(body: &Map<String, Value>) -> Self {
        let number = |key: &str| body.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        Self {
            revenue: number("revenue"),
            conversion_rate: number("conversion_rate"),
        }
    }
}

/// How an advisory cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The strategy was accepted by the execution endpoint.
    Executed,
    /// A strategy was built but the execution call failed.
    ExecutionFailed,
    /// Not enough data to derive insights; nothing was sent.
    InsufficientData,
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Executed => write!(f, "Executed"),
            CycleOutcome::ExecutionFailed => write!(f, "Execution failed"),
            CycleOutcome::InsufficientData => write!(f, "Insufficient data"),
        }
    }
}

/// Result of one advisory cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// When the cycle finished.
    pub completed_at: DateTime<Utc>,
    pub customer_id: String,
    pub campaign_id: String,
    /// Number of trends received.
    pub trend_count: usize,
    /// Number of customer segments received.
    pub segment_count: usize,
    /// Campaign metrics at the time of the cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_metrics: Option<CampaignMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// Response body of the execution endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<Value>,
    pub outcome: CycleOutcome,
    pub duration_seconds: f64,
}

/// Why the monitor stopped polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The performance endpoint returned no data.
    NoMetrics,
    /// The cancellation token fired.
    Cancelled,
    /// The poll limit was reached.
    MaxIterations,
    /// The monitoring deadline elapsed.
    Deadline,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NoMetrics => write!(f, "No metrics available"),
            StopReason::Cancelled => write!(f, "Cancelled"),
            StopReason::MaxIterations => write!(f, "Poll limit reached"),
            StopReason::Deadline => write!(f, "Deadline reached"),
        }
    }
}

/// Result of monitoring a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorReport {
    pub campaign_id: String,
    pub started_at: DateTime<Utc>,
    /// One entry per poll that returned data.
    pub snapshots: Vec<CampaignMetrics>,
    pub stop_reason: StopReason,
}

impl MonitorReport {
    /// Most recent snapshot, if any.
    pub fn latest(&self) -> Option<&CampaignMetrics> {
        self.snapshots.last()
    }

    /// Highest revenue seen while monitoring.
    pub fn peak_revenue(&self) -> Option<f64> {
        self.snapshots
            .iter()
            .map(|m| m.revenue)
            .fold(None, |acc: Option<f64>, r| match acc {
                Some(best) if best >= r => Some(best),
                _ => Some(r),
            })
    }
}
