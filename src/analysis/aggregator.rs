//! Concurrent data gathering.
//!
//! The three fetchers run as separate tasks. Their bodies are joined by
//! name and then assembled into a [`MarketData`] record.

use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::fetch::{empty_body, is_empty_body, Fetchers};
use crate::models::{MarketData, Segment, Trend};
use serde_json::{Map, Value};
use tokio::task::JoinError;
use tracing::{debug, error, warn, Instrument, Span};

/// Raw bodies returned by the fetchers of one cycle.
#[derive(Debug, Clone, Default)]
pub struct SourceBodies {
    pub trends: Value,
    pub behavior: Value,
    pub performance: Value,
}

/// Gather all data needed for strategy generation.
///
/// Individual fetch failures yield empty fields. Only a body that cannot be
/// assembled into market data ends the cycle with an error.
pub async fn gather_data(
    fetchers: &Fetchers,
    advisor: &AdvisorConfig,
    span: &Span,
) -> Result<MarketData> {
    let bodies = fetch_all(fetchers, advisor, span).await;
    span.in_scope(|| {
        assemble(bodies).map_err(|e| {
            error!("{}", e);
            e
        })
    })
}

/// Run the three fetchers concurrently and collect their bodies by name.
pub async fn fetch_all(fetchers: &Fetchers, advisor: &AdvisorConfig, span: &Span) -> SourceBodies {
    let trends = {
        let fetchers = fetchers.clone();
        let api_key = advisor.api_key.clone();
        tokio::spawn(
            async move { fetchers.fetch_market_trends(&api_key).await }.instrument(span.clone()),
        )
    };
    let behavior = {
        let fetchers = fetchers.clone();
        let customer_id = advisor.customer_id.clone();
        tokio::spawn(
            async move { fetchers.fetch_customer_behavior(&customer_id).await }
                .instrument(span.clone()),
        )
    };
    let performance = {
        let fetchers = fetchers.clone();
        let campaign_id = advisor.campaign_id.clone();
        tokio::spawn(
            async move { fetchers.analyze_campaign_performance(&campaign_id).await }
                .instrument(span.clone()),
        )
    };

    let (trends, behavior, performance) =
        futures::future::join3(trends, behavior, performance).await;

    span.in_scope(|| SourceBodies {
        trends: settle("market trends", trends),
        behavior: settle("customer behavior", behavior),
        performance: settle("campaign performance", performance),
    })
}

/// Turn a finished fetch task into a body. A task that panicked or was
/// aborted counts as an empty result.
fn settle(source: &str, joined: std::result::Result<Value, JoinError>) -> Value {
    match joined {
        Ok(body) => body,
        Err(e) => {
            error!("Fetch task for {} did not complete: {}", source, e);
            empty_body()
        }
    }
}

/// Assemble fetched bodies into market data.
pub fn assemble(bodies: SourceBodies) -> Result<MarketData> {
    let data = MarketData {
        trends: parse_trends(bodies.trends)?,
        customer_segments: parse_segments(bodies.behavior)?,
        campaign_metrics: parse_metrics(bodies.performance),
    };

    if data.is_empty() {
        warn!("No data returned by any source");
    }

    debug!(
        "Gathered {} trends, {} segments, metrics: {}",
        data.trends.len(),
        data.customer_segments.len(),
        data.campaign_metrics.is_some()
    );

    Ok(data)
}

fn parse_trends(body: Value) -> Result<Vec<Trend>> {
    if is_empty_body(&body) {
        return Ok(Vec::new());
    }
    match body {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, value)| match value.as_f64() {
                Some(score) => Ok(Trend { name, score }),
                None => Err(AdvisorError::Aggregation(format!(
                    "trend '{}' has a non-numeric score: {}",
                    name, value
                ))),
            })
            .collect(),
        other => Err(AdvisorError::Aggregation(format!(
            "market trends response is not an object: {}",
            kind_of(&other)
        ))),
    }
}

fn parse_segments(body: Value) -> Result<Vec<Segment>> {
    if is_empty_body(&body) {
        return Ok(Vec::new());
    }
    match body {
        Value::Array(items) => segments_from(items),
        Value::Object(mut map) => match map.remove("segments") {
            Some(Value::Array(items)) => segments_from(items),
            Some(other) => Err(AdvisorError::Aggregation(format!(
                "customer 'segments' is not a list: {}",
                kind_of(&other)
            ))),
            None => Err(AdvisorError::Aggregation(
                "customer behavior response has no 'segments' list".to_string(),
            )),
        },
        other => Err(AdvisorError::Aggregation(format!(
            "customer behavior response is not a list or object: {}",
            kind_of(&other)
        ))),
    }
}

fn segments_from(items: Vec<Value>) -> Result<Vec<Segment>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(Segment::from(map)),
            other => Err(AdvisorError::Aggregation(format!(
                "customer segment {} is not an object: {}",
                index,
                kind_of(&other)
            ))),
        })
        .collect()
}

/// Any body that is not a non-empty object yields no metrics.
fn parse_metrics(body: Value) -> Option<Map<String, Value>> {
    if is_empty_body(&body) {
        return None;
    }
    match body {
        Value::Object(map) => Some(map),
        other => {
            warn!(
                "Ignoring campaign performance response that is not an object: {}",
                kind_of(&other)
            );
            None
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
