//! Campaign performance monitoring.
//!
//! Polls the campaign analytics endpoint until it stops returning data,
//! the caller cancels, the poll limit is hit or the deadline passes.

use crate::config::MonitorConfig;
use crate::fetch::Fetchers;
use crate::models::{CampaignMetrics, MonitorReport, StopReason};
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument, Span};

/// Polling bounds for a monitoring run.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub max_iterations: usize,
    pub deadline: Duration,
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_iterations: config.max_iterations,
            deadline: config.deadline(),
        }
    }
}

/// Monitor the performance of a campaign.
pub async fn monitor_campaign(
    fetchers: &Fetchers,
    campaign_id: &str,
    settings: MonitorSettings,
    cancel: CancellationToken,
    span: &Span,
) -> MonitorReport {
    let started_at = Utc::now();
    let (snapshots, stop_reason) = poll(fetchers, campaign_id, settings, cancel)
        .instrument(span.clone())
        .await;

    MonitorReport {
        campaign_id: campaign_id.to_string(),
        started_at,
        snapshots,
        stop_reason,
    }
}

async fn poll(
    fetchers: &Fetchers,
    campaign_id: &str,
    settings: MonitorSettings,
    cancel: CancellationToken,
) -> (Vec<CampaignMetrics>, StopReason) {
    let deadline = Instant::now() + settings.deadline;
    let mut snapshots = Vec::new();
    let mut polls = 0usize;

    let reason = 'poll: loop {
        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => break 'poll StopReason::Cancelled,
            () = sleep_until(deadline) => break 'poll StopReason::Deadline,
            body = fetchers.analyze_campaign_performance(campaign_id) => body,
        };
        polls += 1;

        let metrics = match body {
            Value::Object(map) if !map.is_empty() => CampaignMetrics::from_body(&map),
            _ => {
                warn!("No metrics available for monitoring");
                break 'poll StopReason::NoMetrics;
            }
        };

        info!(
            poll = polls,
            revenue = metrics.revenue,
            conversion_rate = metrics.conversion_rate,
            "Campaign metrics"
        );
        snapshots.push(metrics);

        if polls >= settings.max_iterations {
            break 'poll StopReason::MaxIterations;
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break 'poll StopReason::Cancelled,
            () = sleep_until(deadline) => break 'poll StopReason::Deadline,
            () = sleep(settings.poll_interval) => {}
        }
    };

    debug!("Monitoring stopped after {} polls: {}", polls, reason);
    (snapshots, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointsConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(poll_ms: u64, max_iterations: usize, deadline_ms: u64) -> MonitorSettings {
        MonitorSettings {
            poll_interval: Duration::from_millis(poll_ms),
            max_iterations,
            deadline: Duration::from_millis(deadline_ms),
        }
    }

    async fn server_with_metrics() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/camp-1/performance"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"revenue": 250.0, "conversion_rate": 0.05})),
            )
            .mount(&server)
            .await;
        server
    }

    fn fetchers_for(server: &MockServer) -> Fetchers {
        Fetchers::new(
            EndpointsConfig::with_base(&server.uri()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_stops_when_metrics_run_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"revenue": 10.0})))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let report = monitor_campaign(
            &fetchers_for(&server),
            "camp-1",
            settings(5, 10, 10_000),
            CancellationToken::new(),
            &Span::none(),
        )
        .await;

        assert_eq!(report.stop_reason, StopReason::NoMetrics);
        assert_eq!(report.snapshots.len(), 2);
        assert_eq!(report.snapshots[0].revenue, 10.0);
        assert_eq!(report.snapshots[0].conversion_rate, 0.0);
    }

    #[tokio::test]
    async fn test_stops_at_poll_limit() {
        let server = server_with_metrics().await;

        let report = monitor_campaign(
            &fetchers_for(&server),
            "camp-1",
            settings(5, 3, 10_000),
            CancellationToken::new(),
            &Span::none(),
        )
        .await;

        assert_eq!(report.stop_reason, StopReason::MaxIterations);
        assert_eq!(report.snapshots.len(), 3);
        assert_eq!(report.latest().map(|m| m.revenue), Some(250.0));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_poll() {
        let server = server_with_metrics().await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = monitor_campaign(
            &fetchers_for(&server),
            "camp-1",
            settings(5, 10, 10_000),
            cancel,
            &Span::none(),
        )
        .await;

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert!(report.snapshots.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_wait() {
        let server = server_with_metrics().await;
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            monitor_campaign(
                &fetchers_for(&server),
                "camp-1",
                settings(60_000, 10, 60_000),
                cancel,
                &Span::none(),
            ),
        )
        .await
        .expect("monitor should stop on cancellation");

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.snapshots.len(), 1);
    }

    #[tokio::test]
    async fn test_deadline_interrupts_wait() {
        let server = server_with_metrics().await;

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            monitor_campaign(
                &fetchers_for(&server),
                "camp-1",
                settings(60_000, 10, 300),
                CancellationToken::new(),
                &Span::none(),
            ),
        )
        .await
        .expect("monitor should stop at the deadline");

        assert_eq!(report.stop_reason, StopReason::Deadline);
        assert_eq!(report.snapshots.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_counts_as_no_metrics() {
        let fetchers = Fetchers::new(
            EndpointsConfig::with_base("http://127.0.0.1:1"),
            Duration::from_secs(2),
        );

        let report = monitor_campaign(
            &fetchers,
            "camp-1",
            settings(5, 10, 10_000),
            CancellationToken::new(),
            &Span::none(),
        )
        .await;

        assert_eq!(report.stop_reason, StopReason::NoMetrics);
        assert!(report.snapshots.is_empty());
    }
}
