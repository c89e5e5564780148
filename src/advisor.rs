//! The advisor pipeline driver.
//!
//! Runs gather → analyze → strategize → execute for one campaign, and
//! holds the tracing span every stage logs through.

use crate::analysis::{gather_data, process_data};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetchers;
use crate::models::{CampaignMetrics, CycleOutcome, CycleReport, MonitorReport};
use crate::monitor::{monitor_campaign, MonitorSettings};
use crate::storage::StorageSession;
use crate::strategy::{generate_strategy, Executor};
use chrono::Utc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument, Span};

/// Orchestrates advisory cycles for one customer and campaign.
pub struct Advisor {
    config: Config,
    fetchers: Fetchers,
    executor: Executor,
    span: Span,
}

impl Advisor {
    /// Create an advisor from a validated configuration.
    pub fn new(config: Config) -> Self {
        let span = info_span!(
            "advisor",
            customer_id = %config.advisor.customer_id,
            campaign_id = %config.advisor.campaign_id
        );
        Self::with_span(config, span)
    }

    /// Create an advisor that logs through the given span.
    pub fn with_span(config: Config, span: Span) -> Self {
        let timeout = config.http.timeout();
        let fetchers = Fetchers::new(config.endpoints.clone(), timeout);
        let executor = Executor::new(config.endpoints.execution_url.clone(), timeout);

        span.in_scope(|| {
            info!(
                "Initializing advisor for campaign {}",
                config.advisor.campaign_id
            )
        });

        Self {
            config,
            fetchers,
            executor,
            span,
        }
    }

    /// Open the storage session, run one cycle, and close the session.
    ///
    /// The session is closed whether or not the cycle succeeds.
    pub async fn run(&self) -> Result<CycleReport> {
        let mut storage = StorageSession::open(&self.config.advisor.aws_region)
            .instrument(self.span.clone())
            .await?;
        self.span
            .in_scope(|| debug!("Storage session open in {}", storage.region()));

        self.run_in(&mut storage).await
    }

    /// Run one cycle inside an open storage session, then close it.
    async fn run_in(&self, storage: &mut StorageSession) -> Result<CycleReport> {
        let result = self.run_cycle().await;
        self.span.in_scope(|| storage.close());
        result
    }

    /// Run one advisory cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let started = Instant::now();
        let advisor = &self.config.advisor;

        let market_data = gather_data(&self.fetchers, advisor, &self.span).await?;

        let insights = process_data(&market_data, &self.span);
        let strategy = generate_strategy(insights.as_ref(), &self.span);
        let execution = self
            .executor
            .execute_strategy(strategy.as_ref(), &advisor.campaign_id, &self.span)
            .await;

        let outcome = match (&strategy, &execution) {
            (Some(_), Some(_)) => CycleOutcome::Executed,
            (Some(_), None) => CycleOutcome::ExecutionFailed,
            (None, _) => CycleOutcome::InsufficientData,
        };

        self.span
            .in_scope(|| info!("Advisory cycle finished: {}", outcome));

        Ok(CycleReport {
            completed_at: Utc::now(),
            customer_id: advisor.customer_id.clone(),
            campaign_id: advisor.campaign_id.clone(),
            trend_count: market_data.trends.len(),
            segment_count: market_data.customer_segments.len(),
            campaign_metrics: market_data
                .campaign_metrics
                .as_ref()
                .map(CampaignMetrics::from_body),
            insights,
            strategy,
            execution,
            outcome,
            duration_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// Monitor the configured campaign until it stops reporting or `cancel` fires.
    pub async fn monitor(&self, cancel: CancellationToken) -> MonitorReport {
        monitor_campaign(
            &self.fetchers,
            &self.config.advisor.campaign_id,
            MonitorSettings::from(&self.config.monitor),
            cancel,
            &self.span,
        )
        .await
    }
}
