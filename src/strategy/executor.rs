//! Submission of strategies to the campaign execution endpoint.

use crate::fetch::{describe_error, open_session};
use crate::models::{ExecutionPayload, Strategy};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn, Instrument, Span};

/// Sends strategies to the marketing automation service.
#[derive(Debug, Clone)]
pub struct Executor {
    execution_url: String,
    timeout: Duration,
}

impl Executor {
    pub fn new(execution_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            execution_url: execution_url.into(),
            timeout,
        }
    }

    /// Execute a strategy for a campaign.
    ///
    /// Returns the response body when the service answers 200. Every other
    /// outcome is logged and yields `None`; nothing is retried.
    pub async fn execute_strategy(
        &self,
        strategy: Option<&Strategy>,
        campaign_id: &str,
        span: &Span,
    ) -> Option<Value> {
        let Some(strategy) = strategy else {
            span.in_scope(|| warn!("No strategy available for execution"));
            return None;
        };

        let payload = ExecutionPayload {
            id: campaign_id,
            strategy,
        };

        self.post(&payload).instrument(span.clone()).await
    }

    async fn post(&self, payload: &ExecutionPayload<'_>) -> Option<Value> {
        let client = match open_session(self.timeout) {
            Ok(client) => client,
            Err(e) => {
                error!("Strategy execution failed: cannot open HTTP session: {}", e);
                return None;
            }
        };

        let response = match client.post(&self.execution_url).json(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Strategy execution failed: {}",
                    describe_error(&e, self.timeout)
                );
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            error!("Execution failed: {}", status);
            return None;
        }

        match response.json::<Value>().await {
            Ok(body) => {
                info!("Strategy executed successfully");
                Some(body)
            }
            Err(e) => {
                error!(
                    "Strategy execution failed: {}",
                    describe_error(&e, self.timeout)
                );
                None
            }
        }
    }
}
