//! Fetchers for market trends, customer behavior and campaign performance.

use super::{describe_error, empty_body, open_session};
use crate::config::EndpointsConfig;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// The three data sources of an advisory cycle.
///
/// Cheap to clone so each fetch can run in its own task.
#[derive(Debug, Clone)]
pub struct Fetchers {
    endpoints: Arc<EndpointsConfig>,
    timeout: Duration,
}

impl Fetchers {
    pub fn new(endpoints: EndpointsConfig, timeout: Duration) -> Self {
        Self {
            endpoints: Arc::new(endpoints),
            timeout,
        }
    }

    /// Fetch real-time market trends.
    pub async fn fetch_market_trends(&self, api_key: &str) -> Value {
        let url = self.endpoints.market_trends_url.clone();
        self.get_json("market trends", |client| {
            client.get(&url).bearer_auth(api_key)
        })
        .await
    }

    /// Fetch behavior data for a customer.
    pub async fn fetch_customer_behavior(&self, customer_id: &str) -> Value {
        let url = self.endpoints.customer_behavior(customer_id);
        self.get_json("customer behavior", |client| client.get(&url))
            .await
    }

    /// Fetch performance metrics of a campaign.
    pub async fn analyze_campaign_performance(&self, campaign_id: &str) -> Value {
        let url = self.endpoints.campaign_performance(campaign_id);
        self.get_json("campaign performance", |client| client.get(&url))
            .await
    }

    /// Send one request on a fresh session and decode the JSON body.
    async fn get_json<F>(&self, source: &str, build: F) -> Value
    where
        F: FnOnce(&reqwest::Client) -> RequestBuilder,
    {
        let client = match open_session(self.timeout) {
            Ok(client) => client,
            Err(e) => {
                error!("Error fetching {}: cannot open HTTP session: {}", source, e);
                return empty_body();
            }
        };

        debug!("Fetching {}", source);

        let response = match build(&client).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Error fetching {}: {}",
                    source,
                    describe_error(&e, self.timeout)
                );
                return empty_body();
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            error!("API request failed: {} ({})", status, source);
            return empty_body();
        }

        match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                error!(
                    "Error fetching {}: {}",
                    source,
                    describe_error(&e, self.timeout)
                );
                empty_body()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetchers_for(server: &MockServer) -> Fetchers {
        Fetchers::new(
            EndpointsConfig::with_base(&server.uri()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_market_trends_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trends"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ai": 3.5})))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetchers_for(&server).fetch_market_trends("secret").await;
        assert_eq!(body, json!({"ai": 3.5}));
    }

    #[tokio::test]
    async fn test_customer_behavior_uses_customer_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/behavior/cust-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"size": 4}])))
            .mount(&server)
            .await;

        let body = fetchers_for(&server).fetch_customer_behavior("cust-7").await;
        assert_eq!(body, json!([{"size": 4}]));
    }

    #[tokio::test]
    async fn test_campaign_performance_uses_campaign_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spring/performance"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"revenue": 10.0})),
            )
            .mount(&server)
            .await;

        let body = fetchers_for(&server)
            .analyze_campaign_performance("spring")
            .await;
        assert_eq!(body["revenue"], 10.0);
    }

    #[tokio::test]
    async fn test_non_ok_status_returns_empty() {
        let server = MockServer::start().await;
        for status in [201u16, 404, 500] {
            server.reset().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({"x": 1})))
                .mount(&server)
                .await;

            let fetchers = fetchers_for(&server);
            assert_eq!(fetchers.fetch_market_trends("k").await, empty_body());
            assert_eq!(fetchers.fetch_customer_behavior("c").await, empty_body());
            assert_eq!(
                fetchers.analyze_campaign_performance("p").await,
                empty_body()
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_json_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let body = fetchers_for(&server).fetch_market_trends("k").await;
        assert_eq!(body, empty_body());
    }

    #[tokio::test]
    async fn test_transport_error_returns_empty() {
        // Nothing listens on port 1.
        let fetchers = Fetchers::new(
            EndpointsConfig::with_base("http://127.0.0.1:1"),
            Duration::from_secs(2),
        );

        assert_eq!(fetchers.fetch_market_trends("k").await, empty_body());
        assert_eq!(fetchers.fetch_customer_behavior("c").await, empty_body());
        assert_eq!(
            fetchers.analyze_campaign_performance("p").await,
            empty_body()
        );
    }
}
