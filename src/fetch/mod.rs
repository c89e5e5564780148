//! Remote data sources.
//!
//! Every call opens its own short-lived HTTP session. Failures are logged
//! and turned into an empty JSON object; callers cannot tell an empty
//! result from a failed call.

pub mod sources;

pub use sources::Fetchers;

use serde_json::{Map, Value};
use std::time::Duration;

/// The value returned by a fetcher when nothing usable came back.
pub fn empty_body() -> Value {
    Value::Object(Map::new())
}

/// True for `null`, `{}`, `[]` and `""`.
pub fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Build a transient HTTP client for a single request.
pub(crate) fn open_session(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Human readable description of a transport failure.
pub(crate) fn describe_error(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        format!("request timed out after {}s", timeout.as_secs())
    } else if err.is_connect() {
        match err.url() {
            Some(url) => format!("cannot connect to {}", url),
            None => "cannot connect to host".to_string(),
        }
    } else if err.is_decode() {
        format!("invalid JSON body: {}", err)
    } else {
        format!("request failed: {}", err)
    }
}
