//! Mock GraphQL client for dry runs and testing.
//!
//! Echoes the variables it receives instead of talking to a server.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::batch::Binding;
use crate::client::GraphQlClient;
use crate::error::{BatchError, Result};

/// In-process client that answers `{"variables": {...}}` for every request.
///
/// It can be told to fail for particular variable values and to take a while
/// to answer, and it records every binding it saw along with the highest
/// number of requests it had in flight at once.
#[derive(Debug, Default)]
pub struct MockGraphQlClient {
    /// `(variable, value)` pairs that make a request fail.
    failures: Vec<(String, String)>,
    /// Simulated round-trip time.
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    seen: Mutex<Vec<Binding>>,
}

impl MockGraphQlClient {
    /// Creates a mock client that answers every request immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any request whose `variable` is bound to `value`.
    pub fn fail_when(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.failures.push((variable.into(), value.into()));
        self
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the bindings received, in the order requests started.
    pub fn requests(&self) -> Vec<Binding> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    /// Returns the number of requests received.
    pub fn request_count(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or_default()
    }

    /// Returns the highest number of requests that were in flight together.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn should_fail(&self, variables: &Binding) -> Option<&(String, String)> {
        self.failures
            .iter()
            .find(|(name, value)| variables.get(name) == Some(value.as_str()))
    }
}

#[async_trait]
impl GraphQlClient for MockGraphQlClient {
    async fn request(&self, _query: &str, variables: &Binding) -> Result<Value> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(variables.clone());
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((name, value)) = self.should_fail(variables) {
            return Err(BatchError::request(format!(
                "mock failure for {} = {:?}",
                name, value
            )));
        }

        Ok(json!({ "variables": variables }))
    }
}
