//! HTTP GraphQL client.
//!
//! Posts `{"query", "variables"}` as JSON and unwraps the `data` field of the
//! response.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::batch::Binding;
use crate::client::GraphQlClient;
use crate::error::{BatchError, Result};

/// Default timeout for a single request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest response body quoted in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// GraphQL endpoint.
    pub endpoint: Url,
    /// Sent as `Authorization: Bearer <token>` when set.
    pub bearer: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpClientConfig {
    /// Creates a config for the given endpoint with no credentials.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            bearer: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// GraphQL client over HTTP.
///
/// Holds one pooled `reqwest::Client` that every concurrent request shares.
#[derive(Debug, Clone)]
pub struct HttpGraphQlClient {
    config: HttpClientConfig,
    client: Client,
}

impl HttpGraphQlClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BatchError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Turns a decoded response into its data, or the joined error messages.
    fn into_data(response: GraphQlResponse) -> Result<Value> {
        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(BatchError::request(format!(
                "GraphQL error: {}",
                messages.join("; ")
            )));
        }

        Ok(response.data.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl GraphQlClient for HttpGraphQlClient {
    async fn request(&self, query: &str, variables: &Binding) -> Result<Value> {
        let body = GraphQlRequest { query, variables };

        let mut request = self
            .client
            .post(self.config.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(token) = &self.config.bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| BatchError::request(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BatchError::request(format!("Failed to read response: {}", e)))?;

        debug!("GraphQL response status {}, {} bytes", status, text.len());

        // GraphQL servers often put useful `errors` in a 4xx body, so try it first.
        let decoded = serde_json::from_str::<GraphQlResponse>(&text);

        if !status.is_success() {
            if let Ok(response) = decoded {
                if response.errors.as_ref().is_some_and(|e| !e.is_empty()) {
                    return Self::into_data(response);
                }
            }
            let snippet: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(BatchError::request(format!("HTTP {}: {}", status, snippet)));
        }

        let response = decoded
            .map_err(|e| BatchError::request(format!("Failed to parse response: {}", e)))?;

        Self::into_data(response)
    }
}

// GraphQL wire types

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: &'a Binding,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}
