//! Configuration management for gql-batch.
//!
//! Settings come from an optional TOML file and are overridden by
//! command-line arguments and environment variables (see [`crate::cli`]).

use crate::batch::ExecutorOptions;
use crate::client::HttpClientConfig;
use crate::error::{BatchError, Result};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Contents of the configuration file. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// GraphQL endpoint URL.
    pub endpoint: Option<String>,

    /// Bearer token (prefer `GQL_BATCH_BEARER` over storing it here).
    pub bearer: Option<String>,

    /// Maximum number of requests in flight; 0 or unset sends every row at once.
    pub concurrency: Option<usize>,

    /// Whether one row's failure is reported on its own (true) or fails the batch.
    pub isolate_failures: Option<bool>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// CSV field delimiter.
    pub delimiter: Option<char>,

    /// Output format: "data" or "jsonl".
    pub output: Option<String>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gql-batch")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default (empty) configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| BatchError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            BatchError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}

/// Fully resolved settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub endpoint: Url,
    pub bearer: Option<String>,
    /// `None` means unbounded.
    pub concurrency: Option<usize>,
    /// Explicit failure policy; `None` derives it from `concurrency`.
    pub isolate_failures: Option<bool>,
    pub timeout: Duration,
    pub delimiter: char,
    pub output: OutputFormat,
}

impl BatchConfig {
    /// Creates settings for `endpoint` with defaults for everything else.
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            bearer: None,
            concurrency: None,
            isolate_failures: None,
            timeout: Duration::from_secs(crate::client::DEFAULT_TIMEOUT_SECS),
            delimiter: crate::input::DEFAULT_DELIMITER,
            output: OutputFormat::default(),
        })
    }

    /// Returns the execution policy for these settings.
    pub fn executor_options(&self) -> ExecutorOptions {
        let options = ExecutorOptions::from_ceiling(self.concurrency);
        match self.isolate_failures {
            Some(isolate) => options.with_isolate_failures(isolate),
            None => options,
        }
    }

    /// Returns the HTTP client settings.
    pub fn http_client_config(&self) -> HttpClientConfig {
        let config =
            HttpClientConfig::new(self.endpoint.clone()).with_timeout(self.timeout.as_secs());
        match &self.bearer {
            Some(token) => config.with_bearer(token.clone()),
            None => config,
        }
    }
}

/// Parses and checks a GraphQL endpoint URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| BatchError::config(format!("Invalid endpoint '{endpoint}': {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(BatchError::config(format!(
            "Invalid scheme '{}'. Expected 'http' or 'https'",
            url.scheme()
        )));
    }

    Ok(url)
}
