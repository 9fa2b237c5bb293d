//! Command-line argument parsing for gql-batch.

use crate::config::{BatchConfig, Config};
use crate::error::{BatchError, Result};
use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Run one GraphQL query per row of a CSV file.
///
/// Each CSV column header names a query variable; each following row is sent
/// as one request with those variables bound to the row's values.
#[derive(Parser, Debug)]
#[command(name = "gql-batch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GraphQL endpoint URL
    #[arg(long, value_name = "URL", env = "GQL_BATCH_ENDPOINT")]
    pub host: Option<String>,

    /// CSV file whose header names the query variables
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// GraphQL document whose variables are filled from each row
    #[arg(short, long, value_name = "PATH")]
    pub query: PathBuf,

    /// Bearer token sent as the Authorization header
    #[arg(long, value_name = "TOKEN", env = "GQL_BATCH_BEARER", hide_env_values = true)]
    pub bearer: Option<String>,

    /// Maximum number of requests in flight (0 sends every row at once)
    #[arg(short, long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Report each failed row and keep going
    #[arg(long, conflicts_with = "fail_fast")]
    pub isolate_failures: bool,

    /// Fail the whole batch on the first failed row
    #[arg(long)]
    pub fail_fast: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// CSV field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Output format: data or jsonl
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer every row locally by echoing its variables; nothing is sent
    #[arg(long)]
    pub dry_run: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the failure policy requested on the command line, if any.
    pub fn isolate_failures(&self) -> Option<bool> {
        match (self.isolate_failures, self.fail_fast) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Resolves the batch settings.
    ///
    /// Command-line arguments (and their environment variables) take
    /// precedence over the config file, which takes precedence over defaults.
    pub fn to_batch_config(&self, file: &Config) -> Result<BatchConfig> {
        let endpoint = self
            .host
            .as_deref()
            .or(file.endpoint.as_deref())
            .ok_or_else(|| {
                BatchError::config(
                    "No GraphQL endpoint configured. Pass --host or set GQL_BATCH_ENDPOINT",
                )
            })?;

        let mut config = BatchConfig::new(endpoint)?;
        config.bearer = self.bearer.clone().or_else(|| file.bearer.clone());
        config.concurrency = self.concurrency.or(file.concurrency);
        config.isolate_failures = self.isolate_failures().or(file.isolate_failures);

        if let Some(secs) = self.timeout.or(file.timeout_secs) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(delimiter) = self.delimiter.or(file.delimiter) {
            config.delimiter = delimiter;
        }
        if let Some(output) = self.output.as_deref().or(file.output.as_deref()) {
            config.output = output.parse::<OutputFormat>().map_err(BatchError::config)?;
        }

        Ok(config)
    }
}
