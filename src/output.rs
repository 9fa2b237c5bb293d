//! Writing outcomes to the output sink.

use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

use crate::batch::{Binding, Outcome, OutcomeStatus};
use crate::error::{BatchError, Result};

/// How outcomes are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Response data only, one JSON document per line; failures go to stderr.
    #[default]
    Data,
    /// One JSON envelope per row, successes and failures alike.
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "data" => Ok(Self::Data),
            "jsonl" => Ok(Self::Jsonl),
            _ => Err(format!(
                "Invalid output format: {s}. Expected: data or jsonl"
            )),
        }
    }
}

/// Per-row JSON envelope written in [`OutputFormat::Jsonl`].
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u64>,
    variables: Option<&'a Binding>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a Outcome> for Envelope<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        let (status, data, error) = match &outcome.status {
            OutcomeStatus::Succeeded(data) => ("ok", Some(data), None),
            OutcomeStatus::Failed(message) => ("error", None, Some(message.as_str())),
        };

        Self {
            row: outcome.row_number(),
            line: outcome.line,
            variables: outcome.binding.as_ref(),
            status,
            data,
            error,
        }
    }
}

/// Writes outcomes, one line each, to a writer.
///
/// In [`OutputFormat::Data`] failed rows are reported on a separate sink
/// (stderr by default) so they reach the terminal whatever the log filter is.
pub struct OutcomeWriter<W: Write, E: Write = io::Stderr> {
    writer: W,
    failures: E,
    format: OutputFormat,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self::with_failures(writer, io::stderr(), format)
    }
}

impl<W: Write, E: Write> OutcomeWriter<W, E> {
    /// Creates a writer that reports data-mode failures to `failures`.
    pub fn with_failures(writer: W, failures: E, format: OutputFormat) -> Self {
        Self {
            writer,
            failures,
            format,
        }
    }

    /// Writes a single outcome.
    pub fn write(&mut self, outcome: &Outcome) -> Result<()> {
        let line = match (self.format, &outcome.status) {
            (OutputFormat::Data, OutcomeStatus::Succeeded(data)) => to_line(data)?,
            (OutputFormat::Data, OutcomeStatus::Failed(message)) => {
                let variables = outcome
                    .binding
                    .as_ref()
                    .map(|b| b.to_json().to_string())
                    .unwrap_or_else(|| "-".to_string());
                return writeln!(
                    self.failures,
                    "Failed {} (variables: {}): {}",
                    outcome.location(),
                    variables,
                    message
                )
                .map_err(|e| BatchError::internal(format!("Failed to report failure: {}", e)));
            }
            (OutputFormat::Jsonl, _) => to_line(&Envelope::from(outcome))?,
        };

        writeln!(self.writer, "{}", line)
            .map_err(|e| BatchError::internal(format!("Failed to write output: {}", e)))
    }

    /// Writes every outcome in order, then flushes.
    pub fn write_all<'o>(&mut self, outcomes: impl IntoIterator<Item = &'o Outcome>) -> Result<()> {
        for outcome in outcomes {
            self.write(outcome)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.failures
            .flush()
            .and_then(|()| self.writer.flush())
            .map_err(|e| BatchError::internal(format!("Failed to flush output: {}", e)))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Returns the output and failure sinks.
    pub fn into_parts(self) -> (W, E) {
        (self.writer, self.failures)
    }
}

fn to_line<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| BatchError::internal(format!("Failed to serialize outcome: {}", e)))
}
