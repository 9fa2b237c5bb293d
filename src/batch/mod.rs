//! Batch execution for gql-batch.
//!
//! Rows are bound to the template's variables, validated once against the
//! header, and dispatched through a [`BatchExecutor`] that owns the
//! concurrency policy.

mod binder;
mod executor;
mod validator;

pub use binder::bind_row;
pub use executor::{Admission, BatchExecutor, ExecutorOptions};
pub use validator::ensure_all_variables_set;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One data record of the tabular input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Zero-based position among the data rows (the header is not counted).
    pub index: usize,
    /// Line in the source file where the record starts, when known.
    pub line: Option<u64>,
    /// Cell values, already trimmed.
    pub cells: Vec<String>,
}

impl Row {
    /// Creates a row at the given position.
    pub fn new(index: usize, cells: Vec<String>) -> Self {
        Self {
            index,
            line: None,
            cells,
        }
    }

    /// Records the source line the row was read from.
    pub fn at_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    /// Returns the 1-based row number shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Formats "row N", adding the source line when it is known.
fn location(number: usize, line: Option<u64>) -> String {
    match line {
        Some(line) => format!("row {number} (line {line})"),
        None => format!("row {number}"),
    }
}

/// Variable values for a single request, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    entries: Vec<(String, String)>,
}

impl Binding {
    /// Returns the value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the binding as a JSON object, as sent in `variables`.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl FromIterator<(String, String)> for Binding {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Binding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Terminal state of a row's request.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// The endpoint answered; holds the response `data`.
    Succeeded(Value),
    /// The row could not be bound or its request failed.
    Failed(String),
}

/// Result of executing the template for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Zero-based index of the originating row.
    pub row: usize,
    /// Source line of the originating row, when known.
    pub line: Option<u64>,
    /// The variables sent, or `None` if the row could not be bound.
    pub binding: Option<Binding>,
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn succeeded(row: usize, binding: Binding, data: Value) -> Self {
        Self {
            row,
            line: None,
            binding: Some(binding),
            status: OutcomeStatus::Succeeded(data),
        }
    }

    pub fn failed(row: usize, binding: Option<Binding>, message: impl Into<String>) -> Self {
        Self {
            row,
            line: None,
            binding,
            status: OutcomeStatus::Failed(message.into()),
        }
    }

    pub fn with_line(mut self, line: Option<u64>) -> Self {
        self.line = line;
        self
    }

    /// Returns the 1-based row number shown to users.
    pub fn row_number(&self) -> usize {
        self.row + 1
    }

    /// Returns "row N" or "row N (line L)" for messages.
    pub fn location(&self) -> String {
        location(self.row_number(), self.line)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded(_))
    }

    /// Returns the failure message, if the row failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Failed(message) => Some(message),
            OutcomeStatus::Succeeded(_) => None,
        }
    }
}

/// All outcomes of a finished batch, ordered by row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    outcomes: Vec<Outcome>,
}

impl BatchReport {
    /// Builds a report, sorting outcomes back into row order.
    pub fn new(mut outcomes: Vec<Outcome>) -> Self {
        outcomes.sort_by_key(|outcome| outcome.row);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of rows whose request succeeded.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of rows that failed.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_success())
    }
}
