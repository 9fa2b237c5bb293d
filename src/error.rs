//! Error types for gql-batch.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for gql-batch operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The query template or the tabular input could not be read.
    #[error("Load error: {0}")]
    Load(String),

    /// The tabular input is structurally unusable (empty or duplicate headers).
    #[error("Input error: {0}")]
    Input(String),

    /// Variables declared by the query have no matching CSV column.
    #[error(
        "the CSV header does not supply {missing:?} (variables in query: {required:?}, variables supplied in CSV: {supplied:?})"
    )]
    BindingCoverage {
        missing: Vec<String>,
        required: Vec<String>,
        supplied: Vec<String>,
    },

    /// A data row does not have exactly one cell per header.
    #[error("Row {row} has {actual} values but the header has {expected} columns")]
    RowShape {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Transport or remote-side failure of a single request.
    #[error("Request error: {0}")]
    Request(String),

    /// A row failed while failures were not isolated, so the batch was abandoned.
    #[error("Batch failed at row {row}: {message}")]
    BatchFailed { row: usize, message: String },

    /// Configuration errors (invalid config file, missing endpoint, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BatchError {
    /// Creates a load error with the given message.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Creates an input error with the given message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Creates a request error with the given message.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Load(_) => "Load Error",
            Self::Input(_) => "Input Error",
            Self::BindingCoverage { .. } => "Binding Error",
            Self::RowShape { .. } => "Row Shape Error",
            Self::Request(_) => "Request Error",
            Self::BatchFailed { .. } => "Batch Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using BatchError.
pub type Result<T> = std::result::Result<T, BatchError>;
