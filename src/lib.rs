//! gql-batch - Run one GraphQL query per row of a CSV file.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod template;
