//! Integration tests for gql-batch.

pub mod binary_test;
pub mod http_test;
