//! GraphQL transport for gql-batch.
//!
//! The batch executor only needs to send one document with one set of
//! variables and get the response data back. [`GraphQlClient`] is that seam;
//! [`HttpGraphQlClient`] talks to a real endpoint and [`MockGraphQlClient`]
//! answers in-process for dry runs and tests.

mod http;
mod mock;

pub use http::{HttpClientConfig, HttpGraphQlClient, DEFAULT_TIMEOUT_SECS};
pub use mock::MockGraphQlClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::batch::Binding;
use crate::error::Result;

/// A client able to execute a GraphQL document against an endpoint.
///
/// Implementations are shared by every in-flight request, so they must be
/// thread-safe and must not need `&mut self`.
#[async_trait]
pub trait GraphQlClient: Send + Sync {
    /// Executes `query` with `variables` and returns the response `data`.
    ///
    /// Transport failures, non-success statuses and GraphQL `errors` are all
    /// reported as [`crate::error::BatchError::Request`].
    async fn request(&self, query: &str, variables: &Binding) -> Result<Value>;
}
