//! Concurrent execution of one request per row.
//!
//! Every row goes through the same dispatch step (bind, send, capture the
//! outcome). What differs between runs is how many rows may be in flight at
//! once ([`Admission`]) and whether a failed row sinks the whole batch
//! ([`ExecutorOptions::isolate_failures`]).

use futures::future;
use futures::stream::{self, Stream, StreamExt};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::{bind_row, ensure_all_variables_set, BatchReport, Outcome, Row};
use crate::client::GraphQlClient;
use crate::error::{BatchError, Result};
use crate::template::Template;

/// How rows are admitted into flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Every row is sent at once.
    Wave,
    /// At most this many requests are in flight; each completion admits the next row.
    Window(NonZeroUsize),
}

impl Admission {
    /// Maps a configured ceiling to an admission policy; zero means unbounded.
    pub fn from_ceiling(ceiling: Option<usize>) -> Self {
        match ceiling.and_then(NonZeroUsize::new) {
            Some(n) => Self::Window(n),
            None => Self::Wave,
        }
    }

    /// Number of concurrent requests allowed for a batch of `rows` rows.
    fn limit(&self, rows: usize) -> usize {
        match self {
            Self::Wave => rows.max(1),
            Self::Window(n) => n.get(),
        }
    }
}

/// Execution policy for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub admission: Admission,
    /// When false, the first failed row fails the batch and no outcomes are returned.
    pub isolate_failures: bool,
}

impl ExecutorOptions {
    /// Derives the default policy from a concurrency ceiling.
    ///
    /// Without a ceiling all rows go out in one wave and any failure fails the
    /// batch. With a ceiling, every row's outcome is reported on its own.
    pub fn from_ceiling(ceiling: Option<usize>) -> Self {
        let admission = Admission::from_ceiling(ceiling);
        Self {
            admission,
            isolate_failures: matches!(admission, Admission::Window(_)),
        }
    }

    /// Overrides the failure policy.
    pub fn with_isolate_failures(mut self, isolate: bool) -> Self {
        self.isolate_failures = isolate;
        self
    }
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self::from_ceiling(None)
    }
}

/// Runs a template once per row against a shared client.
///
/// Constructing an executor validates that the header supplies every variable
/// the template declares, so no request can be sent for an incomplete header.
pub struct BatchExecutor<'a> {
    client: &'a dyn GraphQlClient,
    template: &'a Template,
    headers: &'a [String],
    options: ExecutorOptions,
}

impl<'a> BatchExecutor<'a> {
    /// Creates an executor after checking variable coverage.
    pub fn new(
        client: &'a dyn GraphQlClient,
        template: &'a Template,
        headers: &'a [String],
        options: ExecutorOptions,
    ) -> Result<Self> {
        ensure_all_variables_set(template.required_variables(), headers)?;

        Ok(Self {
            client,
            template,
            headers,
            options,
        })
    }

    /// Runs every row and returns the outcomes in row order.
    ///
    /// With `isolate_failures` off, a failure makes the batch return
    /// [`BatchError::BatchFailed`] once the requests in flight finish. A window
    /// stops admitting new rows after the first failure; a wave has already
    /// dispatched all of them.
    pub async fn execute(&self, rows: Vec<Row>) -> Result<BatchReport> {
        let total = rows.len();
        info!(
            "Executing {} row(s) with {:?}, isolate_failures={}",
            total, self.options.admission, self.options.isolate_failures
        );

        // A wave admits every row up front, so only a window can stop admitting.
        let halted = AtomicBool::new(false);
        let halt = matches!(self.options.admission, Admission::Window(_)).then_some(&halted);
        let mut outcomes = Vec::with_capacity(total);
        let mut first_failure: Option<Outcome> = None;

        let mut in_flight = std::pin::pin!(self.admit(rows, halt));
        while let Some(outcome) = in_flight.next().await {
            let Some(outcome) = outcome else { continue };

            if !self.options.isolate_failures && !outcome.is_success() {
                halted.store(true, Ordering::SeqCst);
                // Keep the earliest row so the reported failure is deterministic.
                if first_failure.as_ref().map_or(true, |f| outcome.row < f.row) {
                    first_failure = Some(outcome);
                }
                continue;
            }

            outcomes.push(outcome);
        }

        if let Some(failure) = first_failure {
            let message = failure.error().unwrap_or_default().to_string();
            warn!("Batch aborted by {}: {}", failure.location(), message);
            return Err(BatchError::BatchFailed {
                row: failure.row_number(),
                message,
            });
        }

        let report = BatchReport::new(outcomes);
        info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }

    /// Runs every row, yielding outcomes as they complete.
    ///
    /// Exactly one outcome is produced per row, failures included, regardless
    /// of the failure policy. Dropping the stream abandons outstanding requests.
    pub fn execute_stream(&self, rows: Vec<Row>) -> impl Stream<Item = Outcome> + '_ {
        self.admit(rows, None).filter_map(future::ready)
    }

    /// Admits rows according to the admission policy.
    ///
    /// Rows admitted after `halted` is set resolve to `None` without sending.
    fn admit<'s>(
        &'s self,
        rows: Vec<Row>,
        halted: Option<&'s AtomicBool>,
    ) -> impl Stream<Item = Option<Outcome>> + 's {
        let limit = self.options.admission.limit(rows.len());

        stream::iter(rows)
            .map(move |row| async move {
                if halted.is_some_and(|h| h.load(Ordering::SeqCst)) {
                    debug!("Skipping row {}: batch halted", row.number());
                    return None;
                }
                Some(self.dispatch_row(row).await)
            })
            .buffer_unordered(limit)
    }

    /// Binds a row, sends its request and captures the result.
    async fn dispatch_row(&self, row: Row) -> Outcome {
        let index = row.index;
        let line = row.line;
        let place = super::location(row.number(), line);

        let binding = match bind_row(self.headers, row) {
            Ok(binding) => binding,
            Err(e) => {
                warn!("Not sending {}: {}", place, e);
                return Outcome::failed(index, None, e.to_string()).with_line(line);
            }
        };

        debug!("{} in flight", place);
        let outcome = match self.client.request(self.template.text(), &binding).await {
            Ok(data) => Outcome::succeeded(index, binding, data),
            Err(e) => {
                debug!("{} failed: {}", place, e);
                Outcome::failed(index, Some(binding), e.to_string())
            }
        };
        outcome.with_line(line)
    }
}
