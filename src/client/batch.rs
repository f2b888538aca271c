//! Bounded-concurrency batch dispatch.

use super::{AcsClient, DispatchOptions};
use crate::error::AcsError;
use crate::request::AcsRequest;
use crate::response::Payload;
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Batch dispatch options.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of requests in flight. 0 behaves as 1.
    pub concurrency: usize,
    /// Options applied to every request of the batch.
    pub dispatch: DispatchOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            dispatch: DispatchOptions::default(),
        }
    }
}

impl BatchOptions {
    /// Options with the given concurrency.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Default::default()
        }
    }

    /// Apply these dispatch options to every request.
    pub fn with_dispatch(mut self, dispatch: DispatchOptions) -> Self {
        self.dispatch = dispatch;
        self
    }
}

/// Outcome counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Requests that produced a payload.
    pub fulfilled: usize,
    /// Requests that failed.
    pub rejected: usize,
}

impl BatchSummary {
    /// Number of requests dispatched.
    pub fn total(&self) -> usize {
        self.fulfilled + self.rejected
    }
}

impl AcsClient {
    /// Dispatch every request with at most `options.concurrency` in flight.
    ///
    /// Outcomes are returned in request order.
    pub async fn dispatch_batch(
        &self,
        requests: &[AcsRequest],
        options: &BatchOptions,
    ) -> Vec<Result<Payload, AcsError>> {
        let concurrency = options.concurrency.max(1);
        debug!(requests = requests.len(), concurrency = concurrency, "Dispatching batch");

        let mut outcomes: Vec<(usize, Result<Payload, AcsError>)> =
            stream::iter(requests.iter().enumerate())
                .map(|(index, request)| async move {
                    (index, self.dispatch_with(request, &options.dispatch).await)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        outcomes.sort_by_key(|(index, _)| *index);
        debug!(requests = requests.len(), "Batch finished");
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Dispatch every request with at most `options.concurrency` in flight,
    /// handing each outcome to exactly one callback.
    ///
    /// `on_fulfilled` receives the request index, the payload and `ctx`;
    /// `on_rejected` the index, the error and `ctx`. Callbacks run in
    /// completion order. Returns once every request has settled.
    pub async fn dispatch_batch_with<C, F, R>(
        &self,
        requests: &[AcsRequest],
        options: &BatchOptions,
        ctx: &C,
        mut on_fulfilled: F,
        mut on_rejected: R,
    ) -> BatchSummary
    where
        C: ?Sized,
        F: FnMut(usize, Payload, &C),
        R: FnMut(usize, AcsError, &C),
    {
        let concurrency = options.concurrency.max(1);
        debug!(requests = requests.len(), concurrency = concurrency, "Dispatching batch");

        let mut outcomes = stream::iter(requests.iter().enumerate())
            .map(|(index, request)| async move {
                (index, self.dispatch_with(request, &options.dispatch).await)
            })
            .buffer_unordered(concurrency);

        let mut summary = BatchSummary::default();
        while let Some((index, outcome)) = outcomes.next().await {
            match outcome {
                Ok(payload) => {
                    summary.fulfilled += 1;
                    on_fulfilled(index, payload, ctx);
                }
                Err(error) => {
                    summary.rejected += 1;
                    on_rejected(index, error, ctx);
                }
            }
        }

        debug!(
            fulfilled = summary.fulfilled,
            rejected = summary.rejected,
            "Batch finished"
        );
        summary
    }
}
