// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Function dispatcher
//!
//! Resolves a logical target to an invocation scope, starts the function
//! through the provider, and blocks the calling task on result aggregation.
//! One dispatch moves through `Resolving -> Invoking -> AwaitingResults` and
//! ends `Completed`, `TimedOut`, or `Failed`. No retries happen here; HA
//! re-execution is the provider's business.

use super::collector::ResultCollector;
use super::request::DispatchRequest;
use super::target::Target;
use crate::grid::{ExecutionProvider, GridError, PartialResult, PendingResults};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The result wait exceeded the requested bound. The remote computation
    /// may still be running; no cancellation is sent.
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),
    /// The remote execution failed
    #[error("remote execution failed: {0}")]
    Remote(#[from] GridError),
    /// A single-valued collector saw more than one non-null result
    #[error("ambiguous result: {0} values for a single-valued collector")]
    Ambiguous(usize),
    /// The result stream ended before the provider's end marker
    #[error("interrupted while awaiting results")]
    Interrupted,
}

/// Dispatches distributed functions against topology targets.
///
/// Dispatch is fire-and-wait: the calling task blocks on aggregation, and the
/// only shared state per call is the collector, which is never reused.
#[derive(Clone)]
pub struct FunctionDispatcher<P: ExecutionProvider> {
    provider: P,
    default_timeout: Option<Duration>,
}

impl<P: ExecutionProvider> FunctionDispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            default_timeout: None,
        }
    }

    /// Bound the result wait for requests that leave theirs unset. A request
    /// asking for an explicitly unbounded wait is never bounded by this.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Execute `request` against `target`, aggregating through `collector`.
    pub async fn execute<C>(
        &self,
        target: &Target,
        request: DispatchRequest,
        collector: C,
    ) -> Result<C::Output, DispatchError>
    where
        C: ResultCollector,
    {
        let handle = self.provider.resolve(target).await?;
        tracing::debug!(
            function = %request.function_id,
            %target,
            members = handle.members.len(),
            "dispatching function"
        );
        let mut pending = self
            .provider
            .invoke(
                handle,
                &request.function_id,
                &request.args,
                request.filter.as_ref(),
            )
            .await?;

        match request.timeout.bound(self.default_timeout) {
            None => drain(&mut pending, collector).await,
            Some(limit) => match tokio::time::timeout(limit, drain(&mut pending, collector)).await
            {
                Ok(result) => result,
                Err(_) => Err(DispatchError::Timeout(limit)),
            },
        }
    }

    /// Execute against the members hosting `region`.
    pub async fn execute_on_region<C>(
        &self,
        region: &str,
        request: DispatchRequest,
        collector: C,
    ) -> Result<C::Output, DispatchError>
    where
        C: ResultCollector,
    {
        self.execute(&Target::Region(region.to_string()), request, collector)
            .await
    }

    /// Execute on every member of the distributed system.
    pub async fn execute_on_members<C>(
        &self,
        request: DispatchRequest,
        collector: C,
    ) -> Result<C::Output, DispatchError>
    where
        C: ResultCollector,
    {
        self.execute(&Target::AllMembers, request, collector).await
    }

    /// Execute on one server reached through `pool`.
    pub async fn execute_on_pool<C>(
        &self,
        pool: &str,
        request: DispatchRequest,
        collector: C,
    ) -> Result<C::Output, DispatchError>
    where
        C: ResultCollector,
    {
        self.execute(&Target::ServerPool(pool.to_string()), request, collector)
            .await
    }

    /// Execute on the default cache server.
    pub async fn execute_on_cache<C>(
        &self,
        request: DispatchRequest,
        collector: C,
    ) -> Result<C::Output, DispatchError>
    where
        C: ResultCollector,
    {
        self.execute(&Target::ServerCache, request, collector).await
    }
}

/// Feed partials into the collector until the end marker.
async fn drain<C>(pending: &mut PendingResults, mut collector: C) -> Result<C::Output, DispatchError>
where
    C: ResultCollector,
{
    loop {
        match pending.next().await {
            Some(PartialResult::Value { member, value }) => collector.add_result(&member, value),
            Some(PartialResult::End) => {
                collector.end_results();
                return collector.into_result();
            }
            Some(PartialResult::Failed(error)) => return Err(DispatchError::Remote(error)),
            None => return Err(DispatchError::Interrupted),
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
