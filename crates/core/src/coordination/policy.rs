// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy-driven lock guarding
//!
//! Explicit replacement for intercepting protected methods: a [`LockRule`]
//! names how the lock key is derived from a call site, and [`run_locked`]
//! wraps the call, releasing the lock on every exit path.

use super::coordinator::{LockCoordinator, LockError};
use super::service::{Lease, LockKey, Wait};
use crate::grid::LockProvider;
use std::future::Future;
use thiserror::Error;

/// How the lock key is derived from the protected call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockPolicy {
    /// No locking around the call
    None,
    /// Lock on the operation name
    Operation,
    /// Lock on the n-th call argument
    Argument(usize),
    /// Lock on a fixed key
    Custom(String),
}

/// Locking rule attached to a protected operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRule {
    /// Service to lock in; the coordinator's default service when absent
    pub service: Option<String>,
    pub policy: LockPolicy,
    pub wait: Wait,
    pub lease: Lease,
}

impl LockRule {
    pub fn new(policy: LockPolicy) -> Self {
        Self {
            service: None,
            policy,
            wait: Wait::Default,
            lease: Lease::Default,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_wait(mut self, wait: Wait) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_lease(mut self, lease: Lease) -> Self {
        self.lease = lease;
        self
    }

    /// Lock key for a call site, `None` when the rule disables locking.
    pub fn resolve_key(&self, call: &CallSite<'_>) -> Result<Option<LockKey>, PolicyError> {
        match &self.policy {
            LockPolicy::None => Ok(None),
            LockPolicy::Operation => Ok(Some(LockKey::new(call.operation))),
            LockPolicy::Argument(index) => call
                .arguments
                .get(*index)
                .map(|argument| Some(LockKey::new(*argument)))
                .ok_or(PolicyError::ArgumentOutOfRange {
                    index: *index,
                    arguments: call.arguments.len(),
                }),
            LockPolicy::Custom(key) => Ok(Some(LockKey::new(key.clone()))),
        }
    }
}

/// A protected call about to run: its operation name and lockable arguments
#[derive(Clone, Copy, Debug)]
pub struct CallSite<'a> {
    pub operation: &'a str,
    pub arguments: &'a [&'a str],
}

/// Errors resolving a lock key from a rule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("lock argument {index} out of range for call with {arguments} arguments")]
    ArgumentOutOfRange { index: usize, arguments: usize },
}

/// Errors from a lock-guarded call
#[derive(Debug, Error)]
pub enum GuardedCallError<E: std::error::Error> {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Call(E),
}

/// Run `body` with the rule's lock held, releasing on every exit path.
///
/// The lock is acquired before the body runs and released exactly once
/// whether the body succeeds or fails. A release failure after a failed body
/// is logged and the body's error is surfaced.
pub async fn run_locked<P, F, Fut, T, E>(
    coordinator: &LockCoordinator<P>,
    rule: &LockRule,
    call: CallSite<'_>,
    body: F,
) -> Result<T, GuardedCallError<E>>
where
    P: LockProvider,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error,
{
    let Some(key) = rule.resolve_key(&call)? else {
        return body().await.map_err(GuardedCallError::Call);
    };
    let service = rule
        .service
        .as_deref()
        .unwrap_or_else(|| coordinator.default_service());

    coordinator
        .lock(service, key.clone(), rule.wait, rule.lease)
        .await?;
    let outcome = body().await;
    let released = coordinator.unlock(service, key.clone()).await;

    match outcome {
        Ok(value) => {
            released?;
            Ok(value)
        }
        Err(error) => {
            if let Err(release_error) = released {
                tracing::warn!(
                    service,
                    key = %key,
                    error = %release_error,
                    "failed to release lock after call error"
                );
            }
            Err(GuardedCallError::Call(error))
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
