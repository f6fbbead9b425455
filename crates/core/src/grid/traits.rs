// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider trait definitions for the external grid

use crate::coordination::LockKey;
use crate::dispatch::Target;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Identity of a member participating in the distributed system
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from grid operations
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid unreachable: {0}")]
    Unavailable(String),
    #[error("region not found: {0}")]
    UnknownRegion(String),
    #[error("pool not found: {0}")]
    UnknownPool(String),
    #[error("function not registered: {0}")]
    UnknownFunction(String),
    #[error("function failed on {member}: {message}")]
    FunctionFailed { member: MemberId, message: String },
}

/// Resolved execution scope for one dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationHandle {
    /// Members the function will run on, before filter routing
    pub members: Vec<MemberId>,
    /// Region the scope was resolved from, when targeting a region
    pub region: Option<String>,
}

/// One per-member outcome streamed back from an in-flight invocation
#[derive(Debug)]
pub enum PartialResult {
    /// A member finished; `None` marks a member that produced no value
    Value {
        member: MemberId,
        value: Option<Value>,
    },
    /// Every member has reported; aggregation is complete
    End,
    /// The execution failed remotely
    Failed(GridError),
}

/// Stream of partial results for an in-flight invocation.
///
/// Drained by the dispatcher on the calling task; the provider feeds it from
/// wherever the function actually runs.
pub struct PendingResults {
    rx: mpsc::Receiver<PartialResult>,
}

impl PendingResults {
    /// Create a stream along with the sending half used by providers.
    pub fn channel(capacity: usize) -> (mpsc::Sender<PartialResult>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    /// Next partial result, or `None` when the provider abandoned the stream
    /// before the end marker.
    pub async fn next(&mut self) -> Option<PartialResult> {
        self.rx.recv().await
    }
}

/// Provider of distributed mutual exclusion, keyed by service name.
#[async_trait]
pub trait LockProvider: Clone + Send + Sync + 'static {
    /// Try to take the lock on `(service, key)`.
    ///
    /// `wait` bounds how long to contend for a held lock (`None` blocks
    /// forever, a zero window fails immediately). `lease` bounds how long the
    /// grant is held before automatic release (`None` holds until
    /// [`release`](Self::release)). Returns `Ok(false)` when the wait window
    /// elapses with the lock still held by another owner.
    async fn acquire(
        &self,
        service: &str,
        key: &LockKey,
        wait: Option<Duration>,
        lease: Option<Duration>,
    ) -> Result<bool, GridError>;

    /// Release the hold on `(service, key)`.
    async fn release(&self, service: &str, key: &LockKey) -> Result<(), GridError>;
}

/// Provider of remote function execution.
#[async_trait]
pub trait ExecutionProvider: Clone + Send + Sync + 'static {
    /// Resolve a topology target to a concrete invocation scope.
    async fn resolve(&self, target: &Target) -> Result<InvocationHandle, GridError>;

    /// Start `function_id` across the scope, streaming per-member partials.
    ///
    /// The filter restricts a region execution to members owning the given
    /// routing keys. Retry of failed members (HA) is the provider's business;
    /// callers never see re-runs, only the final partials.
    async fn invoke(
        &self,
        handle: InvocationHandle,
        function_id: &str,
        args: &[Value],
        filter: Option<&BTreeSet<String>>,
    ) -> Result<PendingResults, GridError>;
}
