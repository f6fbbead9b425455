// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch requests

use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;

/// Bound on the result wait.
///
/// An explicitly unbounded wait is distinct from an unset one: only `Default`
/// defers to the dispatcher's configured bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultWait {
    /// Use the dispatcher's default bound.
    #[default]
    Default,
    /// Block until aggregation completes.
    Unbounded,
    /// Give up once the bound elapses.
    For(Duration),
}

impl ResultWait {
    /// Collapse `Default` against the dispatcher's configured bound; the
    /// resulting `None` blocks until aggregation completes.
    pub fn bound(self, default: Option<Duration>) -> Option<Duration> {
        match self {
            ResultWait::Default => default,
            ResultWait::Unbounded => None,
            ResultWait::For(limit) => Some(limit),
        }
    }
}

/// One remote function invocation: id, arguments, routing filter, result wait
#[derive(Clone, Debug)]
pub struct DispatchRequest {
    /// Registered function name
    pub function_id: String,
    /// Opaque arguments passed to every member
    pub args: Vec<Value>,
    /// Routing keys restricting a region execution
    pub filter: Option<BTreeSet<String>>,
    /// Bound on the result wait
    pub timeout: ResultWait,
}

impl DispatchRequest {
    pub fn new(function_id: impl Into<String>) -> Self {
        Self {
            function_id: function_id.into(),
            args: Vec::new(),
            filter: None,
            timeout: ResultWait::Default,
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_filter<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = ResultWait::For(timeout);
        self
    }

    /// Millisecond encoding of the result wait: any value below 1 means
    /// "block until aggregation completes", even when the dispatcher carries
    /// a default bound.
    pub fn with_timeout_millis(mut self, millis: i64) -> Self {
        self.timeout = if millis < 1 {
            ResultWait::Unbounded
        } else {
            ResultWait::For(Duration::from_millis(millis as u64))
        };
        self
    }
}
