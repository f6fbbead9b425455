// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result collectors
//!
//! A collector is the aggregation strategy merging per-member partial results
//! into one logical result. Members may legitimately report no value; those
//! partials are dropped, never aggregated.

use super::dispatcher::DispatchError;
use crate::grid::MemberId;
use serde_json::Value;

/// Accumulates per-member partial results; terminal aggregation happens in
/// [`into_result`](Self::into_result).
pub trait ResultCollector: Send {
    type Output;

    /// Record one member's partial result.
    fn add_result(&mut self, member: &MemberId, value: Option<Value>);

    /// Called once every member has reported.
    fn end_results(&mut self) {}

    /// Discard everything collected so far.
    fn clear_results(&mut self);

    /// Terminal aggregation.
    fn into_result(self) -> Result<Self::Output, DispatchError>;
}

/// Collects every non-null partial in arrival order
#[derive(Debug, Default)]
pub struct CollectAll {
    results: Vec<Value>,
}

impl CollectAll {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultCollector for CollectAll {
    type Output = Vec<Value>;

    fn add_result(&mut self, _member: &MemberId, value: Option<Value>) {
        if let Some(value) = value {
            self.results.push(value);
        }
    }

    fn clear_results(&mut self) {
        self.results.clear();
    }

    fn into_result(self) -> Result<Vec<Value>, DispatchError> {
        Ok(self.results)
    }
}

/// Expects at most one non-null partial, for single-valued functions.
///
/// More than one is reported as [`DispatchError::Ambiguous`], never resolved
/// by picking one.
#[derive(Debug, Default)]
pub struct SingleValue {
    results: Vec<Value>,
}

impl SingleValue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultCollector for SingleValue {
    type Output = Option<Value>;

    fn add_result(&mut self, _member: &MemberId, value: Option<Value>) {
        if let Some(value) = value {
            self.results.push(value);
        }
    }

    fn clear_results(&mut self) {
        self.results.clear();
    }

    fn into_result(self) -> Result<Option<Value>, DispatchError> {
        if self.results.len() > 1 {
            return Err(DispatchError::Ambiguous(self.results.len()));
        }
        Ok(self.results.into_iter().next())
    }
}

/// Sums integer partials; null and non-numeric partials are dropped. The sum
/// saturates at the `i64` bounds instead of wrapping.
#[derive(Debug, Default)]
pub struct SumCollector {
    total: i64,
}

impl SumCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultCollector for SumCollector {
    type Output = i64;

    fn add_result(&mut self, _member: &MemberId, value: Option<Value>) {
        if let Some(value) = value.and_then(|v| v.as_i64()) {
            self.total = self.total.saturating_add(value);
        }
    }

    fn clear_results(&mut self) {
        self.total = 0;
    }

    fn into_result(self) -> Result<i64, DispatchError> {
        Ok(self.total)
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
