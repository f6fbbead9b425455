// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registered distributed functions

use super::traits::MemberId;
use serde_json::Value;
use std::sync::Arc;

/// Per-member execution context handed to a registered function
pub struct FunctionContext<'a> {
    /// Member the function is running on
    pub member: &'a MemberId,
    /// Arguments attached to the dispatch
    pub arguments: &'a [Value],
    /// Routing keys owned by this member, empty when the dispatch had no filter
    pub keys: &'a [String],
}

/// Handler body of a registered function.
///
/// `Ok(None)` reports no value for this member (dropped by collectors);
/// an error fails the whole execution.
pub type FunctionHandler =
    Arc<dyn Fn(FunctionContext<'_>) -> Result<Option<Value>, String> + Send + Sync>;

/// Registration attributes of a distributed function.
///
/// `ha` and `optimized_for_write` are registration metadata for real grid
/// providers (re-execution and routing hints); [`LocalGrid`] stores them but
/// only acts on `has_results`.
///
/// [`LocalGrid`]: super::local::LocalGrid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSpec {
    /// Function name used at dispatch time
    pub id: String,
    /// Whether the provider may re-run the function after a member failure;
    /// registration metadata, not interpreted by the in-process grid
    pub ha: bool,
    /// Hint that the function writes to the targeted region; registration
    /// metadata, not interpreted by the in-process grid
    pub optimized_for_write: bool,
    /// Whether the function reports per-member results
    pub has_results: bool,
}

impl FunctionSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ha: true,
            optimized_for_write: false,
            has_results: true,
        }
    }

    pub fn with_ha(mut self, ha: bool) -> Self {
        self.ha = ha;
        self
    }

    pub fn with_optimized_for_write(mut self, optimized: bool) -> Self {
        self.optimized_for_write = optimized;
        self
    }

    pub fn with_results(mut self, has_results: bool) -> Self {
        self.has_results = has_results;
        self
    }
}

#[cfg(test)]
#[path = "function_tests.rs"]
mod tests;
