// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed function dispatch
//!
//! This module provides:
//! - **Target** - the topology scope a remote computation runs against
//! - **DispatchRequest** - one invocation: id, arguments, filter, result wait
//! - **ResultCollector** - aggregation strategies for per-member partials
//! - **FunctionDispatcher** - resolve, invoke, and block on aggregation

pub mod collector;
pub mod dispatcher;
pub mod request;
pub mod target;

pub use collector::{CollectAll, ResultCollector, SingleValue, SumCollector};
pub use dispatcher::{DispatchError, FunctionDispatcher};
pub use request::{DispatchRequest, ResultWait};
pub use target::Target;
