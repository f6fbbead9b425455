// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gridlink-core: coordination layer for a distributed in-memory data grid
//!
//! This crate provides:
//! - A lock coordinator mapping named lock services to wait/lease timeouts
//! - A function dispatcher resolving topology targets and aggregating results
//! - Provider traits treating the grid itself as an external collaborator
//! - An in-process grid for tests and single-node deployments

pub mod clock;
pub mod config;
pub mod coordination;
pub mod dispatch;
pub mod grid;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, DispatchSettings, GridConfig, LockSettings, ServiceSettings};

pub use coordination::{
    run_locked, CallSite, GuardedCallError, Lease, LockCoordinator, LockError, LockKey,
    LockPolicy, LockRule, LockServiceConfig, PolicyError, Wait,
};

pub use dispatch::{
    CollectAll, DispatchError, DispatchRequest, FunctionDispatcher, ResultCollector, ResultWait,
    SingleValue, SumCollector, Target,
};

pub use grid::{
    ExecutionProvider, FunctionContext, FunctionSpec, GridCall, GridError, InvocationHandle,
    LocalGrid, LockProvider, MemberId, PartialResult, PendingResults,
};
