// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed lock coordination
//!
//! This module provides:
//! - **Wait / Lease / LockServiceConfig** - per-service timeout semantics
//! - **LockCoordinator** - named lock-service registry delegating to a provider
//! - **LockRule / run_locked** - policy-driven guarding of protected calls

pub mod coordinator;
pub mod policy;
pub mod service;

pub use coordinator::{LockCoordinator, LockError};
pub use policy::{run_locked, CallSite, GuardedCallError, LockPolicy, LockRule, PolicyError};
pub use service::{Lease, LockKey, LockServiceConfig, Wait, DEFAULT_LEASE, DEFAULT_WAIT};
