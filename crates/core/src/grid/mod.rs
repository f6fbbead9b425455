// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider traits for the external data grid, plus an in-process grid
//!
//! The grid itself - region storage, membership, the real distributed lock
//! protocol - is an external collaborator. This module defines the seam the
//! coordination layer talks through, and [`LocalGrid`], a single-process
//! implementation used by tests and embedded deployments.

pub mod function;
pub mod local;
pub mod traits;

pub use function::{FunctionContext, FunctionHandler, FunctionSpec};
pub use local::{GridCall, LocalGrid};
pub use traits::{
    ExecutionProvider, GridError, InvocationHandle, LockProvider, MemberId, PartialResult,
    PendingResults,
};
