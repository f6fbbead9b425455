// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process grid implementation
//!
//! [`LocalGrid`] implements both provider traits against shared in-memory
//! state: a lease-expiring lock table, simulated members, regions, pools, and
//! a registry of distributed functions. It doubles as the test double for the
//! coordination layer, recording every provider call and exposing failure and
//! latency knobs.

use super::function::{FunctionContext, FunctionHandler, FunctionSpec};
use super::traits::{
    ExecutionProvider, GridError, InvocationHandle, LockProvider, MemberId, PartialResult,
    PendingResults,
};
use crate::clock::{Clock, SystemClock};
use crate::coordination::LockKey;
use crate::dispatch::Target;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How often a blocked acquirer rechecks a contended lock
const WAIT_POLL: Duration = Duration::from_millis(2);

/// Recorded call to the grid, for test assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCall {
    Acquire {
        service: String,
        key: LockKey,
        wait: Option<Duration>,
        lease: Option<Duration>,
    },
    Release {
        service: String,
        key: LockKey,
    },
    Resolve {
        target: Target,
    },
    Invoke {
        function_id: String,
        members: usize,
    },
}

#[derive(Clone)]
struct RegisteredFunction {
    spec: FunctionSpec,
    handler: FunctionHandler,
}

struct LockHold {
    /// Lease deadline; `None` holds until explicit release
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct GridState {
    members: Vec<MemberId>,
    regions: HashMap<String, Vec<MemberId>>,
    pools: HashMap<String, Vec<MemberId>>,
    functions: HashMap<String, RegisteredFunction>,
    locks: HashMap<(String, LockKey), LockHold>,
    calls: Vec<GridCall>,
    unreachable: bool,
    result_delay: Option<Duration>,
    abandon_results: bool,
}

/// Single-process grid holding members, regions, pools, functions, and locks
#[derive(Clone)]
pub struct LocalGrid<C: Clock = SystemClock> {
    state: Arc<Mutex<GridState>>,
    clock: C,
}

impl LocalGrid<SystemClock> {
    /// Grid with `members` numbered members and the system clock
    pub fn new(members: usize) -> Self {
        Self::with_clock(members, SystemClock)
    }
}

impl<C: Clock + 'static> LocalGrid<C> {
    /// Grid measuring lease expiry and wait deadlines against `clock`.
    ///
    /// Bounded waits poll in real time but check the deadline against this
    /// clock: under a frozen [`FakeClock`](crate::clock::FakeClock) a non-zero
    /// wait spins until another task advances the clock. Fake-clock tests
    /// should contend with a zero wait window and drive expiry via `advance`.
    pub fn with_clock(members: usize, clock: C) -> Self {
        let members = (1..=members)
            .map(|i| MemberId::new(format!("member-{i}")))
            .collect();
        Self {
            state: Arc::new(Mutex::new(GridState {
                members,
                ..GridState::default()
            })),
            clock,
        }
    }

    fn state(&self) -> MutexGuard<'_, GridState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Host a region on every current member.
    pub fn create_region(&self, name: impl Into<String>) {
        let mut state = self.state();
        let members = state.members.clone();
        state.regions.insert(name.into(), members);
    }

    /// Define a server pool over the given members.
    pub fn create_pool(&self, name: impl Into<String>, members: Vec<MemberId>) {
        self.state().pools.insert(name.into(), members);
    }

    /// Register a function under its spec id.
    pub fn register_function<F>(&self, spec: FunctionSpec, handler: F)
    where
        F: Fn(FunctionContext<'_>) -> Result<Option<Value>, String> + Send + Sync + 'static,
    {
        let mut state = self.state();
        state.functions.insert(
            spec.id.clone(),
            RegisteredFunction {
                spec,
                handler: Arc::new(handler),
            },
        );
    }

    pub fn members(&self) -> Vec<MemberId> {
        self.state().members.clone()
    }

    /// Member owning a routing key, by stable hash over the membership
    pub fn owner_of(&self, key: &str) -> Option<MemberId> {
        let state = self.state();
        owner(&state.members, key).cloned()
    }

    /// All provider calls recorded so far
    pub fn calls(&self) -> Vec<GridCall> {
        self.state().calls.clone()
    }

    // === Failure and latency knobs ===

    /// Make every provider call fail with `GridError::Unavailable`.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    /// Delay result delivery for subsequent invocations.
    pub fn delay_results(&self, delay: Duration) {
        self.state().result_delay = Some(delay);
    }

    /// Abandon subsequent result streams before the end marker.
    pub fn abandon_results(&self, abandon: bool) {
        self.state().abandon_results = abandon;
    }

    fn check_reachable(state: &GridState) -> Result<(), GridError> {
        if state.unreachable {
            Err(GridError::Unavailable("grid unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Owner of a routing key within a membership, by stable crc32 slotting
fn owner<'a>(members: &'a [MemberId], key: &str) -> Option<&'a MemberId> {
    if members.is_empty() {
        return None;
    }
    let slot = crc32fast::hash(key.as_bytes()) as usize % members.len();
    members.get(slot)
}

/// Plan per-member execution. With a filter on a region scope, only members
/// owning at least one routing key run, each seeing its own key subset.
fn route(handle: &InvocationHandle, filter: Option<&BTreeSet<String>>) -> Vec<(MemberId, Vec<String>)> {
    match filter {
        Some(keys) if !keys.is_empty() && handle.region.is_some() => {
            let mut plan: Vec<(MemberId, Vec<String>)> = Vec::new();
            for key in keys {
                if let Some(member) = owner(&handle.members, key) {
                    match plan.iter_mut().find(|(m, _)| m == member) {
                        Some((_, owned)) => owned.push(key.clone()),
                        None => plan.push((member.clone(), vec![key.clone()])),
                    }
                }
            }
            plan
        }
        _ => handle
            .members
            .iter()
            .map(|member| (member.clone(), Vec::new()))
            .collect(),
    }
}

#[async_trait]
impl<C: Clock + 'static> LockProvider for LocalGrid<C> {
    async fn acquire(
        &self,
        service: &str,
        key: &LockKey,
        wait: Option<Duration>,
        lease: Option<Duration>,
    ) -> Result<bool, GridError> {
        let deadline = wait.map(|w| self.clock.now() + w);
        {
            let mut state = self.state();
            Self::check_reachable(&state)?;
            state.calls.push(GridCall::Acquire {
                service: service.to_string(),
                key: key.clone(),
                wait,
                lease,
            });
        }
        loop {
            {
                let mut state = self.state();
                Self::check_reachable(&state)?;
                let slot = (service.to_string(), key.clone());
                let now = self.clock.now();
                let free = state
                    .locks
                    .get(&slot)
                    .map_or(true, |hold| hold.expires_at.is_some_and(|at| now >= at));
                if free {
                    state.locks.insert(
                        slot,
                        LockHold {
                            expires_at: lease.map(|term| now + term),
                        },
                    );
                    return Ok(true);
                }
            }
            if deadline.is_some_and(|d| self.clock.now() >= d) {
                return Ok(false);
            }
            tokio::time::sleep(WAIT_POLL).await;
        }
    }

    async fn release(&self, service: &str, key: &LockKey) -> Result<(), GridError> {
        let mut state = self.state();
        Self::check_reachable(&state)?;
        state.calls.push(GridCall::Release {
            service: service.to_string(),
            key: key.clone(),
        });
        // Lenient on unheld keys, like the native lock service
        state.locks.remove(&(service.to_string(), key.clone()));
        Ok(())
    }
}

#[async_trait]
impl<C: Clock + 'static> ExecutionProvider for LocalGrid<C> {
    async fn resolve(&self, target: &Target) -> Result<InvocationHandle, GridError> {
        let mut state = self.state();
        Self::check_reachable(&state)?;
        state.calls.push(GridCall::Resolve {
            target: target.clone(),
        });
        let handle = match target {
            Target::AllMembers => InvocationHandle {
                members: state.members.clone(),
                region: None,
            },
            Target::Region(name) => {
                let members = state
                    .regions
                    .get(name)
                    .ok_or_else(|| GridError::UnknownRegion(name.clone()))?
                    .clone();
                InvocationHandle {
                    members,
                    region: Some(name.clone()),
                }
            }
            Target::ServerPool(name) => {
                let members = state
                    .pools
                    .get(name)
                    .ok_or_else(|| GridError::UnknownPool(name.clone()))?;
                // A pool dispatch lands on a single server
                InvocationHandle {
                    members: members.first().cloned().into_iter().collect(),
                    region: None,
                }
            }
            Target::ServerCache => InvocationHandle {
                members: state.members.first().cloned().into_iter().collect(),
                region: None,
            },
        };
        Ok(handle)
    }

    async fn invoke(
        &self,
        handle: InvocationHandle,
        function_id: &str,
        args: &[Value],
        filter: Option<&BTreeSet<String>>,
    ) -> Result<PendingResults, GridError> {
        let invocation = Uuid::new_v4();
        let (function, plan, delay, abandon) = {
            let mut state = self.state();
            Self::check_reachable(&state)?;
            let function = state
                .functions
                .get(function_id)
                .ok_or_else(|| GridError::UnknownFunction(function_id.to_string()))?
                .clone();
            let plan = route(&handle, filter);
            state.calls.push(GridCall::Invoke {
                function_id: function_id.to_string(),
                members: plan.len(),
            });
            (function, plan, state.result_delay, state.abandon_results)
        };
        tracing::debug!(
            %invocation,
            function = function_id,
            members = plan.len(),
            "invoking function"
        );

        let (tx, pending) = PendingResults::channel(32);
        let args = args.to_vec();
        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if abandon {
                // Dropping the sender without an end marker models a lost node
                return;
            }
            for (member, keys) in plan {
                let outcome = (function.handler)(FunctionContext {
                    member: &member,
                    arguments: &args,
                    keys: &keys,
                });
                match outcome {
                    Ok(value) => {
                        if function.spec.has_results
                            && tx.send(PartialResult::Value { member, value }).await.is_err()
                        {
                            return;
                        }
                    }
                    Err(message) => {
                        let _ = tx
                            .send(PartialResult::Failed(GridError::FunctionFailed {
                                member,
                                message,
                            }))
                            .await;
                        return;
                    }
                }
            }
            let _ = tx.send(PartialResult::End).await;
        });
        Ok(pending)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
