// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock-service configuration and wait/lease semantics
//!
//! A lock service is a named mutual-exclusion domain: locks in different
//! services never contend, even for equal keys. Each service carries a wait
//! window (how long an acquirer waits for a contended lock) and a lease term
//! (how long a granted lock is held before automatic release).

use std::fmt;
use std::time::Duration;

/// Wait window applied when neither the caller nor the service sets one.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(30_000);

/// Lease term applied when neither the caller nor the service sets one.
pub const DEFAULT_LEASE: Duration = Duration::from_millis(60_000);

/// Key identifying a lock within a service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LockKey(pub String);

impl LockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl From<&str> for LockKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for LockKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How long to wait for a contended lock before giving up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    /// Use the wait window configured for the service.
    Default,
    /// Fail immediately when the lock is held by another owner.
    NoWait,
    /// Block until the lock is granted.
    Forever,
    /// Give up once the window elapses.
    For(Duration),
}

impl Wait {
    /// Decode the millisecond encoding used by the underlying lock service:
    /// `-1` blocks forever, `0` never waits, anything below `-1` defers to
    /// the configured default.
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            0 => Wait::NoWait,
            -1 => Wait::Forever,
            millis if millis < 0 => Wait::Default,
            millis => Wait::For(Duration::from_millis(millis as u64)),
        }
    }

    /// Collapse `Default` against a service's configured wait.
    pub fn resolve(self, configured: Wait) -> Wait {
        match self {
            Wait::Default => configured,
            other => other,
        }
    }

    /// Wait window handed to the provider: `None` blocks forever, a zero
    /// window never waits.
    pub fn window(self) -> Option<Duration> {
        match self {
            Wait::Default => Some(DEFAULT_WAIT),
            Wait::NoWait => Some(Duration::ZERO),
            Wait::Forever => None,
            Wait::For(window) => Some(window),
        }
    }
}

/// How long a granted lock is held before automatic release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lease {
    /// Use the lease term configured for the service.
    Default,
    /// Hold the lock until it is explicitly unlocked.
    UntilUnlocked,
    /// Release automatically once the term elapses.
    For(Duration),
}

impl Lease {
    /// Decode the millisecond encoding used by the underlying lock service:
    /// `-1` holds until explicit unlock, anything below `-1` defers to the
    /// configured default.
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            -1 => Lease::UntilUnlocked,
            millis if millis < 0 => Lease::Default,
            millis => Lease::For(Duration::from_millis(millis as u64)),
        }
    }

    /// Collapse `Default` against a service's configured lease.
    pub fn resolve(self, configured: Lease) -> Lease {
        match self {
            Lease::Default => configured,
            other => other,
        }
    }

    /// Lease term handed to the provider: `None` holds until explicit unlock.
    pub fn term(self) -> Option<Duration> {
        match self {
            Lease::Default => Some(DEFAULT_LEASE),
            Lease::UntilUnlocked => None,
            Lease::For(term) => Some(term),
        }
    }
}

/// Configuration of a named lock service. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockServiceConfig {
    /// Name identifying this service
    pub name: String,
    /// Wait window for lock calls that do not set their own
    pub wait: Wait,
    /// Lease term for lock calls that do not set their own
    pub lease: Lease,
}

impl LockServiceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wait: Wait::For(DEFAULT_WAIT),
            lease: Lease::For(DEFAULT_LEASE),
        }
    }

    pub fn with_wait(mut self, wait: Wait) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_lease(mut self, lease: Lease) -> Self {
        self.lease = lease;
        self
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
