// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration
//!
//! TOML model for a grid client:
//!
//! ```toml
//! [locks]
//! wait_ms = 30000
//! lease_ms = 60000
//! default_service = "default"
//!
//! [locks.services.inventory]
//! wait_ms = 0
//! lease_ms = -1
//!
//! [dispatch]
//! timeout = "30s"
//! ```
//!
//! Lock wait/lease values use the millisecond encoding of the underlying
//! lock service: `-1` blocks forever (wait) or holds until explicit unlock
//! (lease), `0` never waits. The dispatch timeout is a humantime duration;
//! absent means result waits are unbounded.

use crate::coordination::{DEFAULT_LEASE, DEFAULT_WAIT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration for a grid client
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub locks: LockSettings,
    pub dispatch: DispatchSettings,
}

impl GridConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

/// Lock-service defaults and pre-created services
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LockSettings {
    /// Default wait window, in the millisecond sentinel encoding
    pub wait_ms: i64,
    /// Default lease term, in the millisecond sentinel encoding
    pub lease_ms: i64,
    /// Service used by guarded calls whose rule names none
    pub default_service: String,
    /// Services registered before first use, with optional overrides
    pub services: HashMap<String, ServiceSettings>,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            wait_ms: DEFAULT_WAIT.as_millis() as i64,
            lease_ms: DEFAULT_LEASE.as_millis() as i64,
            default_service: "default".to_string(),
            services: HashMap::new(),
        }
    }
}

/// Per-service overrides; unset values inherit the defaults above
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub wait_ms: Option<i64>,
    pub lease_ms: Option<i64>,
}

/// Dispatch defaults
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Bound on result waits; absent blocks until aggregation completes
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
