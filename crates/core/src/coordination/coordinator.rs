// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock coordinator
//!
//! Registry of named lock services delegating lock/unlock calls to a
//! distributed mutex provider. An unknown service is registered on first use
//! with the coordinator defaults; lookups are read-mostly after warm-up.

use super::service::{Lease, LockKey, LockServiceConfig, Wait, DEFAULT_LEASE, DEFAULT_WAIT};
use crate::config::GridConfig;
use crate::grid::{GridError, LockProvider};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors from lock operations
#[derive(Debug, Error)]
pub enum LockError {
    /// The wait window elapsed with the lock held by another owner
    #[error("lock wait elapsed for {key} in service {service}")]
    Timeout { service: String, key: LockKey },
    /// The lock provider is unreachable
    #[error("lock service unavailable: {0}")]
    Unavailable(#[from] GridError),
}

/// Registry of named lock services.
///
/// Locks in different services never contend. A lock acquired under a given
/// `(service, key)` must be released exactly once per acquisition, on every
/// exit path; calling [`unlock`](Self::unlock) without a prior successful
/// lock is undefined behavior of the underlying provider.
pub struct LockCoordinator<P: LockProvider> {
    provider: P,
    default_wait: Wait,
    default_lease: Lease,
    default_service: String,
    services: RwLock<HashMap<String, LockServiceConfig>>,
}

impl<P: LockProvider> LockCoordinator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            default_wait: Wait::For(DEFAULT_WAIT),
            default_lease: Lease::For(DEFAULT_LEASE),
            default_service: "default".to_string(),
            services: RwLock::new(HashMap::new()),
        }
    }

    /// Coordinator with defaults and pre-registered services from config.
    pub fn from_config(provider: P, config: &GridConfig) -> Self {
        let mut coordinator = Self::new(provider)
            .with_defaults(
                Wait::from_millis(config.locks.wait_ms),
                Lease::from_millis(config.locks.lease_ms),
            )
            .with_default_service(config.locks.default_service.clone());
        for (name, service) in &config.locks.services {
            let wait = service
                .wait_ms
                .map_or(coordinator.default_wait, |ms| {
                    Wait::from_millis(ms).resolve(coordinator.default_wait)
                });
            let lease = service
                .lease_ms
                .map_or(coordinator.default_lease, |ms| {
                    Lease::from_millis(ms).resolve(coordinator.default_lease)
                });
            coordinator = coordinator.with_service(
                LockServiceConfig::new(name).with_wait(wait).with_lease(lease),
            );
        }
        coordinator
    }

    /// Defaults for services created lazily on first use.
    pub fn with_defaults(mut self, wait: Wait, lease: Lease) -> Self {
        self.default_wait = wait.resolve(Wait::For(DEFAULT_WAIT));
        self.default_lease = lease.resolve(Lease::For(DEFAULT_LEASE));
        self
    }

    /// Service used by guarded calls whose rule names none.
    pub fn with_default_service(mut self, name: impl Into<String>) -> Self {
        self.default_service = name.into();
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_service(self, config: LockServiceConfig) -> Self {
        self.register(config);
        self
    }

    /// Pre-register a service configuration. First registration wins; a
    /// service is immutable once created.
    pub fn register(&self, config: LockServiceConfig) {
        let mut services = self.services.write().unwrap_or_else(|e| e.into_inner());
        services.entry(config.name.clone()).or_insert(config);
    }

    /// Configuration of a registered service
    pub fn service_config(&self, name: &str) -> Option<LockServiceConfig> {
        let services = self.services.read().unwrap_or_else(|e| e.into_inner());
        services.get(name).cloned()
    }

    /// Names of all registered services
    pub fn service_names(&self) -> Vec<String> {
        let services = self.services.read().unwrap_or_else(|e| e.into_inner());
        services.keys().cloned().collect()
    }

    pub fn default_service(&self) -> &str {
        &self.default_service
    }

    /// Acquire the lock on `(service, key)`.
    ///
    /// `Wait::Default` and `Lease::Default` resolve against the service
    /// configuration. Fails with [`LockError::Timeout`] when the wait window
    /// elapses with the lock still held by another owner.
    pub async fn lock(
        &self,
        service: &str,
        key: impl Into<LockKey>,
        wait: Wait,
        lease: Lease,
    ) -> Result<(), LockError> {
        let config = self.ensure_service(service);
        let wait = wait.resolve(config.wait);
        let lease = lease.resolve(config.lease);
        let key = key.into();
        tracing::debug!(service, key = %key, ?wait, ?lease, "acquiring lock");
        let acquired = self
            .provider
            .acquire(service, &key, wait.window(), lease.term())
            .await?;
        if acquired {
            Ok(())
        } else {
            Err(LockError::Timeout {
                service: service.to_string(),
                key,
            })
        }
    }

    /// Release the lock on `(service, key)`. Safe only when called by the
    /// holder of a prior successful [`lock`](Self::lock).
    pub async fn unlock(&self, service: &str, key: impl Into<LockKey>) -> Result<(), LockError> {
        let key = key.into();
        tracing::debug!(service, key = %key, "releasing lock");
        self.provider.release(service, &key).await?;
        Ok(())
    }

    /// Look up a service, registering it with the coordinator defaults on a
    /// miss. Double-checked so warmed-up callers never take the write lock.
    fn ensure_service(&self, name: &str) -> LockServiceConfig {
        {
            let services = self.services.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = services.get(name) {
                return config.clone();
            }
        }
        let mut services = self.services.write().unwrap_or_else(|e| e.into_inner());
        services
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(service = name, "registering lock service with defaults");
                LockServiceConfig::new(name)
                    .with_wait(self.default_wait)
                    .with_lease(self.default_lease)
            })
            .clone()
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
