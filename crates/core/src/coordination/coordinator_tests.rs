use super::*;
use crate::clock::FakeClock;
use crate::grid::{GridCall, LocalGrid};
use std::time::Duration;

fn grid() -> LocalGrid<FakeClock> {
    LocalGrid::with_clock(1, FakeClock::new())
}

#[tokio::test]
async fn first_lock_registers_service_with_defaults() {
    let coordinator = LockCoordinator::new(grid());

    coordinator
        .lock("orders", "order-1", Wait::Default, Lease::Default)
        .await
        .unwrap();

    let config = coordinator.service_config("orders").unwrap();
    assert_eq!(config.wait, Wait::For(DEFAULT_WAIT));
    assert_eq!(config.lease, Lease::For(DEFAULT_LEASE));
    assert_eq!(coordinator.service_names(), vec!["orders".to_string()]);
}

#[tokio::test]
async fn preregistered_service_keeps_its_config() {
    let provider = grid();
    let coordinator = LockCoordinator::new(provider.clone()).with_service(
        LockServiceConfig::new("orders")
            .with_wait(Wait::NoWait)
            .with_lease(Lease::UntilUnlocked),
    );

    coordinator
        .lock("orders", "order-1", Wait::Default, Lease::Default)
        .await
        .unwrap();

    assert_eq!(
        provider.calls(),
        vec![GridCall::Acquire {
            service: "orders".to_string(),
            key: "order-1".into(),
            wait: Some(Duration::ZERO),
            lease: None,
        }]
    );
}

#[tokio::test]
async fn register_keeps_first_configuration() {
    let coordinator = LockCoordinator::new(grid());

    coordinator.register(LockServiceConfig::new("orders").with_wait(Wait::NoWait));
    coordinator.register(LockServiceConfig::new("orders").with_wait(Wait::Forever));

    let config = coordinator.service_config("orders").unwrap();
    assert_eq!(config.wait, Wait::NoWait);
}

#[tokio::test]
async fn no_wait_lock_on_held_key_times_out() {
    let coordinator = LockCoordinator::new(grid());

    coordinator
        .lock("orders", "order-1", Wait::Default, Lease::Default)
        .await
        .unwrap();
    let contended = coordinator
        .lock("orders", "order-1", Wait::NoWait, Lease::Default)
        .await;

    assert!(matches!(contended, Err(LockError::Timeout { .. })));
}

#[tokio::test]
async fn locks_in_different_services_never_contend() {
    let coordinator = LockCoordinator::new(grid());

    coordinator
        .lock("orders", "shared-key", Wait::NoWait, Lease::Default)
        .await
        .unwrap();
    coordinator
        .lock("billing", "shared-key", Wait::NoWait, Lease::Default)
        .await
        .unwrap();
}

#[tokio::test]
async fn unlock_frees_the_key_for_the_next_caller() {
    let coordinator = LockCoordinator::new(grid());

    coordinator
        .lock("orders", "order-1", Wait::Default, Lease::Default)
        .await
        .unwrap();
    coordinator.unlock("orders", "order-1").await.unwrap();

    coordinator
        .lock("orders", "order-1", Wait::NoWait, Lease::Default)
        .await
        .unwrap();
}

#[tokio::test]
async fn unreachable_provider_surfaces_unavailable() {
    let provider = grid();
    let coordinator = LockCoordinator::new(provider.clone());
    provider.set_unreachable(true);

    let result = coordinator
        .lock("orders", "order-1", Wait::Default, Lease::Default)
        .await;

    assert!(matches!(result, Err(LockError::Unavailable(_))));
}

#[tokio::test]
async fn wait_and_lease_resolve_independently() {
    let provider = grid();
    let coordinator = LockCoordinator::new(provider.clone()).with_service(
        LockServiceConfig::new("orders")
            .with_wait(Wait::For(Duration::from_secs(5)))
            .with_lease(Lease::For(Duration::from_secs(120))),
    );

    coordinator
        .lock("orders", "order-1", Wait::Default, Lease::Default)
        .await
        .unwrap();

    assert_eq!(
        provider.calls(),
        vec![GridCall::Acquire {
            service: "orders".to_string(),
            key: "order-1".into(),
            wait: Some(Duration::from_secs(5)),
            lease: Some(Duration::from_secs(120)),
        }]
    );
}

#[tokio::test]
async fn explicit_arguments_override_service_config() {
    let provider = grid();
    let coordinator = LockCoordinator::new(provider.clone());

    coordinator
        .lock("orders", "order-1", Wait::NoWait, Lease::UntilUnlocked)
        .await
        .unwrap();

    assert_eq!(
        provider.calls(),
        vec![GridCall::Acquire {
            service: "orders".to_string(),
            key: "order-1".into(),
            wait: Some(Duration::ZERO),
            lease: None,
        }]
    );
}

#[tokio::test]
async fn from_config_applies_defaults_and_services() {
    let config = crate::config::GridConfig::from_toml_str(
        r#"
        [locks]
        wait_ms = 5000
        lease_ms = -1
        default_service = "repo"

        [locks.services.inventory]
        wait_ms = 0
        "#,
    )
    .unwrap();

    let coordinator = LockCoordinator::from_config(grid(), &config);

    assert_eq!(coordinator.default_service(), "repo");
    let inventory = coordinator.service_config("inventory").unwrap();
    assert_eq!(inventory.wait, Wait::NoWait);
    // unset lease inherits the configured default
    assert_eq!(inventory.lease, Lease::UntilUnlocked);
}
