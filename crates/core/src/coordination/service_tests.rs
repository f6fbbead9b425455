use super::*;

mod yare_tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        zero_is_no_wait = { 0, Wait::NoWait },
        minus_one_is_forever = { -1, Wait::Forever },
        minus_two_is_default = { -2, Wait::Default },
        deep_negative_is_default = { -500, Wait::Default },
        positive_is_window = { 2500, Wait::For(Duration::from_millis(2500)) },
    )]
    fn wait_from_millis(millis: i64, expected: Wait) {
        assert_eq!(Wait::from_millis(millis), expected);
    }

    #[parameterized(
        minus_one_holds_until_unlock = { -1, Lease::UntilUnlocked },
        minus_two_is_default = { -2, Lease::Default },
        zero_is_zero_term = { 0, Lease::For(Duration::ZERO) },
        positive_is_term = { 1000, Lease::For(Duration::from_millis(1000)) },
    )]
    fn lease_from_millis(millis: i64, expected: Lease) {
        assert_eq!(Lease::from_millis(millis), expected);
    }
}

#[test]
fn default_wait_defers_to_configured_value() {
    let configured = Wait::For(Duration::from_secs(5));
    assert_eq!(Wait::Default.resolve(configured), configured);
}

#[test]
fn explicit_wait_overrides_configured_value() {
    let configured = Wait::For(Duration::from_secs(5));
    assert_eq!(Wait::NoWait.resolve(configured), Wait::NoWait);
    assert_eq!(Wait::Forever.resolve(configured), Wait::Forever);
}

#[test]
fn default_lease_defers_to_configured_value() {
    let configured = Lease::UntilUnlocked;
    assert_eq!(Lease::Default.resolve(configured), configured);
}

#[test]
fn wait_window_encodes_provider_semantics() {
    assert_eq!(Wait::NoWait.window(), Some(Duration::ZERO));
    assert_eq!(Wait::Forever.window(), None);
    assert_eq!(
        Wait::For(Duration::from_secs(3)).window(),
        Some(Duration::from_secs(3))
    );
}

#[test]
fn lease_term_encodes_provider_semantics() {
    assert_eq!(Lease::UntilUnlocked.term(), None);
    assert_eq!(
        Lease::For(Duration::from_secs(7)).term(),
        Some(Duration::from_secs(7))
    );
}

#[test]
fn unresolved_defaults_fall_back_to_global_values() {
    assert_eq!(Wait::Default.window(), Some(DEFAULT_WAIT));
    assert_eq!(Lease::Default.term(), Some(DEFAULT_LEASE));
}

#[test]
fn new_service_config_uses_global_defaults() {
    let config = LockServiceConfig::new("orders");

    assert_eq!(config.name, "orders");
    assert_eq!(config.wait, Wait::For(DEFAULT_WAIT));
    assert_eq!(config.lease, Lease::For(DEFAULT_LEASE));
}

#[test]
fn service_config_builders_override_defaults() {
    let config = LockServiceConfig::new("orders")
        .with_wait(Wait::NoWait)
        .with_lease(Lease::For(Duration::from_secs(1)));

    assert_eq!(config.wait, Wait::NoWait);
    assert_eq!(config.lease, Lease::For(Duration::from_secs(1)));
}

#[test]
fn lock_key_conversions() {
    let from_str: LockKey = "tick-serie".into();
    let from_string: LockKey = String::from("tick-serie").into();

    assert_eq!(from_str, from_string);
    assert_eq!(from_str.to_string(), "tick-serie");
}
