/*!
 * Configuration Tests
 * Strategy parsing and environment selection
 */

use pretty_assertions::assert_eq;
use rtl_sync::limits::WAIT_STRATEGY_ENV;
use rtl_sync::sync::{StrategyType, SyncConfig, WaitQueue};
use serial_test::serial;
use std::time::Duration;

#[test]
fn test_parse_names() {
    assert_eq!("futex".parse(), Ok(StrategyType::Futex));
    assert_eq!("Condvar".parse(), Ok(StrategyType::Condvar));
    assert_eq!("spin".parse(), Ok(StrategyType::SpinWait));
    assert_eq!(" poll ".parse(), Ok(StrategyType::Poll));
    assert_eq!("auto".parse(), Ok(StrategyType::Auto));
    assert!("busy".parse::<StrategyType>().is_err());
}

#[test]
fn test_display_round_trips_through_parse() {
    for strategy in [
        StrategyType::Futex,
        StrategyType::Condvar,
        StrategyType::SpinWait,
        StrategyType::Poll,
        StrategyType::Auto,
    ] {
        assert_eq!(strategy.to_string().parse(), Ok(strategy));
    }
}

#[test]
fn test_polling_preset() {
    let config = SyncConfig::polling(Duration::from_millis(3));
    assert_eq!(config.strategy, StrategyType::Poll);
    assert_eq!(config.poll_interval, Duration::from_millis(3));
    assert_eq!(WaitQueue::new(config).strategy_name(), "poll");
}

#[test]
fn test_auto_resolves_to_concrete_strategy() {
    let selected = SyncConfig::default().select_strategy();
    assert_ne!(selected, StrategyType::Auto);
}

#[test]
#[serial]
fn test_from_env_selects_strategy() {
    std::env::set_var(WAIT_STRATEGY_ENV, "condvar");
    assert_eq!(SyncConfig::from_env().strategy, StrategyType::Condvar);

    std::env::set_var(WAIT_STRATEGY_ENV, "poll");
    assert_eq!(SyncConfig::from_env().strategy, StrategyType::Poll);

    std::env::remove_var(WAIT_STRATEGY_ENV);
}

#[test]
#[serial]
fn test_from_env_falls_back_to_auto() {
    std::env::set_var(WAIT_STRATEGY_ENV, "not-a-strategy");
    assert_eq!(SyncConfig::from_env().strategy, StrategyType::Auto);

    std::env::remove_var(WAIT_STRATEGY_ENV);
    assert_eq!(SyncConfig::from_env().strategy, StrategyType::Auto);
}
