/*!
 * Shared helpers for the synchronization tests
 */

use rtl_sync::{StrategyType, SyncConfig};
use std::time::Duration;

/// One configuration per concrete wait strategy
pub fn every_strategy() -> Vec<SyncConfig> {
    vec![
        SyncConfig {
            strategy: StrategyType::Futex,
            ..Default::default()
        },
        SyncConfig {
            strategy: StrategyType::Condvar,
            ..Default::default()
        },
        SyncConfig::low_latency(),
        SyncConfig::polling(Duration::from_millis(1)),
    ]
}
