/*!
 * Synchronization Configuration
 *
 * Runtime configuration for wait strategy selection
 */

use crate::limits::{
    DEFAULT_MAX_SPINS, DEFAULT_POLL_INTERVAL, DEFAULT_SPIN_DURATION, WAIT_STRATEGY_ENV,
};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Strategy type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyType {
    /// Futex-style parking (parking_lot_core), fastest
    Futex,
    /// Condvar-based (cross-platform, reliable)
    Condvar,
    /// Adaptive spin then park (low-latency, high-CPU for short waits)
    #[serde(alias = "spin")]
    SpinWait,
    /// Fixed-interval sleep polling, no wake events
    Poll,
    /// Auto-select based on platform
    Auto,
}

/// Unknown strategy name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown wait strategy '{0}' (expected futex, condvar, spin, poll or auto)")]
pub struct ParseStrategyError(pub String);

impl FromStr for StrategyType {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "futex" => Ok(StrategyType::Futex),
            "condvar" => Ok(StrategyType::Condvar),
            "spin" | "spinwait" => Ok(StrategyType::SpinWait),
            "poll" => Ok(StrategyType::Poll),
            "auto" => Ok(StrategyType::Auto),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyType::Futex => "futex",
            StrategyType::Condvar => "condvar",
            StrategyType::SpinWait => "spin",
            StrategyType::Poll => "poll",
            StrategyType::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Preferred strategy
    pub strategy: StrategyType,
    /// Spin duration before parking (for SpinWait)
    pub spin_duration: Duration,
    /// Maximum spin iterations before parking (for SpinWait)
    pub max_spins: u32,
    /// Sleep between condition checks (for Poll)
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyType::Auto,
            spin_duration: DEFAULT_SPIN_DURATION,
            max_spins: DEFAULT_MAX_SPINS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SyncConfig {
    /// Configuration optimized for low-latency (< 1ms wait expected)
    pub const fn low_latency() -> Self {
        Self {
            strategy: StrategyType::SpinWait,
            spin_duration: Duration::from_micros(50),
            max_spins: 500,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Configuration optimized for long waits (> 1ms expected)
    pub const fn long_wait() -> Self {
        Self {
            strategy: StrategyType::Auto,
            spin_duration: Duration::from_micros(1),
            max_spins: 10,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Fixed-interval polling: release, sleep, re-check
    pub const fn polling(interval: Duration) -> Self {
        Self {
            strategy: StrategyType::Poll,
            spin_duration: DEFAULT_SPIN_DURATION,
            max_spins: DEFAULT_MAX_SPINS,
            poll_interval: interval,
        }
    }

    /// Default configuration with the strategy taken from `RTL_SYNC_WAIT_STRATEGY`
    ///
    /// Unset or unparsable values fall back to `Auto`.
    pub fn from_env() -> Self {
        let strategy = match std::env::var(WAIT_STRATEGY_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|err: ParseStrategyError| {
                warn!(error = %err, "Ignoring {}", WAIT_STRATEGY_ENV);
                StrategyType::Auto
            }),
            Err(_) => StrategyType::Auto,
        };

        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Select best strategy for current platform
    pub fn select_strategy(&self) -> StrategyType {
        match self.strategy {
            StrategyType::Auto => {
                // Prefer futex on Linux, condvar elsewhere
                #[cfg(target_os = "linux")]
                {
                    StrategyType::Futex
                }
                #[cfg(not(target_os = "linux"))]
                {
                    StrategyType::Condvar
                }
            }
            other => other,
        }
    }
}
