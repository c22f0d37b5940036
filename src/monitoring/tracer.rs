/*!
 * Structured Tracing
 * Subscriber setup and timed spans for stress scenarios
 *
 * Environment variables:
 * - RUST_LOG: Set log level (default: info)
 * - RTL_SYNC_TRACE_JSON: Enable JSON output (default: false)
 */

use crate::limits::TRACE_JSON_ENV;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Scenarios slower than this are reported at warn level
const SLOW_SCENARIO: Duration = Duration::from_secs(5);

/// Initialize the global tracing subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place and return false.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Tracing initialized");
    }
    installed
}

/// Span covering one stress scenario; logs its duration on drop
pub struct ScenarioSpan {
    span: Span,
    start: Instant,
    name: &'static str,
}

impl ScenarioSpan {
    pub fn new(name: &'static str, strategy: &str) -> Self {
        let span = span!(
            Level::INFO,
            "scenario",
            scenario = name,
            strategy = strategy,
            items_processed = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        let _entered = span.enter();
        debug!(scenario = name, strategy, "scenario started");
        drop(_entered);

        Self {
            span,
            start: Instant::now(),
            name,
        }
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn record_items_processed(&self, count: usize) {
        self.span.record("items_processed", count);
    }

    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "failure" });
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "failure");
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScenarioSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration > SLOW_SCENARIO {
            warn!(
                scenario = self.name,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow scenario"
            );
        } else {
            debug!(
                scenario = self.name,
                duration_us = duration.as_micros() as u64,
                "scenario completed"
            );
        }
    }
}
