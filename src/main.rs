/*!
 * rtl-sync stress runner
 *
 * Drives every primitive through the reference scenarios with tracing
 * enabled and prints a JSON summary. Exits non-zero if any check fails.
 *
 * Environment variables:
 * - RUST_LOG: log level (default: info)
 * - RTL_SYNC_TRACE_JSON: JSON log output
 * - RTL_SYNC_WAIT_STRATEGY: futex | condvar | spin | poll | auto
 */

use anyhow::{bail, ensure, Context, Result};
use rtl_sync::monitoring::{init_tracing, ScenarioSpan};
use rtl_sync::{
    AtomicCounter, Barrier, BoundedQueue, MpmcQueue, RwLock, SpscQueue, SyncConfig,
    TrackingAllocator,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Attempts a caller makes before giving up on a full or empty queue
const MAX_ATTEMPTS: usize = 10_000;

/// Pause between attempts
const RETRY_PAUSE: Duration = Duration::from_micros(100);

#[derive(Debug, Serialize)]
struct ScenarioReport {
    scenario: &'static str,
    strategy: String,
    items: usize,
    duration_us: u64,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    passed: usize,
    failed: usize,
    leaked_allocations: usize,
    scenarios: Vec<ScenarioReport>,
}

fn main() -> Result<()> {
    init_tracing();

    let config = SyncConfig::from_env();
    let strategy = config.select_strategy().to_string();
    info!(strategy = %strategy, "rtl-sync stress runner starting");

    let tracker = Arc::new(TrackingAllocator::new());

    type Scenario = fn(&SyncConfig, &Arc<TrackingAllocator>) -> Result<usize>;
    let scenarios: [(&'static str, Scenario); 6] = [
        ("bounded_sequential", bounded_sequential),
        ("bounded_producers_consumers", bounded_producers_consumers),
        ("rwlock_readers_writers", rwlock_readers_writers),
        ("barrier_phases", barrier_phases),
        ("spsc_ordered", spsc_ordered),
        ("mpmc_no_loss", mpmc_no_loss),
    ];

    let mut reports = Vec::with_capacity(scenarios.len());
    for (name, run) in scenarios {
        let span = ScenarioSpan::new(name, &strategy);
        let outcome = {
            let _entered = span.enter();
            run(&config, &tracker)
        };

        let report = match outcome {
            Ok(items) => {
                span.record_items_processed(items);
                span.record_result(true);
                info!(scenario = name, items, "scenario passed");
                ScenarioReport {
                    scenario: name,
                    strategy: strategy.clone(),
                    items,
                    duration_us: span.elapsed().as_micros() as u64,
                    passed: true,
                    error: None,
                }
            }
            Err(err) => {
                let message = format!("{err:#}");
                span.record_error(&message);
                error!(scenario = name, error = %message, "scenario failed");
                ScenarioReport {
                    scenario: name,
                    strategy: strategy.clone(),
                    items: 0,
                    duration_us: span.elapsed().as_micros() as u64,
                    passed: false,
                    error: Some(message),
                }
            }
        };
        reports.push(report);
    }

    let leaked_allocations = tracker.report_leaks();
    let failed = reports.iter().filter(|r| !r.passed).count();
    let summary = Summary {
        passed: reports.len() - failed,
        failed,
        leaked_allocations,
        scenarios: reports,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
    );

    if failed > 0 || leaked_allocations > 0 {
        bail!("{failed} scenario(s) failed, {leaked_allocations} allocation(s) leaked");
    }
    info!("All scenarios passed");
    Ok(())
}

/// Retry `attempt` until it yields a value or the attempt budget runs out
fn retry<T>(mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    for _ in 0..MAX_ATTEMPTS {
        if let Some(value) = attempt() {
            return Some(value);
        }
        thread::sleep(RETRY_PAUSE);
    }
    None
}

/// Dequeue with retries until an item arrives or all `total` items are taken
fn next_item<T>(
    mut dequeue: impl FnMut() -> Option<T>,
    consumed: &AtomicCounter,
    total: usize,
) -> Option<T> {
    retry(|| {
        if consumed.load() >= total as isize {
            return Some(None);
        }
        let item = dequeue()?;
        consumed.fetch_add(1);
        Some(Some(item))
    })
    .flatten()
}

/// Capacity 3: three enqueues fit, the fourth is refused, FIFO on the way out
fn bounded_sequential(_config: &SyncConfig, tracker: &Arc<TrackingAllocator>) -> Result<usize> {
    let queue = BoundedQueue::with_allocator(3, tracker.clone())?;

    for item in 1..=3 {
        ensure!(queue.try_enqueue(item).is_ok(), "enqueue {item} refused");
    }
    ensure!(queue.try_enqueue(4).is_err(), "enqueue into full queue accepted");

    for expected in 1..=3 {
        let got = queue.try_dequeue();
        ensure!(got == Some(expected), "expected {expected}, got {got:?}");
    }
    ensure!(queue.try_dequeue().is_none(), "dequeue from empty queue succeeded");
    Ok(3)
}

/// 3 producers x 50 items into capacity 100, drained by 2 consumers
fn bounded_producers_consumers(
    _config: &SyncConfig,
    tracker: &Arc<TrackingAllocator>,
) -> Result<usize> {
    const PRODUCERS: usize = 3;
    const PER_PRODUCER: usize = 50;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = BoundedQueue::with_allocator(100, tracker.clone())?;
    let consumed = AtomicCounter::new(0);

    let seen = thread::scope(|s| -> Result<HashSet<usize>> {
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let queue = &queue;
                s.spawn(move || -> Result<()> {
                    for i in 0..PER_PRODUCER {
                        let mut item = Some(p * PER_PRODUCER + i);
                        retry(|| match queue.try_enqueue(item.take()?) {
                            Ok(()) => Some(()),
                            Err(full) => {
                                item = Some(full.into_inner());
                                None
                            }
                        })
                        .context("producer gave up on a full queue")?;
                    }
                    Ok(())
                })
            })
            .collect();

        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let (queue, consumed) = (&queue, &consumed);
                s.spawn(move || {
                    let mut got = Vec::new();
                    while let Some(item) = next_item(|| queue.try_dequeue(), consumed, TOTAL) {
                        got.push(item);
                    }
                    got
                })
            })
            .collect();

        for producer in producers {
            producer
                .join()
                .map_err(|_| anyhow::anyhow!("producer panicked"))??;
        }

        let mut seen = HashSet::with_capacity(TOTAL);
        for consumer in consumers {
            let items = consumer
                .join()
                .map_err(|_| anyhow::anyhow!("consumer panicked"))?;
            for item in items {
                ensure!(seen.insert(item), "item {item} consumed twice");
            }
        }
        Ok(seen)
    })?;

    ensure!(seen.len() == TOTAL, "consumed {} of {TOTAL}", seen.len());
    Ok(TOTAL)
}

/// 8 readers x 20 ops against 2 writers x 5 ops; the lock must end idle
fn rwlock_readers_writers(config: &SyncConfig, _tracker: &Arc<TrackingAllocator>) -> Result<usize> {
    let lock = RwLock::with_config(0usize, config.clone());
    let violations = AtomicCounter::new(0);

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..20 {
                    let _guard = lock.read();
                    if lock.state().writer_active != 0 {
                        violations.fetch_add(1);
                    }
                    thread::yield_now();
                }
            });
        }
        for _ in 0..2 {
            s.spawn(|| {
                for _ in 0..5 {
                    let mut guard = lock.write();
                    let state = lock.state();
                    if state.readers != 0 || state.writer_active != 1 {
                        violations.fetch_add(1);
                    }
                    *guard += 1;
                }
            });
        }
    });

    ensure!(violations.load() == 0, "{} exclusion violations", violations.load());
    let state = lock.state();
    ensure!(state.is_idle(), "lock not idle afterwards: {state:?}");
    let writes = lock.into_inner();
    ensure!(writes == 10, "expected 10 writes, saw {writes}");
    Ok(8 * 20 + 2 * 5)
}

/// 8 participants through two phases; generation must advance by 2
fn barrier_phases(config: &SyncConfig, _tracker: &Arc<TrackingAllocator>) -> Result<usize> {
    const PARTICIPANTS: usize = 8;

    let barrier = Barrier::with_config(PARTICIPANTS, config.clone())?;
    let phase_one = AtomicCounter::new(0);
    let early = AtomicCounter::new(0);

    thread::scope(|s| {
        for _ in 0..PARTICIPANTS {
            s.spawn(|| {
                phase_one.fetch_add(1);
                barrier.wait();
                if phase_one.load() != PARTICIPANTS as isize {
                    early.fetch_add(1);
                }
                barrier.wait();
            });
        }
    });

    ensure!(early.load() == 0, "{} threads left phase one early", early.load());
    ensure!(
        barrier.generation() == 2,
        "generation {} after two phases",
        barrier.generation()
    );
    Ok(PARTICIPANTS * 2)
}

/// One producer sends 0..99, the consumer must see exactly that sequence
fn spsc_ordered(_config: &SyncConfig, tracker: &Arc<TrackingAllocator>) -> Result<usize> {
    const ITEMS: usize = 100;

    let mut queue = SpscQueue::with_allocator(16, tracker.clone())?;
    let (mut producer, mut consumer) = queue.split();

    let received = thread::scope(|s| -> Result<Vec<usize>> {
        let sender = s.spawn(move || -> Result<()> {
            for i in 0..ITEMS {
                let mut item = Some(i);
                retry(|| match producer.try_enqueue(item.take()?) {
                    Ok(()) => Some(()),
                    Err(full) => {
                        item = Some(full.into_inner());
                        None
                    }
                })
                .context("SPSC producer gave up")?;
            }
            Ok(())
        });

        let mut received = Vec::with_capacity(ITEMS);
        while received.len() < ITEMS {
            match retry(|| consumer.try_dequeue()) {
                Some(item) => received.push(item),
                None => break,
            }
        }

        sender
            .join()
            .map_err(|_| anyhow::anyhow!("SPSC producer panicked"))??;
        Ok(received)
    })?;

    ensure!(
        received == (0..ITEMS).collect::<Vec<_>>(),
        "SPSC order broken: {received:?}"
    );
    Ok(ITEMS)
}

/// 4 producers and 4 consumers share a small ring; nothing lost or repeated
fn mpmc_no_loss(_config: &SyncConfig, tracker: &Arc<TrackingAllocator>) -> Result<usize> {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: usize = 1_000;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = MpmcQueue::with_allocator(64, tracker.clone())?;
    let consumed = AtomicCounter::new(0);

    let seen = thread::scope(|s| -> Result<HashSet<usize>> {
        for p in 0..PRODUCERS {
            let queue = &queue;
            s.spawn(move || {
                for i in 0..PER_PRODUCER {
                    let mut item = p * PER_PRODUCER + i;
                    while let Err(full) = queue.try_enqueue(item) {
                        item = full.into_inner();
                        thread::yield_now();
                    }
                }
            });
        }

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let (queue, consumed) = (&queue, &consumed);
                s.spawn(move || {
                    let mut got = Vec::new();
                    while let Some(item) = next_item(|| queue.try_dequeue(), consumed, TOTAL) {
                        got.push(item);
                    }
                    got
                })
            })
            .collect();

        let mut seen = HashSet::with_capacity(TOTAL);
        for consumer in consumers {
            let items = consumer
                .join()
                .map_err(|_| anyhow::anyhow!("consumer panicked"))?;
            for item in items {
                ensure!(seen.insert(item), "item {item} dequeued twice");
            }
        }
        Ok(seen)
    })?;

    ensure!(seen.len() == TOTAL, "dequeued {} of {TOTAL}", seen.len());
    Ok(TOTAL)
}
