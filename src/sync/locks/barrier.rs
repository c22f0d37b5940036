/*!
 * Cyclic Barrier
 *
 * N-way rendezvous that resets itself after every trip. Each trip bumps
 * `generation` by exactly one and zeroes `count` in the same critical
 * section; waiters sleep until the generation they arrived in has passed,
 * so a fast thread re-entering `wait` cannot be confused with the
 * previous round.
 */

use super::mutex::Mutex;
use crate::errors::{SyncError, SyncResult};
use crate::sync::atomic::AtomicCounter;
use crate::sync::wait::{SyncConfig, WaitQueue};
use std::fmt;
use tracing::{debug, trace};

/// Outcome of `Barrier::wait`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    generation: isize,
}

impl BarrierWaitResult {
    /// True for exactly one participant per trip: the last to arrive
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Generation this participant arrived in
    pub fn generation(&self) -> isize {
        self.generation
    }
}

/// Reusable barrier for a fixed number of participants
///
/// # Examples
///
/// ```
/// use rtl_sync::Barrier;
/// use std::sync::Arc;
/// use std::thread;
///
/// let barrier = Arc::new(Barrier::new(3).unwrap());
/// let handles: Vec<_> = (0..3)
///     .map(|_| {
///         let barrier = barrier.clone();
///         thread::spawn(move || barrier.wait().is_leader())
///     })
///     .collect();
///
/// let leaders = handles
///     .into_iter()
///     .map(|h| h.join().unwrap())
///     .filter(|leader| *leader)
///     .count();
/// assert_eq!(leaders, 1);
/// assert_eq!(barrier.generation(), 1);
/// ```
pub struct Barrier {
    entry: Mutex<()>,
    expected: isize,
    count: AtomicCounter,
    generation: AtomicCounter,
    waiters: WaitQueue,
}

impl Barrier {
    /// Barrier for `participants` threads with the default wait configuration
    pub fn new(participants: usize) -> SyncResult<Self> {
        Self::with_config(participants, SyncConfig::default())
    }

    pub fn with_config(participants: usize, config: SyncConfig) -> SyncResult<Self> {
        if participants == 0 {
            return Err(SyncError::ZeroParticipants);
        }
        let expected =
            isize::try_from(participants).map_err(|_| SyncError::TooManyParticipants {
                participants,
            })?;

        let waiters = WaitQueue::new(config);
        debug!(
            participants,
            strategy = waiters.strategy_name(),
            "Barrier created"
        );

        Ok(Self {
            entry: Mutex::new(()),
            expected,
            count: AtomicCounter::new(0),
            generation: AtomicCounter::new(0),
            waiters,
        })
    }

    /// Block until all participants of the current generation have arrived
    pub fn wait(&self) -> BarrierWaitResult {
        let entry = self.entry.lock();
        let generation = self.generation.load();
        let arrived = self.count.fetch_add(1) + 1;

        if arrived == self.expected {
            self.count.store(0);
            self.generation.store(generation + 1);
            drop(entry);

            trace!(generation, participants = self.expected, "Barrier tripped");
            self.waiters.notify_all();

            return BarrierWaitResult {
                leader: true,
                generation,
            };
        }
        drop(entry);

        self.waiters
            .block_while(|| self.generation.load() == generation);

        BarrierWaitResult {
            leader: false,
            generation,
        }
    }

    /// Completed trips so far
    pub fn generation(&self) -> isize {
        self.generation.load()
    }

    /// Participants waiting in the current generation
    pub fn arrived(&self) -> usize {
        self.count.load().max(0) as usize
    }

    pub fn expected(&self) -> usize {
        self.expected as usize
    }

    pub fn strategy_name(&self) -> &'static str {
        self.waiters.strategy_name()
    }
}

impl fmt::Debug for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Barrier")
            .field("expected", &self.expected)
            .field("arrived", &self.arrived())
            .field("generation", &self.generation())
            .finish()
    }
}
