//! Interval Scheduler
//!
//! Fires an async callback at a fixed cadence. Every target is anchored to the
//! original baseline (`baseline + n * period`), so jitter in individual fires
//! never accumulates into drift. Callbacks run on the scheduler's own task and
//! never overlap; a callback that overruns its period causes the missed
//! targets to be skipped, not queued.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Timer state owned by the scheduler task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub period: Duration,
    pub next_fire: Instant,
    pub armed: bool,
}

impl ScheduleState {
    /// Arm the first fire one period after `baseline`
    pub fn new(period: Duration, baseline: Instant) -> Self {
        Self {
            period,
            next_fire: baseline + period,
            armed: true,
        }
    }

    /// Re-arm from the previous target, not from the time the fire happened
    pub fn advance(&mut self) {
        self.next_fire += self.period;
        self.armed = true;
    }

    /// Jump over targets already behind `now`. Returns how many were dropped.
    pub fn skip_missed(&mut self, now: Instant) -> u64 {
        let mut skipped = 0;
        while self.next_fire < now {
            self.next_fire += self.period;
            skipped += 1;
        }
        skipped
    }
}

/// Fire counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub fired: u64,
    pub skipped: u64,
}

struct Shared {
    state: Mutex<ScheduleState>,
    stopped: AtomicBool,
    wake: Notify,
    fired: AtomicU64,
    skipped: AtomicU64,
}

/// Handle to a running interval scheduler
pub struct IntervalScheduler {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl IntervalScheduler {
    /// Spawn the scheduling loop and arm the first fire at `now + period`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero. `AccountConfig::validate` rejects a zero
    /// `BOT.INTERVAL_MS` before the scheduler is built.
    pub fn new<F, Fut>(period: Duration, callback: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        assert!(!period.is_zero(), "scheduler period must be non-zero");

        let shared = Arc::new(Shared {
            state: Mutex::new(ScheduleState::new(period, Instant::now())),
            stopped: AtomicBool::new(false),
            wake: Notify::new(),
            fired: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        });

        debug!(period_ms = period.as_millis() as u64, "Interval scheduler armed");
        let task = tokio::spawn(run_loop(shared.clone(), callback));

        Self { shared, task }
    }

    /// Cancel any pending fire. Idempotent; a callback already running is
    /// allowed to finish, but nothing fires after it.
    ///
    /// The flag is set under the state lock, which the loop also holds while
    /// committing to a fire, so once `stop()` returns no new fire can begin.
    pub fn stop(&self) {
        let first = {
            let mut state = self.shared.state.lock();
            state.armed = false;
            !self.shared.stopped.swap(true, Ordering::SeqCst)
        };
        if first {
            info!("⏹️ Interval scheduler stopping");
        }
        self.shared.wake.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> ScheduleState {
        *self.shared.state.lock()
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            fired: self.shared.fired.load(Ordering::SeqCst),
            skipped: self.shared.skipped.load(Ordering::Relaxed),
        }
    }

    /// Wait for the loop to exit. A panicking callback surfaces here.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

async fn run_loop<F, Fut>(shared: Arc<Shared>, mut callback: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        let target = shared.state.lock().next_fire;

        tokio::select! {
            _ = sleep_until(target) => {}
            _ = shared.wake.notified() => {}
        }

        if shared.stopped.load(Ordering::SeqCst) {
            break;
        }
        if Instant::now() < target {
            // Stray wakeup
            continue;
        }

        {
            let mut state = shared.state.lock();
            if shared.stopped.load(Ordering::SeqCst) {
                break;
            }
            state.armed = false;
            state.advance();
            shared.fired.fetch_add(1, Ordering::SeqCst);
        }

        callback().await;

        let skipped = shared.state.lock().skip_missed(Instant::now());
        if skipped > 0 {
            shared.skipped.fetch_add(skipped, Ordering::Relaxed);
            warn!(skipped, "Callback overran its period, skipping missed fires");
        }
    }

    shared.state.lock().armed = false;
    debug!("Interval scheduler loop exited");
}
