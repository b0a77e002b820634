use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Time source used by pollers and retry backoff.
///
/// Every wait in the workflow is a literal sleep on the calling thread, so
/// swapping the clock is the only seam needed to drive pollers in tests.
pub trait PollClock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall-clock implementation backed by `std::thread::sleep`.
pub struct SystemClock;

impl PollClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Instant at which a wait window closes.
///
/// A window too long to represent as an `Instant` never closes.
pub struct PollDeadline(Option<Instant>);

impl PollDeadline {
    pub fn after(clock: &dyn PollClock, window: Duration) -> Self {
        Self(clock.now().checked_add(window))
    }

    pub fn is_unbounded(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_reached(&self, clock: &dyn PollClock) -> bool {
        self.0.is_some_and(|at| clock.now() >= at)
    }
}

#[derive(Debug)]
/// Virtual clock that advances only when `sleep` is called.
pub struct ManualClock {
    origin: Instant,
    elapsed_ms: AtomicU64,
    sleeps: AtomicU64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_ms: AtomicU64::new(0),
            sleeps: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }

    /// Number of `sleep` calls observed so far.
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl PollClock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.advance(duration);
    }
}
