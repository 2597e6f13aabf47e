use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::TimeSource;

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic time source reporting Unix milliseconds.
///
/// The wall clock is sampled once at construction; afterwards time advances
/// from a monotonic timer (`Instant`), so NTP or manual clock adjustments
/// never make it go backward. Generators driven by this clock cannot observe
/// a clock rollback within one process, at the cost of drifting from the
/// wall clock if the system time is corrected later.
///
/// Clones share a single ticker thread, which stops once the last clone is
/// dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    origin_millis: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock anchored at the current wall-clock time.
    ///
    /// A background thread updates a shared atomic counter once per
    /// millisecond with the time elapsed since construction. Reads add that
    /// counter to the wall-clock instant captured here, so the hot path never
    /// performs a syscall.
    ///
    /// # Example
    ///
    /// ```
    /// use nodeflake::{EPOCH, MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let first = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(2));
    ///
    /// assert!(first > EPOCH);
    /// assert!(clock.current_millis() >= first);
    /// ```
    pub fn new() -> Self {
        let start = Instant::now();
        let origin_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Align to the next tick after the actual time
                tick = now_ms + 1;
            }
        });

        // Freshly created, so the cell is always empty here.
        let _ = inner._handle.set(handle);

        Self {
            inner,
            origin_millis,
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.origin_millis + self.inner.current.load(Ordering::Relaxed)
    }
}
