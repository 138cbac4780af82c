//! Search control — stop flag and wall-clock deadline.
//!
//! The UCI front-end and the search worker share one atomic stop flag.
//! The front-end sets it on `stop`/`quit` (release store); the worker
//! reads it on entry to every node (acquire load). An optional deadline
//! latches the same flag when the time budget runs out, so a fired clock
//! behaves exactly like an external stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Decides when a running search must abort.
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    deadline: Option<Instant>,
    start: Instant,
}

impl SearchControl {
    /// Control for `go infinite` or depth-limited searches: only the
    /// external stop flag can end them.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            deadline: None,
            start: Instant::now(),
        }
    }

    /// Control with a wall-clock budget; the clock starts immediately.
    pub fn new_timed(stopped: Arc<AtomicBool>, budget: Duration) -> Self {
        let start = Instant::now();
        Self {
            stopped,
            deadline: Some(start + budget),
            start,
        }
    }

    /// Whether the search must abort.
    ///
    /// The stop flag is consulted on every call; the deadline only every
    /// 2048 nodes to keep clock reads off the hot path. A fired deadline
    /// latches the stop flag so subsequent calls return without looking
    /// at the clock again.
    pub fn halted(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            return true;
        }

        if nodes & 2047 != 0 {
            return false;
        }

        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.stopped.store(true, Ordering::Release);
            return true;
        }

        false
    }

    /// Time since this control was created (search start).
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Reference to the shared stop flag.
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}
