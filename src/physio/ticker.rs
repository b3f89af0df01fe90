//! Recurring one-second tick on a background thread.
//!
//! The thread owns a clone of the cancellation flag and checks it in small
//! sleep steps, so `cancel()` returns promptly. Dropping a [`Ticker`] cancels
//! and joins it; a ticker never outlives its owner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Sleep granularity for cancellation responsiveness.
const SLEEP_GRANULARITY: Duration = Duration::from_millis(20);

pub struct Ticker {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Call `on_tick` every `interval` until cancelled.
    pub fn start<F>(interval: Duration, on_tick: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = std::thread::spawn(move || {
            let mut next = Instant::now() + interval;
            while !flag.load(Ordering::Relaxed) {
                let now = Instant::now();
                if now >= next {
                    on_tick();
                    next += interval;
                    continue;
                }
                std::thread::sleep((next - now).min(SLEEP_GRANULARITY));
            }
        });

        Self {
            cancelled,
            handle: Some(handle),
        }
    }

    /// Revoke the ticker and wait for its thread. Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                tracing::warn!("Session ticker thread panicked");
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
