//! Stopwatch for one exercise at a time.
//!
//! `Idle --start--> Running --tick--> Running --stop--> Idle`. Stopping a
//! session that ran for at least one second appends a [`SessionEntry`] to
//! the user's log with the duration rounded up to whole minutes.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use super::log::SessionLog;
use crate::dates;
use crate::models::{minutes_rounded_up, SessionEntry};
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
}

/// How elapsed time advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// A background ticker adds one second per interval.
    Automatic(Duration),
    /// Only explicit `tick()` calls advance the clock.
    Manual,
}

#[derive(Debug)]
struct TimerState {
    status: TimerStatus,
    exercise: Option<String>,
    elapsed_secs: u64,
}

impl TimerState {
    fn idle() -> Self {
        Self {
            status: TimerStatus::Idle,
            exercise: None,
            elapsed_secs: 0,
        }
    }

    fn tick(&mut self) {
        if self.status == TimerStatus::Running {
            self.elapsed_secs += 1;
        }
    }
}

/// Snapshot for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub exercise: Option<String>,
    pub elapsed_secs: u64,
    pub display: String,
}

pub struct SessionTracker {
    state: Arc<Mutex<TimerState>>,
    ticker: Option<super::ticker::Ticker>,
    mode: TickMode,
    log: SessionLog,
}

impl SessionTracker {
    /// Tracker with a one-second background ticker.
    pub fn new(log: SessionLog) -> Self {
        Self::with_mode(log, TickMode::Automatic(Duration::from_secs(1)))
    }

    pub fn with_mode(log: SessionLog, mode: TickMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::idle())),
            ticker: None,
            mode,
            log,
        }
    }

    /// Begin timing `exercise`. A session already running is discarded
    /// without being logged.
    pub fn start(&mut self, exercise: &str) {
        self.cancel_ticker();
        {
            let mut state = self.lock();
            if state.status == TimerStatus::Running {
                tracing::debug!(
                    previous = state.exercise.as_deref().unwrap_or_default(),
                    "Replacing running session"
                );
            }
            state.status = TimerStatus::Running;
            state.exercise = Some(exercise.to_string());
            state.elapsed_secs = 0;
        }

        if let TickMode::Automatic(interval) = self.mode {
            let state = self.state.clone();
            self.ticker = Some(super::ticker::Ticker::start(interval, move || {
                if let Ok(mut s) = state.lock() {
                    s.tick();
                }
            }));
        }
        tracing::info!(exercise = %exercise, "Session started");
    }

    /// Advance one second. Ignored while idle.
    pub fn tick(&self) {
        self.lock().tick();
    }

    /// End the session. Returns the logged entry, or None when idle or when
    /// no time elapsed.
    pub fn stop(&mut self) -> Result<Option<SessionEntry>, StoreError> {
        self.stop_at(dates::today(), dates::now_millis())
    }

    /// [`stop`](Self::stop) with an explicit clock.
    pub fn stop_at(&mut self, today: NaiveDate, timestamp_ms: i64) -> Result<Option<SessionEntry>, StoreError> {
        self.cancel_ticker();

        let (exercise, elapsed_secs) = {
            let mut state = self.lock();
            if state.status == TimerStatus::Idle {
                return Ok(None);
            }
            let finished = (state.exercise.take(), state.elapsed_secs);
            *state = TimerState::idle();
            finished
        };

        let Some(exercise) = exercise else {
            return Ok(None);
        };
        if elapsed_secs == 0 {
            tracing::debug!(exercise = %exercise, "Session stopped before first tick, not logged");
            return Ok(None);
        }

        let entry = SessionEntry {
            date: dates::format_day(today),
            exercise,
            duration: minutes_rounded_up(elapsed_secs),
            timestamp: timestamp_ms,
        };
        tracing::info!(
            exercise = %entry.exercise,
            duration_min = entry.duration,
            "Session complete"
        );
        self.log.append(entry.clone())?;
        Ok(Some(entry))
    }

    pub fn status(&self) -> TimerStatus {
        self.lock().status
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.lock().elapsed_secs
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let state = self.lock();
        TimerSnapshot {
            status: state.status,
            exercise: state.exercise.clone(),
            elapsed_secs: state.elapsed_secs,
            display: format_elapsed(state.elapsed_secs),
        }
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn has_active_ticker(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn cancel_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    // A poisoned lock only means a tick panicked mid-increment; the counter
    // itself is still usable.
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Stopwatch text, `m:ss`.
pub fn format_elapsed(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Confirmation shown after a session is logged.
pub fn completion_notice(entry: &SessionEntry) -> String {
    format!("Session Complete! Logged {} mins.", entry.duration)
}
