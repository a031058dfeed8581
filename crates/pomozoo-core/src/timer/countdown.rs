//! Countdown state machine.
//!
//! The countdown has no clock of its own. Each call to [`TimerState::tick`]
//! consumes exactly one second; [`super::TimerEngine`] supplies the ticks.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |  \
//!           |   stop -> Idle (time reset, no reward)
//!           v
//!        Completed -> next mode (Idle, or Running if auto-start)
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::TimerMode;
use crate::events::Event;
use crate::settings::Settings;

/// Snapshot of the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    mode: TimerMode,
    /// Seconds left in the current countdown.
    time_left: u64,
    is_running: bool,
    is_paused: bool,
    /// Completed study intervals since the cycle began.
    cycle_count: u32,
}

/// What a finished countdown produced. The caller turns this into rewards
/// and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub finished: TimerMode,
    pub next: TimerMode,
    /// Length of the finished countdown, in minutes.
    pub minutes: u32,
    pub cycle_count: u32,
}

impl TimerState {
    /// Idle study countdown at full length.
    pub fn new(settings: &Settings) -> Self {
        Self {
            mode: TimerMode::Study,
            time_left: TimerMode::Study.duration_secs(settings),
            is_running: false,
            is_paused: false,
            cycle_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// Running and not paused.
    pub fn is_counting(&self) -> bool {
        self.is_running && !self.is_paused
    }

    /// 0.0 .. 1.0 progress within the current countdown.
    pub fn progress(&self, settings: &Settings) -> f64 {
        let total = self.mode.duration_secs(settings);
        if total == 0 {
            return 0.0;
        }
        (1.0 - (self.time_left as f64 / total as f64)).clamp(0.0, 1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running {
            return if self.is_paused { self.resume() } else { None };
        }
        self.is_running = true;
        self.is_paused = false;
        Some(Event::TimerStarted {
            mode: self.mode,
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_counting() {
            return None;
        }
        self.is_paused = true;
        Some(Event::TimerPaused {
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if !(self.is_running && self.is_paused) {
            return None;
        }
        self.is_paused = false;
        Some(Event::TimerResumed {
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    /// Abandon the countdown: full time restored, nothing awarded.
    pub fn stop(&mut self, settings: &Settings) -> Option<Event> {
        let full = self.mode.duration_secs(settings);
        if !self.is_running && self.time_left == full {
            return None;
        }
        self.is_running = false;
        self.is_paused = false;
        self.time_left = full;
        Some(Event::TimerStopped {
            mode: self.mode,
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    /// Jump to the following mode without completing the current one.
    /// Skipped studies do not count toward the long-break interval.
    pub fn skip(&mut self, settings: &Settings) -> Option<Event> {
        let from = self.mode;
        let to = match from {
            TimerMode::Study => TimerMode::ShortBreak,
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Study,
        };
        self.mode = to;
        self.time_left = to.duration_secs(settings);
        self.is_running = false;
        self.is_paused = false;
        Some(Event::TimerSkipped {
            from,
            to,
            at: Utc::now(),
        })
    }

    /// Consume one second. Returns `Some` when the countdown finishes.
    pub fn tick(&mut self, settings: &Settings) -> Option<Completion> {
        if !self.is_counting() {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return None;
        }
        Some(self.complete(settings))
    }

    /// Settings changed: an idle countdown picks up the new length, a live
    /// one keeps counting down what it had.
    pub fn apply_settings(&mut self, settings: &Settings) {
        if !self.is_running {
            self.time_left = self.mode.duration_secs(settings);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, settings: &Settings) -> Completion {
        let finished = self.mode;
        if finished == TimerMode::Study {
            self.cycle_count += 1;
        }
        let next = finished.next(self.cycle_count, settings.long_break_interval);
        self.mode = next;
        self.time_left = next.duration_secs(settings);
        self.is_paused = false;
        self.is_running = if next.is_break() {
            settings.auto_start_breaks
        } else {
            settings.auto_start_study
        };
        Completion {
            finished,
            next,
            minutes: finished.duration_min(settings),
            cycle_count: self.cycle_count,
        }
    }
}
