//! Periodic driver for the countdown.
//!
//! The countdown itself has no clock; this loop feeds it one
//! [`Action::Tick`] per period through the shared [`StateHolder`]. It ends
//! when the shutdown future resolves (the owning scope is going away) or
//! when the timer stops counting on its own.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = TimerEngine::new(holder.clone());
//! let exit = engine.run(tokio::signal::ctrl_c(), |event| println!("{event:?}")).await;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::events::Event;
use crate::state::{Action, StateHolder};

/// Why [`TimerEngine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineExit {
    /// The shutdown future resolved.
    Shutdown,
    /// The countdown was paused, stopped, or finished without auto-start.
    Idle,
}

pub struct TimerEngine {
    holder: Arc<Mutex<StateHolder>>,
    period: Duration,
}

impl TimerEngine {
    pub fn new(holder: Arc<Mutex<StateHolder>>) -> Self {
        Self {
            holder,
            period: Duration::from_secs(1),
        }
    }

    /// Tick period. One tick always counts as one second of countdown.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub async fn run<S, F>(&self, shutdown: S, mut on_event: F) -> EngineExit
    where
        S: Future,
        F: FnMut(&Event),
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately.
        interval.tick().await;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("timer loop shut down");
                    return EngineExit::Shutdown;
                }
                _ = interval.tick() => {
                    let mut holder = self.holder.lock().await;
                    if !holder.state().timer.is_counting() {
                        return EngineExit::Idle;
                    }
                    match holder.dispatch(Action::Tick) {
                        Ok(events) => events.iter().for_each(&mut on_event),
                        Err(e) => tracing::warn!(error = %e, "tick rejected"),
                    }
                    if !holder.state().timer.is_counting() {
                        return EngineExit::Idle;
                    }
                }
            }
        }
    }
}
