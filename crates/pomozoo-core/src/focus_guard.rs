//! Distraction blocking during study countdowns.
//!
//! The guard only decides; enforcing the decision (overlay, kill, notify) is
//! left to the platform shell.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::timer::{TimerMode, TimerState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum GuardDecision {
    Allow,
    Block { app_id: String, reason: String },
}

impl GuardDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GuardDecision::Block { .. })
    }
}

pub struct FocusGuard;

impl FocusGuard {
    /// Whether the guard is armed right now: enabled, in a study countdown,
    /// and actually counting down.
    pub fn is_active(timer: &TimerState, settings: &Settings) -> bool {
        settings.focus_guard_enabled && timer.mode() == TimerMode::Study && timer.is_counting()
    }

    /// Decide for a foreground app id. Ids compare case-insensitively.
    pub fn decide(timer: &TimerState, settings: &Settings, app_id: &str) -> GuardDecision {
        if !Self::is_active(timer, settings) {
            return GuardDecision::Allow;
        }
        let listed = settings
            .blocked_apps
            .iter()
            .any(|blocked| blocked.trim().eq_ignore_ascii_case(app_id.trim()));
        if !listed {
            return GuardDecision::Allow;
        }
        GuardDecision::Block {
            app_id: app_id.to_string(),
            reason: format!(
                "{} blocked during study ({} min left)",
                app_id,
                timer.time_left().div_ceil(60)
            ),
        }
    }
}
