use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// The three countdown kinds of the study cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Study,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn duration_min(self, settings: &Settings) -> u32 {
        match self {
            TimerMode::Study => settings.study_minutes,
            TimerMode::ShortBreak => settings.short_break_minutes,
            TimerMode::LongBreak => settings.long_break_minutes,
        }
    }

    pub fn duration_secs(self, settings: &Settings) -> u64 {
        u64::from(self.duration_min(settings)) * 60
    }

    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Study)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Study => "Study",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    /// Mode that follows a completed countdown of `self`.
    ///
    /// `completed_cycles` is the study count *after* the completion, so every
    /// `long_break_interval`-th study ends in a long break.
    pub fn next(self, completed_cycles: u32, long_break_interval: u32) -> TimerMode {
        match self {
            TimerMode::Study => {
                let interval = long_break_interval.max(1);
                if completed_cycles > 0 && completed_cycles % interval == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Study,
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
