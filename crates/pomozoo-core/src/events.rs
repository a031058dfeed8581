use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::Rarity;
use crate::remote::AuthStatus;
use crate::timer::TimerMode;

/// Every state change in the system produces an Event.
/// The front-end renders them; nothing else subscribes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        time_left: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        time_left: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        time_left: u64,
        at: DateTime<Utc>,
    },
    /// Countdown abandoned; time restored, nothing awarded.
    TimerStopped {
        mode: TimerMode,
        time_left: u64,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: TimerMode,
        to: TimerMode,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        cycle_count: u32,
        /// Whether the next countdown started on its own.
        auto_started: bool,
        at: DateTime<Utc>,
    },
    AnimalAwarded {
        animal_id: String,
        rarity: Rarity,
        /// First copy of this animal in the collection.
        first_time: bool,
        at: DateTime<Utc>,
    },
    StudyRecorded {
        date: NaiveDate,
        category: String,
        minutes: u32,
        at: DateTime<Utc>,
    },
    BreakRecorded {
        date: NaiveDate,
        category: String,
        minutes: u32,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        at: DateTime<Utc>,
    },
    PresetCreated {
        preset_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    PresetRenamed {
        preset_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    /// Preset now holds a new set of settings.
    PresetUpdated {
        preset_id: String,
        at: DateTime<Utc>,
    },
    PresetDeleted {
        preset_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    PresetApplied {
        preset_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    AnimalsSeen {
        animal_ids: Vec<String>,
        at: DateTime<Utc>,
    },
    SessionSpritesCleared {
        count: usize,
        at: DateTime<Utc>,
    },
    ChecklistItemAdded {
        date: NaiveDate,
        item_id: String,
        at: DateTime<Utc>,
    },
    ChecklistItemToggled {
        date: NaiveDate,
        item_id: String,
        done: bool,
        at: DateTime<Utc>,
    },
    ChecklistItemRemoved {
        date: NaiveDate,
        item_id: String,
        at: DateTime<Utc>,
    },
    /// Remote daily stats folded into the local ones, newest copy per day.
    StatsMerged {
        pulled: Vec<NaiveDate>,
        kept_newer: Vec<NaiveDate>,
        unchanged: Vec<NaiveDate>,
        at: DateTime<Utc>,
    },
    AuthChanged {
        status: AuthStatus,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        time_left: u64,
        /// Share of the current countdown already elapsed, 0.0 to 1.0.
        progress: f64,
        is_running: bool,
        is_paused: bool,
        cycle_count: u32,
        collected_count: usize,
        active_sprites: usize,
        today_study_minutes: u32,
        at: DateTime<Utc>,
    },
}
