//! # Pomozoo Core Library
//!
//! Core logic for Pomozoo, a Pomodoro timer that rewards finished study
//! intervals with animals for a collectible zoo. Everything the app can do
//! is reachable from the standalone CLI; a UI is a thin layer over the same
//! [`StateHolder`].
//!
//! ## Architecture
//!
//! - **Timer**: a countdown state machine advanced by explicit ticks, plus an
//!   async [`TimerEngine`] that feeds it one tick per second
//! - **State**: [`AppState`] and the [`StateHolder`] that applies [`Action`]s
//!   and returns [`Event`]s
//! - **Collection / Stats**: animal rewards, per-day study minutes and a
//!   last-writer-wins merge
//! - **Storage**: JSON blobs in a SQLite key-value table and TOML config
//! - **Remote**: REST client for the managed backend (auth, rooms, habit
//!   summaries) and daily-stats sync

pub mod collection;
pub mod error;
pub mod events;
pub mod focus_guard;
pub mod keypath;
pub mod remote;
pub mod settings;
pub mod state;
pub mod stats;
pub mod storage;
pub mod timer;

pub use collection::{Animal, Catalog, CollectedAnimal, Rarity};
pub use error::{ConfigError, CoreError, RemoteError, StorageError, ValidationError};
pub use events::Event;
pub use focus_guard::{FocusGuard, GuardDecision};
pub use remote::{AuthStatus, BackendClient, HabitSummary, Session, SyncReport};
pub use settings::{PresetBook, Settings, WorkPreset};
pub use state::{Action, AppState, StateHolder};
pub use stats::{DailyStat, DailyStats, MergeDecision};
pub use storage::{AppConfig, LocalStore, MemoryStore, SqliteStore};
pub use timer::{TimerEngine, TimerMode, TimerState};
