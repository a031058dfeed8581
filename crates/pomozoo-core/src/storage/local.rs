//! Async load/save of state slices, one key per slice.
//!
//! Loads never fail: a missing key, an unreadable store, or a blob that no
//! longer parses all yield the slice's default and a `warn` log line. Saves
//! do propagate errors so callers can tell the user the save point failed.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::kv::KeyValueStore;
use crate::collection::CollectedAnimal;
use crate::error::StorageError;
use crate::settings::{PresetBook, Settings};
use crate::state::AppState;
use crate::stats::DailyStats;
use crate::timer::TimerState;

/// Store keys. Values are JSON.
pub mod keys {
    pub const SEEN_ANIMAL_IDS: &str = "seen_animal_ids";
    pub const DAILY_STATS: &str = "daily_stats";
    pub const SETTINGS: &str = "settings";
    pub const WORK_PRESETS: &str = "work_presets";
    pub const COLLECTED_ANIMALS: &str = "collected_animals";
    pub const TIMER_STATE: &str = "timer_state";
}

pub struct LocalStore<S> {
    store: Arc<S>,
}

impl<S> Clone for LocalStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore + 'static> LocalStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    async fn load_or_default<T>(&self, key: &'static str) -> T
    where
        T: DeserializeOwned + Default + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let raw = match tokio::task::spawn_blocking(move || store.get(key)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "store read failed, using default");
                return T::default();
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "store task failed, using default");
                return T::default();
            }
        };
        let Some(json) = raw else {
            return T::default();
        };
        match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value unreadable, using default");
                T::default()
            }
        }
    }

    async fn save_value<T: Serialize + ?Sized>(
        &self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.set(key, &json)).await??;
        tracing::debug!(key, "saved");
        Ok(())
    }

    // ── Slices ───────────────────────────────────────────────────────

    pub async fn load_settings(&self) -> Settings {
        let settings: Settings = self.load_or_default(keys::SETTINGS).await;
        if let Err(e) = settings.validate() {
            tracing::warn!(error = %e, "stored settings invalid, using defaults");
            return Settings::default();
        }
        settings
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.save_value(keys::SETTINGS, settings).await
    }

    pub async fn load_seen_animal_ids(&self) -> BTreeSet<String> {
        self.load_or_default(keys::SEEN_ANIMAL_IDS).await
    }

    pub async fn save_seen_animal_ids(&self, ids: &BTreeSet<String>) -> Result<(), StorageError> {
        self.save_value(keys::SEEN_ANIMAL_IDS, ids).await
    }

    pub async fn load_daily_stats(&self) -> DailyStats {
        self.load_or_default(keys::DAILY_STATS).await
    }

    pub async fn save_daily_stats(&self, stats: &DailyStats) -> Result<(), StorageError> {
        self.save_value(keys::DAILY_STATS, stats).await
    }

    pub async fn load_presets(&self) -> PresetBook {
        self.load_or_default(keys::WORK_PRESETS).await
    }

    pub async fn save_presets(&self, presets: &PresetBook) -> Result<(), StorageError> {
        self.save_value(keys::WORK_PRESETS, presets).await
    }

    pub async fn load_collected(&self) -> Vec<CollectedAnimal> {
        self.load_or_default(keys::COLLECTED_ANIMALS).await
    }

    pub async fn save_collected(&self, collected: &[CollectedAnimal]) -> Result<(), StorageError> {
        self.save_value(keys::COLLECTED_ANIMALS, collected).await
    }

    pub async fn load_timer(&self) -> Option<TimerState> {
        self.load_or_default(keys::TIMER_STATE).await
    }

    pub async fn save_timer(&self, timer: &TimerState) -> Result<(), StorageError> {
        self.save_value(keys::TIMER_STATE, timer).await
    }

    // ── Save point ───────────────────────────────────────────────────

    /// Rebuild state from every slice. Session sprites and auth are not
    /// persisted and start empty.
    pub async fn load_snapshot(&self) -> AppState {
        let settings = self.load_settings().await;
        let timer = self
            .load_timer()
            .await
            .unwrap_or_else(|| TimerState::new(&settings));
        AppState {
            timer,
            collected: self.load_collected().await,
            seen_animal_ids: self.load_seen_animal_ids().await,
            active_sprites: Vec::new(),
            daily_stats: self.load_daily_stats().await,
            presets: self.load_presets().await,
            settings,
            auth: Default::default(),
        }
    }

    /// Write every persisted slice. Called when the app is backgrounded or
    /// the CLI command finishes.
    pub async fn save_snapshot(&self, state: &AppState) -> Result<(), StorageError> {
        self.save_settings(&state.settings).await?;
        self.save_timer(&state.timer).await?;
        self.save_collected(&state.collected).await?;
        self.save_seen_animal_ids(&state.seen_animal_ids).await?;
        self.save_daily_stats(&state.daily_stats).await?;
        self.save_presets(&state.presets).await?;
        Ok(())
    }
}
