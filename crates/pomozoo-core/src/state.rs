//! Application state and the single holder that mutates it.
//!
//! [`AppState`] is a plain snapshot. [`StateHolder`] owns one per process and
//! applies [`Action`]s one at a time; each dispatch returns the events it
//! produced. The local store and the backend mirror this state, they never
//! drive it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::collection::{self, ActiveSprite, Catalog, CollectedAnimal};
use crate::error::ValidationError;
use crate::events::Event;
use crate::remote::AuthStatus;
use crate::settings::{PresetBook, Settings};
use crate::stats::{day_of, DailyStat, DailyStats};
use crate::timer::{Completion, TimerMode, TimerState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub timer: TimerState,
    #[serde(default)]
    pub collected: Vec<CollectedAnimal>,
    #[serde(default)]
    pub seen_animal_ids: BTreeSet<String>,
    /// Earned this app session; not persisted.
    #[serde(skip)]
    pub active_sprites: Vec<ActiveSprite>,
    #[serde(default)]
    pub daily_stats: DailyStats,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub presets: PresetBook,
    #[serde(default)]
    pub auth: AuthStatus,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl AppState {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            timer: TimerState::new(&settings),
            collected: Vec::new(),
            seen_animal_ids: BTreeSet::new(),
            active_sprites: Vec::new(),
            daily_stats: DailyStats::default(),
            settings,
            presets: PresetBook::default(),
            auth: AuthStatus::Unauthenticated,
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        let today = self
            .daily_stats
            .get(day_of(now))
            .map_or(0, |s| s.total_study_minutes());
        Event::StateSnapshot {
            mode: self.timer.mode(),
            time_left: self.timer.time_left(),
            progress: self.timer.progress(&self.settings),
            is_running: self.timer.is_running(),
            is_paused: self.timer.is_paused(),
            cycle_count: self.timer.cycle_count(),
            collected_count: self.collected.len(),
            active_sprites: self.active_sprites.len(),
            today_study_minutes: today,
            at: now,
        }
    }
}

/// Everything that can change [`AppState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start,
    Pause,
    Resume,
    Stop,
    Skip,
    Tick,
    UpdateSettings(Settings),
    CreatePreset { name: String, settings: Settings },
    RenamePreset { id: String, name: String },
    UpdatePreset { id: String, settings: Settings },
    DeletePreset { id: String },
    ApplyPreset(String),
    /// Mark ids as seen; `None` marks every collected animal.
    MarkSeen(Option<Vec<String>>),
    ClearSessionSprites,
    AddChecklistItem { text: String },
    ToggleChecklistItem { item_id: String },
    RemoveChecklistItem { item_id: String },
    /// Fold remote copies of daily stats in; the newer copy of each day wins.
    MergeRemoteStats(Vec<DailyStat>),
    SetAuth(AuthStatus),
}

/// Single writer of [`AppState`].
pub struct StateHolder {
    state: AppState,
    catalog: Catalog,
    rng: Box<dyn RngCore + Send>,
}

impl StateHolder {
    pub fn new(state: AppState) -> Self {
        Self::with_rng(state, Box::new(StdRng::from_entropy()))
    }

    /// Holder with a caller-supplied RNG, for reproducible rewards.
    pub fn with_rng(state: AppState, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            state,
            catalog: Catalog::builtin(),
            rng,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Vec<Event>, ValidationError> {
        self.dispatch_at(action, Utc::now())
    }

    /// Up to `count` ticks, stopping early once the timer is no longer
    /// counting (paused, stopped, or finished without auto-start).
    pub fn tick_many(&mut self, count: u64, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..count {
            if !self.state.timer.is_counting() {
                break;
            }
            if let Some(done) = self.state.timer.tick(&self.state.settings) {
                events.extend(self.on_completion(done, now));
            }
        }
        events
    }

    /// Apply one action as of `now`.
    pub fn dispatch_at(
        &mut self,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, ValidationError> {
        let state = &mut self.state;
        let events = match action {
            Action::Start => state.timer.start().into_iter().collect(),
            Action::Pause => state.timer.pause().into_iter().collect(),
            Action::Resume => state.timer.resume().into_iter().collect(),
            Action::Stop => state.timer.stop(&state.settings).into_iter().collect(),
            Action::Skip => state.timer.skip(&state.settings).into_iter().collect(),
            Action::Tick => match state.timer.tick(&state.settings) {
                Some(done) => self.on_completion(done, now),
                None => Vec::new(),
            },
            Action::UpdateSettings(settings) => {
                settings.validate()?;
                state.timer.apply_settings(&settings);
                state.settings = settings;
                vec![Event::SettingsChanged { at: now }]
            }
            Action::CreatePreset { name, settings } => {
                let preset = state.presets.create(&name, settings)?;
                vec![Event::PresetCreated {
                    preset_id: preset.id.clone(),
                    name: preset.name.clone(),
                    at: now,
                }]
            }
            Action::RenamePreset { id, name } => {
                state.presets.rename(&id, &name)?;
                vec![Event::PresetRenamed {
                    preset_id: id,
                    name: name.trim().to_string(),
                    at: now,
                }]
            }
            Action::UpdatePreset { id, settings } => {
                state.presets.update(&id, settings)?;
                vec![Event::PresetUpdated { preset_id: id, at: now }]
            }
            Action::DeletePreset { id } => {
                let removed = state.presets.delete(&id)?;
                vec![Event::PresetDeleted {
                    preset_id: removed.id,
                    name: removed.name,
                    at: now,
                }]
            }
            Action::ApplyPreset(id) => {
                let preset = state
                    .presets
                    .get(&id)
                    .ok_or_else(|| ValidationError::NotFound {
                        kind: "preset",
                        id: id.clone(),
                    })?
                    .clone();
                state.timer.apply_settings(&preset.settings);
                state.settings = preset.settings;
                vec![
                    Event::PresetApplied {
                        preset_id: preset.id,
                        name: preset.name,
                        at: now,
                    },
                    Event::SettingsChanged { at: now },
                ]
            }
            Action::MarkSeen(ids) => {
                let ids: Vec<String> = match ids {
                    Some(ids) => ids,
                    None => state.collected.iter().map(|c| c.animal_id.clone()).collect(),
                };
                let newly: Vec<String> = ids
                    .into_iter()
                    .filter(|id| state.seen_animal_ids.insert(id.clone()))
                    .collect();
                if newly.is_empty() {
                    Vec::new()
                } else {
                    vec![Event::AnimalsSeen {
                        animal_ids: newly,
                        at: now,
                    }]
                }
            }
            Action::ClearSessionSprites => {
                let count = state.active_sprites.len();
                state.active_sprites.clear();
                vec![Event::SessionSpritesCleared { count, at: now }]
            }
            Action::AddChecklistItem { text } => {
                if text.trim().is_empty() {
                    return Err(ValidationError::InvalidValue {
                        field: "text".into(),
                        message: "checklist item must not be empty".into(),
                    });
                }
                let date = day_of(now);
                let item_id = state.daily_stats.add_checklist_item(date, &text, now);
                vec![Event::ChecklistItemAdded {
                    date,
                    item_id,
                    at: now,
                }]
            }
            Action::ToggleChecklistItem { item_id } => {
                let date = day_of(now);
                let done = state
                    .daily_stats
                    .toggle_checklist_item(date, &item_id, now)
                    .ok_or_else(|| ValidationError::NotFound {
                        kind: "checklist item",
                        id: item_id.clone(),
                    })?;
                vec![Event::ChecklistItemToggled {
                    date,
                    item_id,
                    done,
                    at: now,
                }]
            }
            Action::RemoveChecklistItem { item_id } => {
                let date = day_of(now);
                if !state.daily_stats.remove_checklist_item(date, &item_id, now) {
                    return Err(ValidationError::NotFound {
                        kind: "checklist item",
                        id: item_id,
                    });
                }
                vec![Event::ChecklistItemRemoved {
                    date,
                    item_id,
                    at: now,
                }]
            }
            Action::MergeRemoteStats(remote) => {
                let outcome = state.daily_stats.merge_all(remote);
                vec![Event::StatsMerged {
                    pulled: outcome.pulled,
                    kept_newer: outcome.kept_newer,
                    unchanged: outcome.unchanged,
                    at: now,
                }]
            }
            Action::SetAuth(status) => {
                if state.auth == status {
                    Vec::new()
                } else {
                    state.auth = status.clone();
                    vec![Event::AuthChanged { status, at: now }]
                }
            }
        };
        Ok(events)
    }

    /// Rewards and stats for a finished countdown.
    fn on_completion(&mut self, done: Completion, now: DateTime<Utc>) -> Vec<Event> {
        let date = day_of(now);
        let category = self.state.settings.category.clone();
        let mut events = vec![Event::TimerCompleted {
            mode: done.finished,
            next_mode: done.next,
            cycle_count: done.cycle_count,
            auto_started: self.state.timer.is_running(),
            at: now,
        }];

        if done.finished == TimerMode::Study {
            self.state
                .daily_stats
                .record_study(date, &category, done.minutes, now);
            events.push(Event::StudyRecorded {
                date,
                category,
                minutes: done.minutes,
                at: now,
            });
            if let Some(event) = self.award(now) {
                events.push(event);
            }
        } else {
            self.state
                .daily_stats
                .record_break(date, &category, done.minutes, now);
            events.push(Event::BreakRecorded {
                date,
                category,
                minutes: done.minutes,
                at: now,
            });
        }
        tracing::info!(
            mode = %done.finished,
            next = %done.next,
            cycle = done.cycle_count,
            "countdown completed"
        );
        events
    }

    fn award(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let animal =
            collection::pick_reward(&self.catalog, &self.state.collected, &mut *self.rng)?.clone();
        let first_time = !collection::collected_ids(&self.state.collected)
            .contains(animal.id.as_str());
        self.state.collected.push(CollectedAnimal {
            animal_id: animal.id.clone(),
            rarity: animal.rarity,
            collected_at: now,
        });
        self.state
            .active_sprites
            .push(ActiveSprite::spawn(&animal.id, now));
        Some(Event::AnimalAwarded {
            animal_id: animal.id,
            rarity: animal.rarity,
            first_time,
            at: now,
        })
    }
}
