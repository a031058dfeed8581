//! User-configurable timer settings.
//!
//! Stored as a JSON blob under the `settings` key of the local store. Every
//! field has a serde default so blobs written by older versions still load.

mod presets;

pub use presets::{PresetBook, WorkPreset};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::keypath;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_study_minutes")]
    pub study_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    /// A long break follows every Nth completed study.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_study: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
    /// Block `blocked_apps` while a study countdown runs.
    #[serde(default)]
    pub focus_guard_enabled: bool,
    #[serde(default)]
    pub blocked_apps: Vec<String>,
    /// Study category that completed minutes are credited to.
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_study_minutes() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_category() -> String {
    "General".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            study_minutes: default_study_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: false,
            auto_start_study: false,
            sound_enabled: true,
            vibration_enabled: true,
            focus_guard_enabled: false,
            blocked_apps: Vec::new(),
            category: default_category(),
        }
    }
}

impl Settings {
    /// Reject values the timer cannot run with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("study_minutes", self.study_minutes),
            ("short_break_minutes", self.short_break_minutes),
            ("long_break_minutes", self.long_break_minutes),
            ("long_break_interval", self.long_break_interval),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "category".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Get a value as string by key (e.g. `study_minutes`).
    pub fn get(&self, key: &str) -> Option<String> {
        keypath::get(self, key)
    }

    /// Return a copy with `key` set to `value`.
    ///
    /// # Errors
    ///
    /// Fails on unknown keys, unparseable values, or values that do not pass
    /// [`Settings::validate`].
    pub fn with(&self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let updated: Settings = keypath::set(self, key, value)?;
        updated
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.study_minutes, 25);
        assert_eq!(s.short_break_minutes, 5);
        assert_eq!(s.long_break_minutes, 15);
        assert_eq!(s.long_break_interval, 4);
        assert!(!s.focus_guard_enabled);
        assert_eq!(s.category, "General");
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"study_minutes": 50}"#).unwrap();
        assert_eq!(s.study_minutes, 50);
        assert_eq!(s.long_break_interval, 4);
        assert!(s.sound_enabled);
    }

    #[test]
    fn with_updates_and_validates() {
        let s = Settings::default().with("study_minutes", "45").unwrap();
        assert_eq!(s.study_minutes, 45);
        assert_eq!(s.get("study_minutes").as_deref(), Some("45"));

        let s = s.with("blocked_apps", "com.video, com.social").unwrap();
        assert_eq!(s.blocked_apps, vec!["com.video", "com.social"]);

        assert!(Settings::default().with("long_break_interval", "0").is_err());
        assert!(Settings::default().with("category", " ").is_err());
        assert!(Settings::default().with("nonexistent", "1").is_err());
    }
}
