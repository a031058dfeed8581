//! Named work presets: saved bundles of [`Settings`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Settings;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPreset {
    pub id: String,
    pub name: String,
    pub settings: Settings,
    pub created_at: DateTime<Utc>,
}

impl WorkPreset {
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            settings,
            created_at: Utc::now(),
        }
    }
}

/// User's presets, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetBook {
    presets: Vec<WorkPreset>,
}

impl PresetBook {
    pub fn list(&self) -> &[WorkPreset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&WorkPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Add a preset under a freshly generated id.
    pub fn create(
        &mut self,
        name: &str,
        settings: Settings,
    ) -> Result<&WorkPreset, ValidationError> {
        let name = validate_name(name)?;
        settings.validate()?;
        self.presets.push(WorkPreset::new(name, settings));
        Ok(&self.presets[self.presets.len() - 1])
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), ValidationError> {
        let name = validate_name(name)?;
        self.get_mut(id)?.name = name;
        Ok(())
    }

    pub fn update(&mut self, id: &str, settings: Settings) -> Result<(), ValidationError> {
        settings.validate()?;
        self.get_mut(id)?.settings = settings;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<WorkPreset, ValidationError> {
        let idx = self
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        Ok(self.presets.remove(idx))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut WorkPreset, ValidationError> {
        self.presets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            message: "preset name must not be empty".into(),
        });
    }
    Ok(trimmed.to_string())
}

fn not_found(id: &str) -> ValidationError {
    ValidationError::NotFound {
        kind: "preset",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_unique_ids() {
        let mut book = PresetBook::default();
        let a = book.create("Deep work", Settings::default()).unwrap().id.clone();
        let b = book.create("Reading", Settings::default()).unwrap().id.clone();
        assert_ne!(a, b);
        assert_eq!(book.len(), 2);
        assert_eq!(book.get(&a).unwrap().name, "Deep work");
    }

    #[test]
    fn rejects_blank_names_and_bad_settings() {
        let mut book = PresetBook::default();
        assert!(book.create("  ", Settings::default()).is_err());
        let bad = Settings {
            study_minutes: 0,
            ..Settings::default()
        };
        assert!(book.create("Broken", bad).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn rename_update_delete() {
        let mut book = PresetBook::default();
        let id = book.create("A", Settings::default()).unwrap().id.clone();
        book.rename(&id, " Exam cram ").unwrap();
        let long = Settings {
            study_minutes: 50,
            ..Settings::default()
        };
        book.update(&id, long).unwrap();
        let preset = book.get(&id).unwrap();
        assert_eq!(preset.name, "Exam cram");
        assert_eq!(preset.settings.study_minutes, 50);

        let removed = book.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(matches!(
            book.delete(&id),
            Err(ValidationError::NotFound { .. })
        ));
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut book = PresetBook::default();
        book.create("A", Settings::default()).unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert!(json.is_array());
    }
}
