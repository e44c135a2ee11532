//! User-facing preferences, persisted next to the progress document.
use super::DifficultyLevel;
use crate::database::store::{PersistenceStore, StoreKey};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VOICE_KEY: &str = "piper-pt-tugao-medium";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Difficulty the user asked for; the progression gate may lower it.
    pub requested_difficulty: DifficultyLevel,
    pub speech_rate: f32,
    pub voice_key: String,
    pub audio_enabled: bool,
    pub include_optional: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            requested_difficulty: DifficultyLevel::Beginner,
            speech_rate: 1.0,
            voice_key: DEFAULT_VOICE_KEY.to_string(),
            audio_enabled: false,
            include_optional: true,
        }
    }
}

impl Settings {
    /// Loads settings, falling back to defaults for anything missing or unreadable.
    pub fn load(store: &dyn PersistenceStore) -> Self {
        let value = match store.load(StoreKey::Settings.as_str()) {
            Ok(Some(value)) => value,
            Ok(None) => return Self::default(),
            Err(e) => {
                log::warn!("could not load settings: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_value::<Settings>(value) {
            Ok(mut settings) => {
                if !settings.speech_rate.is_finite() || settings.speech_rate <= 0.0 {
                    settings.speech_rate = 1.0;
                }
                settings.speech_rate = settings.speech_rate.clamp(0.5, 2.0);
                settings
            }
            Err(e) => {
                log::warn!("stored settings are malformed, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn PersistenceStore) -> Result<(), crate::error::StoreError> {
        let value = serde_json::to_value(self).map_err(|source| crate::error::StoreError::Json {
            key: StoreKey::Settings.as_str().to_string(),
            source,
        })?;
        store.save(StoreKey::Settings.as_str(), &value)
    }
}
