//! Contract for the text-to-speech / speech-recognition collaborator.
//!
//! The engine never depends on speech succeeding: failures are turned into a short
//! status message for the UI and the exercise flow continues.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct SpeechOptions {
    pub rate: f32,
    pub voice_key: Option<String>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            voice_key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recognition {
    pub transcript: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech is not supported here")]
    Unsupported,
    #[error("no voice available")]
    NoVoice,
    #[error("no speech detected")]
    NoSpeech,
    #[error("cancelled")]
    Cancelled,
    #[error("speech engine error: {0}")]
    Engine(String),
}

pub trait SpeechEngine {
    fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<(), SpeechError>;
    fn recognize(&mut self) -> Result<Recognition, SpeechError>;
}

/// Engine for environments without audio.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSpeech;

impl SpeechEngine for SilentSpeech {
    fn speak(&mut self, _text: &str, _options: &SpeechOptions) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    fn recognize(&mut self) -> Result<Recognition, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Speaks `text`; on failure returns the message to show instead.
pub fn speak_or_status(
    engine: &mut dyn SpeechEngine,
    text: &str,
    options: &SpeechOptions,
) -> Option<String> {
    match engine.speak(text, options) {
        Ok(()) => None,
        Err(SpeechError::Cancelled) => None,
        Err(e) => {
            log::info!("speak failed: {}", e);
            Some("No voice available".to_string())
        }
    }
}

/// Transcript of what the user said, or the message to show instead.
pub fn recognize_or_status(engine: &mut dyn SpeechEngine) -> Result<String, String> {
    match engine.recognize() {
        Ok(r) if !r.transcript.trim().is_empty() => Ok(r.transcript),
        Ok(_) | Err(SpeechError::NoSpeech) => Err("No speech detected".to_string()),
        Err(SpeechError::Unsupported) | Err(SpeechError::NoVoice) => {
            Err("Speech recognition is not available".to_string())
        }
        Err(e) => {
            log::info!("recognition failed: {}", e);
            Err("No speech detected".to_string())
        }
    }
}
