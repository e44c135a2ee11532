//! Error types for the fallible edges of the engine: storage, template loading and file import.
//! Generation, scheduling and bookkeeping never fail for well-formed input.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored value for '{key}' is not valid JSON: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template '{template}' is not valid JSON: {message}")]
    Parse { template: String, message: String },
    #[error("template '{template}' references unknown challenge type '{challenge_type}'")]
    UnknownChallengeType {
        template: String,
        challenge_type: String,
    },
    #[error("template '{template}' references unknown difficulty '{difficulty}'")]
    UnknownDifficulty { template: String, difficulty: String },
    #[error("template '{template}' references unknown phase '{phase}'")]
    UnknownPhase { template: String, phase: String },
    #[error("template '{template}': phase '{phase}' is out of order")]
    PhaseOutOfOrder { template: String, phase: String },
    #[error("template '{template}': directive '{challenge_type}' has an invalid count")]
    InvalidCount {
        template: String,
        challenge_type: String,
    },
    #[error("template '{0}' is defined more than once")]
    DuplicateTemplate(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' does not contain valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
