pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod speech;
pub mod telemetry;

pub use config::{DifficultyLevel, Settings, TemplateSet};
pub use models::{ChallengeInstance, Lesson, LessonSet, UserData, Word};
pub use session::{LessonRun, SaveStatus, TutorSession};
