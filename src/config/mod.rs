pub mod challenge_types;
pub mod difficulty;
pub mod settings;
pub mod templates;

pub use challenge_types::{
    ChallengeType, ChallengeTypeId, Direction, LessonResources, Phase, Requirements, SourceKind,
};
pub use difficulty::{DifficultyLevel, UnlockCriteria};
pub use settings::Settings;
pub use templates::{Count, Directive, LessonTemplate, TemplatePhase, TemplateSet};
