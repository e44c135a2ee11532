//! The closed catalog of exercise types.
//!
//! Each type declares the lowest difficulty it appears at, the phase of the lesson flow
//! it belongs to, what kind of lesson item it is built from and which resources the
//! lesson (or the session) must provide.

use super::DifficultyLevel;
use crate::models::Lesson;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of a lesson, in the order they are presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Recognition,
    Recall,
    Production,
    Application,
    Mastery,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Recognition,
        Phase::Recall,
        Phase::Production,
        Phase::Application,
        Phase::Mastery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Recognition => "recognition",
            Phase::Recall => "recall",
            Phase::Production => "production",
            Phase::Application => "application",
            Phase::Mastery => "mastery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s.trim())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    PtToEn,
    EnToPt,
}

/// What a directive iterates over when it selects items from a lesson.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Words,
    Sentences,
    MinimalPairs,
    Dialogues,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Requirements {
    pub images: bool,
    pub audio: bool,
    pub sentences: bool,
    pub minimal_pairs: bool,
    pub dialogues: bool,
}

const NONE: Requirements = Requirements {
    images: false,
    audio: false,
    sentences: false,
    minimal_pairs: false,
    dialogues: false,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeTypeId {
    LearnWord,
    McqPtEn,
    ImageSelect,
    ListenSelect,
    McqEnPt,
    MatchPairs,
    TypeTranslation,
    Cloze,
    WordOrder,
    SentenceBuilder,
    MinimalPair,
    DialogueReply,
    SpeakWord,
    Dictation,
    FreeTranslation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChallengeType {
    pub id: ChallengeTypeId,
    pub min_difficulty: DifficultyLevel,
    pub phase: Phase,
    pub source: SourceKind,
    pub requirements: Requirements,
    pub direction: Option<Direction>,
}

// Indexed by `ChallengeTypeId as usize`.
static REGISTRY: [ChallengeType; 15] = [
    ChallengeType {
        id: ChallengeTypeId::LearnWord,
        min_difficulty: DifficultyLevel::Beginner,
        phase: Phase::Recognition,
        source: SourceKind::Words,
        requirements: NONE,
        direction: Some(Direction::PtToEn),
    },
    ChallengeType {
        id: ChallengeTypeId::McqPtEn,
        min_difficulty: DifficultyLevel::Beginner,
        phase: Phase::Recognition,
        source: SourceKind::Words,
        requirements: NONE,
        direction: Some(Direction::PtToEn),
    },
    ChallengeType {
        id: ChallengeTypeId::ImageSelect,
        min_difficulty: DifficultyLevel::Beginner,
        phase: Phase::Recognition,
        source: SourceKind::Words,
        requirements: Requirements { images: true, ..NONE },
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::ListenSelect,
        min_difficulty: DifficultyLevel::Beginner,
        phase: Phase::Recognition,
        source: SourceKind::Words,
        requirements: Requirements { audio: true, ..NONE },
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::McqEnPt,
        min_difficulty: DifficultyLevel::Beginner,
        phase: Phase::Recall,
        source: SourceKind::Words,
        requirements: NONE,
        direction: Some(Direction::EnToPt),
    },
    ChallengeType {
        id: ChallengeTypeId::MatchPairs,
        min_difficulty: DifficultyLevel::Intermediate,
        phase: Phase::Recall,
        source: SourceKind::Words,
        requirements: NONE,
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::TypeTranslation,
        min_difficulty: DifficultyLevel::Intermediate,
        phase: Phase::Production,
        source: SourceKind::Words,
        requirements: NONE,
        direction: Some(Direction::EnToPt),
    },
    ChallengeType {
        id: ChallengeTypeId::Cloze,
        min_difficulty: DifficultyLevel::Intermediate,
        phase: Phase::Production,
        source: SourceKind::Sentences,
        requirements: Requirements { sentences: true, ..NONE },
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::WordOrder,
        min_difficulty: DifficultyLevel::Intermediate,
        phase: Phase::Production,
        source: SourceKind::Sentences,
        requirements: Requirements { sentences: true, ..NONE },
        direction: Some(Direction::EnToPt),
    },
    ChallengeType {
        id: ChallengeTypeId::SentenceBuilder,
        min_difficulty: DifficultyLevel::Advanced,
        phase: Phase::Application,
        source: SourceKind::Sentences,
        requirements: Requirements { sentences: true, ..NONE },
        direction: Some(Direction::EnToPt),
    },
    ChallengeType {
        id: ChallengeTypeId::MinimalPair,
        min_difficulty: DifficultyLevel::Advanced,
        phase: Phase::Application,
        source: SourceKind::MinimalPairs,
        requirements: Requirements {
            minimal_pairs: true,
            audio: true,
            ..NONE
        },
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::DialogueReply,
        min_difficulty: DifficultyLevel::Advanced,
        phase: Phase::Application,
        source: SourceKind::Dialogues,
        requirements: Requirements { dialogues: true, ..NONE },
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::SpeakWord,
        min_difficulty: DifficultyLevel::Advanced,
        phase: Phase::Application,
        source: SourceKind::Words,
        requirements: Requirements { audio: true, ..NONE },
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::Dictation,
        min_difficulty: DifficultyLevel::Hard,
        phase: Phase::Mastery,
        source: SourceKind::Sentences,
        requirements: Requirements {
            sentences: true,
            audio: true,
            ..NONE
        },
        direction: None,
    },
    ChallengeType {
        id: ChallengeTypeId::FreeTranslation,
        min_difficulty: DifficultyLevel::Hard,
        phase: Phase::Mastery,
        source: SourceKind::Sentences,
        requirements: Requirements { sentences: true, ..NONE },
        direction: Some(Direction::EnToPt),
    },
];

impl ChallengeTypeId {
    pub fn all() -> impl Iterator<Item = ChallengeTypeId> {
        REGISTRY.iter().map(|t| t.id)
    }

    pub fn meta(self) -> &'static ChallengeType {
        &REGISTRY[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeTypeId::LearnWord => "learn_word",
            ChallengeTypeId::McqPtEn => "mcq_pt_en",
            ChallengeTypeId::ImageSelect => "image_select",
            ChallengeTypeId::ListenSelect => "listen_select",
            ChallengeTypeId::McqEnPt => "mcq_en_pt",
            ChallengeTypeId::MatchPairs => "match_pairs",
            ChallengeTypeId::TypeTranslation => "type_translation",
            ChallengeTypeId::Cloze => "cloze",
            ChallengeTypeId::WordOrder => "word_order",
            ChallengeTypeId::SentenceBuilder => "sentence_builder",
            ChallengeTypeId::MinimalPair => "minimal_pair",
            ChallengeTypeId::DialogueReply => "dialogue_reply",
            ChallengeTypeId::SpeakWord => "speak_word",
            ChallengeTypeId::Dictation => "dictation",
            ChallengeTypeId::FreeTranslation => "free_translation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().find(|id| id.as_str() == s.trim())
    }
}

impl fmt::Display for ChallengeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a lesson (plus the current session) can offer to exercise types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LessonResources {
    pub images: bool,
    pub audio: bool,
    pub sentences: bool,
    pub minimal_pairs: bool,
    pub dialogues: bool,
}

impl LessonResources {
    pub fn of(lesson: &Lesson, audio_available: bool) -> Self {
        Self {
            images: lesson.has_images(),
            audio: audio_available,
            sentences: !lesson.sentences.is_empty(),
            minimal_pairs: !lesson.minimal_pairs.is_empty(),
            dialogues: lesson.dialogues.iter().any(|d| d.lines.len() >= 2),
        }
    }

    pub fn satisfies(&self, req: &Requirements) -> bool {
        (!req.images || self.images)
            && (!req.audio || self.audio)
            && (!req.sentences || self.sentences)
            && (!req.minimal_pairs || self.minimal_pairs)
            && (!req.dialogues || self.dialogues)
    }
}
