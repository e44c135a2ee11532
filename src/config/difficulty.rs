//! Ordered difficulty levels and the thresholds that unlock them.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Hard,
}

/// Both conditions must hold for a level to unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockCriteria {
    pub min_accuracy: u8,
    pub min_completions: u32,
}

impl DifficultyLevel {
    /// Lowest level first.
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
        DifficultyLevel::Hard,
    ];

    /// `None` means the level is always available.
    pub fn unlock_criteria(self) -> Option<UnlockCriteria> {
        match self {
            DifficultyLevel::Beginner => None,
            DifficultyLevel::Intermediate => Some(UnlockCriteria {
                min_accuracy: 70,
                min_completions: 1,
            }),
            DifficultyLevel::Advanced => Some(UnlockCriteria {
                min_accuracy: 80,
                min_completions: 2,
            }),
            DifficultyLevel::Hard => Some(UnlockCriteria {
                min_accuracy: 90,
                min_completions: 3,
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
            DifficultyLevel::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
