//! Decides which difficulty level a lesson snapshot has unlocked.
//!
//! Levels unlock in order: a level counts only when every level below it is unlocked
//! as well, so a locked intermediate level can never be skipped.

use crate::config::{DifficultyLevel, UnlockCriteria};
use crate::models::LessonProgressSnapshot;

pub fn is_level_unlocked(level: DifficultyLevel, snapshot: &LessonProgressSnapshot) -> bool {
    match level.unlock_criteria() {
        None => true,
        Some(UnlockCriteria {
            min_accuracy,
            min_completions,
        }) => snapshot.accuracy >= min_accuracy && snapshot.completions >= min_completions,
    }
}

/// Highest level reachable without crossing a locked one.
pub fn get_unlocked_level(snapshot: &LessonProgressSnapshot) -> DifficultyLevel {
    DifficultyLevel::ALL
        .into_iter()
        .take_while(|level| is_level_unlocked(*level, snapshot))
        .last()
        .unwrap_or(DifficultyLevel::Beginner)
}

/// The level a session actually runs at: users cannot pick above what they unlocked.
pub fn effective_difficulty(
    requested: DifficultyLevel,
    snapshot: &LessonProgressSnapshot,
) -> DifficultyLevel {
    requested.min(get_unlocked_level(snapshot))
}

/// What is still missing before the next level opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockHint {
    pub level: DifficultyLevel,
    pub accuracy_needed: u8,
    pub completions_needed: u32,
}

/// `None` once every level is unlocked.
pub fn next_unlock(snapshot: &LessonProgressSnapshot) -> Option<UnlockHint> {
    let current = get_unlocked_level(snapshot);
    let level = DifficultyLevel::ALL.into_iter().find(|l| *l > current)?;
    let criteria = level.unlock_criteria()?;

    Some(UnlockHint {
        level,
        accuracy_needed: criteria.min_accuracy.saturating_sub(snapshot.accuracy),
        completions_needed: criteria.min_completions.saturating_sub(snapshot.completions),
    })
}
