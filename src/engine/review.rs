//! Review sessions over already learned words.
use crate::config::templates::REVIEW_TEMPLATE_ID;
use crate::models::{Lesson, UserData, sm2};
use chrono::{DateTime, Utc};

pub const REVIEW_LESSON_ID: &str = "review";
pub const DEFAULT_REVIEW_SIZE: usize = 12;

/// Lesson made of the words most in need of review, due words first.
/// `None` when nothing has been learned yet.
pub fn build_review_lesson(data: &UserData, now: DateTime<Utc>, limit: usize) -> Option<Lesson> {
    let picked = sm2::select_review_words(&data.learned_words, now, limit);
    if picked.is_empty() {
        return None;
    }
    let due = picked.iter().filter(|r| r.is_due(now)).count();
    log::debug!("review: {} words selected, {} due", picked.len(), due);

    Some(Lesson {
        id: REVIEW_LESSON_ID.to_string(),
        title: "Review".to_string(),
        words: picked.into_iter().map(|r| r.word).collect(),
        template_id: REVIEW_TEMPLATE_ID.to_string(),
        ..Default::default()
    })
}
