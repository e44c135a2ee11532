use super::Word;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_SRS_LEVEL: u8 = 1;
pub const MAX_SRS_LEVEL: u8 = 5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Scheduling state of one learned word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedWordRecord {
    pub key: String,
    pub word: Word,
    pub srs_level: u8,
    pub ease_factor: f64,
    pub repetitions: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_reviewed_at: DateTime<Utc>,
    #[serde(default)]
    pub lesson_id: String,
    #[serde(default)]
    pub topic_id: String,
}

impl LearnedWordRecord {
    /// Record created when a lesson containing `word` is completed.
    /// The first review is due one day later.
    pub fn new(word: &Word, lesson_id: &str, topic_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            key: word.key(),
            word: word.clone(),
            srs_level: MIN_SRS_LEVEL,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: 0,
            next_review_at: now + Duration::days(1),
            last_reviewed_at: now,
            lesson_id: lesson_id.to_string(),
            topic_id: topic_id.to_string(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_at
    }

    /// Pulls scalars back into their valid ranges and re-derives `key` from the word.
    /// Used when loading stored data.
    pub fn clamp_invariants(&mut self) {
        self.srs_level = self.srs_level.clamp(MIN_SRS_LEVEL, MAX_SRS_LEVEL);
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            self.ease_factor = MIN_EASE_FACTOR;
        }
        let key = self.word.key();
        if self.key != key {
            self.key = key;
        }
    }
}
