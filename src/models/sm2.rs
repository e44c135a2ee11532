//! Spaced repetition scheduling derived from SM-2 (SuperMemo 2).
//!
//! Differences from textbook SM-2:
//! - Answers are binary. A correct answer is graded as quality 4, a wrong one as quality 0.
//! - Intervals come from a fixed table indexed by SRS level (1, 3, 7, 14, 30 days)
//!   instead of being multiplied by the easiness factor.
//! - A wrong answer drops the word to level 1 and schedules a retry in one hour.
//! - The easiness factor never falls below 1.3.

use super::LearnedWordRecord;
use super::learned_word::{MAX_SRS_LEVEL, MIN_EASE_FACTOR, MIN_SRS_LEVEL};
use chrono::{DateTime, Duration, Utc};

pub const CORRECT_QUALITY: u8 = 4;
pub const INCORRECT_QUALITY: u8 = 0;

/// Days until the next review, indexed by SRS level.
pub fn interval_days(srs_level: u8) -> i64 {
    match srs_level.clamp(MIN_SRS_LEVEL, MAX_SRS_LEVEL) {
        1 => 1,
        2 => 3,
        3 => 7,
        4 => 14,
        _ => 30,
    }
}

pub fn relearn_delay() -> Duration {
    Duration::hours(1)
}

/// SM-2 easiness update, floored at 1.3.
pub fn adjust_ease_factor(ease_factor: f64, quality: u8) -> f64 {
    let q = quality.min(5) as f64;
    let new_ef = ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    new_ef.max(MIN_EASE_FACTOR)
}

/// Returns the record's new scheduling state after one attempt at `now`.
pub fn on_attempt(record: &LearnedWordRecord, was_correct: bool, now: DateTime<Utc>) -> LearnedWordRecord {
    let mut next = record.clone();

    if was_correct {
        next.repetitions = record.repetitions.saturating_add(1);
        next.srs_level = match next.repetitions {
            1 => 1,
            2 => 2,
            _ => record.srs_level.saturating_add(1).min(MAX_SRS_LEVEL),
        };
        next.next_review_at = now + Duration::days(interval_days(next.srs_level));
        next.ease_factor = adjust_ease_factor(record.ease_factor, CORRECT_QUALITY);
    } else {
        // Start over
        next.repetitions = 0;
        next.srs_level = MIN_SRS_LEVEL;
        next.next_review_at = now + relearn_delay();
        next.ease_factor = adjust_ease_factor(record.ease_factor, INCORRECT_QUALITY);
    }

    next.last_reviewed_at = now;
    next
}

/// Records whose review time has come.
pub fn get_due_words(records: &[LearnedWordRecord], now: DateTime<Utc>) -> Vec<LearnedWordRecord> {
    records.iter().filter(|r| r.is_due(now)).cloned().collect()
}

/// Picks up to `limit` records for a review session: due words first (most overdue
/// first), then the words whose review is closest.
pub fn select_review_words(
    records: &[LearnedWordRecord],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<LearnedWordRecord> {
    let (mut due, mut upcoming): (Vec<_>, Vec<_>) =
        records.iter().cloned().partition(|r| r.is_due(now));

    due.sort_by_key(|r| r.next_review_at);
    upcoming.sort_by_key(|r| r.next_review_at);

    due.into_iter().chain(upcoming).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Word;

    fn fresh_record(now: DateTime<Utc>) -> LearnedWordRecord {
        LearnedWordRecord::new(&Word::new("água", "water"), "drinks", "food", now)
    }

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_three_correct_answers() {
        let mut now = at(1_700_000_000_000);
        let mut record = fresh_record(now);
        let mut levels = Vec::new();
        let mut deltas = Vec::new();

        for _ in 0..3 {
            record = on_attempt(&record, true, now);
            levels.push(record.srs_level);
            deltas.push((record.next_review_at - now).num_days());
            now = record.next_review_at;
        }

        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(deltas, vec![1, 3, 7]);
        assert_eq!(record.repetitions, 3);
    }

    #[test]
    fn test_level_caps_at_five() {
        let now = at(1_700_000_000_000);
        let mut record = fresh_record(now);
        for _ in 0..10 {
            record = on_attempt(&record, true, now);
        }

        assert_eq!(record.srs_level, 5);
        assert_eq!((record.next_review_at - now).num_days(), 30);
    }

    #[test]
    fn test_incorrect_resets() {
        let now = at(1_700_000_000_000);
        let mut record = fresh_record(now);
        record.srs_level = 3;
        record.repetitions = 4;

        let next = on_attempt(&record, false, now);
        assert_eq!(next.srs_level, 1);
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.next_review_at, now + Duration::hours(1));
        assert_eq!(next.last_reviewed_at, now);
        assert!(next.ease_factor < record.ease_factor);
    }

    #[test]
    fn test_correct_keeps_ease_factor() {
        let now = at(1_700_000_000_000);
        let record = fresh_record(now);
        let next = on_attempt(&record, true, now);

        assert!((next.ease_factor - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_ef_floor() {
        let now = at(1_700_000_000_000);
        let mut record = fresh_record(now);
        record.ease_factor = 1.3;

        let next = on_attempt(&record, false, now);
        assert!(next.ease_factor >= 1.3);
    }

    #[test]
    fn test_invariants_hold_for_mixed_sequences() {
        let now = at(1_700_000_000_000);
        let mut record = fresh_record(now);
        // deterministic pseudo-random pattern of answers
        let mut state: u32 = 7;
        for _ in 0..200 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let correct = (state >> 16) % 3 != 0;
            record = on_attempt(&record, correct, now);
            assert!(record.ease_factor >= 1.3);
            assert!((1..=5).contains(&record.srs_level));
        }
    }

    #[test]
    fn test_get_due_words() {
        let t = at(1_700_000_000_000);
        let mut record = fresh_record(t);
        record.next_review_at = t;

        assert_eq!(get_due_words(&[record.clone()], t).len(), 1);
        assert_eq!(get_due_words(&[record.clone()], t + Duration::milliseconds(1)).len(), 1);
        assert!(get_due_words(&[record], t - Duration::milliseconds(1)).is_empty());
    }

    #[test]
    fn test_select_review_words_due_first() {
        let now = at(1_700_000_000_000);
        let mut soon = LearnedWordRecord::new(&Word::new("um", "one"), "n", "", now);
        soon.next_review_at = now + Duration::hours(2);
        let mut overdue = LearnedWordRecord::new(&Word::new("dois", "two"), "n", "", now);
        overdue.next_review_at = now - Duration::days(3);
        let mut due = LearnedWordRecord::new(&Word::new("três", "three"), "n", "", now);
        due.next_review_at = now - Duration::hours(1);
        let mut later = LearnedWordRecord::new(&Word::new("quatro", "four"), "n", "", now);
        later.next_review_at = now + Duration::days(5);

        let picked = select_review_words(&[later, soon, due, overdue], now, 3);
        let keys: Vec<_> = picked.iter().map(|r| r.word.pt.as_str()).collect();
        assert_eq!(keys, vec!["dois", "três", "um"]);
    }
}
