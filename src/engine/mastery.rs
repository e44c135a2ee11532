//! Mistake and success bookkeeping.
//!
//! Each recorded attempt updates three things: the per-word counter, the word's
//! spaced-repetition schedule (if the word has been learned) and the lesson's
//! attempt counters. A correct answer given while remediating a word forgives one
//! earlier mistake without erasing the history.

use crate::models::sm2;
use crate::models::word_stat::find_or_create;
use crate::models::{LearnedWordRecord, Lesson, UserData, Word};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub struct AttemptContext {
    pub lesson_id: String,
    pub now: DateTime<Utc>,
    /// Free-form detail kept in the mistake's rolling log (e.g. what was answered).
    pub details: Option<String>,
    /// Set when the attempt belongs to a remediation round.
    pub boost_mistake: bool,
}

impl AttemptContext {
    pub fn new(lesson_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            lesson_id: lesson_id.to_string(),
            now,
            details: None,
            boost_mistake: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn boosting_mistake(mut self) -> Self {
        self.boost_mistake = true;
        self
    }
}

pub fn record_mistake(data: &mut UserData, word: &Word, ctx: &AttemptContext) {
    find_or_create(&mut data.mistakes, word, ctx.now).bump(ctx.details.as_deref(), ctx.now);
    reschedule(data, word, false, ctx.now);
    data.progress_mut(&ctx.lesson_id).record(false);
}

pub fn record_success(data: &mut UserData, word: &Word, ctx: &AttemptContext) {
    find_or_create(&mut data.successes, word, ctx.now).bump(ctx.details.as_deref(), ctx.now);

    if ctx.boost_mistake {
        let key = word.key();
        if let Some(mistake) = data.mistakes.iter_mut().find(|m| m.key == key) {
            mistake.forgive_one();
            log::debug!("{}: mistake count down to {}", key, mistake.count);
        }
    }

    reschedule(data, word, true, ctx.now);
    data.progress_mut(&ctx.lesson_id).record(true);
}

/// Counts an attempt that is not tied to a single word (sentence exercises).
pub fn record_lesson_attempt(data: &mut UserData, was_correct: bool, ctx: &AttemptContext) {
    data.progress_mut(&ctx.lesson_id).record(was_correct);
}

fn reschedule(data: &mut UserData, word: &Word, was_correct: bool, now: DateTime<Utc>) {
    if let Some(record) = data.learned_word_mut(&word.key()) {
        *record = sm2::on_attempt(record, was_correct, now);
    }
}

/// Marks a lesson as completed once more and starts scheduling its new words.
/// Returns how many words were added to the learned set.
pub fn complete_lesson(data: &mut UserData, lesson: &Lesson, now: DateTime<Utc>) -> usize {
    data.progress_mut(&lesson.id).completions += 1;

    let mut added = 0;
    for word in &lesson.words {
        if data.learned_word(&word.key()).is_none() {
            data.learned_words
                .push(LearnedWordRecord::new(word, &lesson.id, &lesson.topic_id, now));
            added += 1;
        }
    }
    log::debug!("{}: completed, {} new learned words", lesson.id, added);
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::word_stat::count_for;
    use chrono::Duration;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn lesson() -> Lesson {
        Lesson {
            id: "family".to_string(),
            topic_id: "people".to_string(),
            words: vec![Word::new("a mãe", "the mother"), Word::new("o pai", "the father")],
            ..Default::default()
        }
    }

    #[test]
    fn test_record_mistake() {
        let mut data = UserData::default();
        let word = Word::new("a mãe", "the mother");
        let ctx = AttemptContext::new("family", at(1_000)).with_details("answered 'o pai'");

        record_mistake(&mut data, &word, &ctx);
        record_mistake(&mut data, &word, &ctx);

        assert_eq!(count_for(&data.mistakes, &word.key()), 2);
        assert_eq!(data.mistakes[0].contexts.len(), 2);
        let progress = data.progress("family").unwrap();
        assert_eq!((progress.attempts, progress.correct), (2, 0));
    }

    #[test]
    fn test_boosted_success_forgives_one_mistake() {
        let mut data = UserData::default();
        let word = Word::new("o pai", "the father");
        let ctx = AttemptContext::new("family", at(1_000));

        record_mistake(&mut data, &word, &ctx);
        record_mistake(&mut data, &word, &ctx);
        record_success(&mut data, &word, &ctx.clone().boosting_mistake());
        assert_eq!(count_for(&data.mistakes, &word.key()), 1);

        record_success(&mut data, &word, &ctx.clone().boosting_mistake());
        record_success(&mut data, &word, &ctx.clone().boosting_mistake());
        assert_eq!(count_for(&data.mistakes, &word.key()), 0);
        assert_eq!(data.mistakes.len(), 1, "history is kept");
        assert_eq!(count_for(&data.successes, &word.key()), 3);
        assert_eq!(data.snapshot("family").accuracy, 60);
    }

    #[test]
    fn test_plain_success_keeps_mistakes() {
        let mut data = UserData::default();
        let word = Word::new("o pai", "the father");
        let ctx = AttemptContext::new("family", at(1_000));

        record_mistake(&mut data, &word, &ctx);
        record_success(&mut data, &word, &ctx);

        assert_eq!(count_for(&data.mistakes, &word.key()), 1);
    }

    #[test]
    fn test_sentence_attempts_only_touch_lesson_counters() {
        let mut data = UserData::default();
        let ctx = AttemptContext::new("family", at(1_000));
        record_lesson_attempt(&mut data, true, &ctx);
        record_lesson_attempt(&mut data, false, &ctx);

        assert!(data.mistakes.is_empty());
        assert!(data.successes.is_empty());
        assert_eq!(data.snapshot("family").accuracy, 50);
    }

    #[test]
    fn test_complete_lesson_creates_records_once() {
        let mut data = UserData::default();
        let now = at(1_700_000_000_000);

        assert_eq!(complete_lesson(&mut data, &lesson(), now), 2);
        assert_eq!(complete_lesson(&mut data, &lesson(), now), 0);

        assert_eq!(data.learned_words.len(), 2);
        assert_eq!(data.snapshot("family").completions, 2);
        let record = data.learned_word("a mãe|the mother").unwrap();
        assert_eq!(record.topic_id, "people");
        assert_eq!(record.next_review_at, now + Duration::days(1));
    }

    #[test]
    fn test_attempts_drive_the_schedule() {
        let mut data = UserData::default();
        let start = at(1_700_000_000_000);
        complete_lesson(&mut data, &lesson(), start);
        let word = Word::new("o pai", "the father");

        let later = start + Duration::days(2);
        record_success(&mut data, &word, &AttemptContext::new("family", later));
        let record = data.learned_word(&word.key()).unwrap();
        assert_eq!(record.repetitions, 1);
        assert_eq!(record.next_review_at, later + Duration::days(1));

        record_mistake(&mut data, &word, &AttemptContext::new("family", later));
        let record = data.learned_word(&word.key()).unwrap();
        assert_eq!(record.repetitions, 0);
        assert_eq!(record.next_review_at, later + Duration::hours(1));
    }
}
