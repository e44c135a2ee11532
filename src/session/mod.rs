//! A learner's session: the progress document and settings, the store they are
//! persisted to and the telemetry sink. Every mutating call writes through to the
//! store; a failed write is logged and reported, never rolled back.

pub mod lesson_run;

pub use lesson_run::{AnswerOutcome, LessonRun, RunItem};

use crate::config::templates::{FIX_PACK_TEMPLATE_ID, REVIEW_TEMPLATE_ID};
use crate::config::{DifficultyLevel, Settings, TemplateSet};
use crate::database::store::PersistenceStore;
use crate::engine::mastery::{self, AttemptContext};
use crate::engine::progression::{self, UnlockHint};
use crate::engine::review::{self, DEFAULT_REVIEW_SIZE};
use crate::engine::skills::{self, DEFAULT_FIX_PACKS, FixPack, SkillStat};
use crate::engine::TemplateEngine;
use crate::models::{
    ChallengeInstance, LearnedWordRecord, Lesson, LessonProgressSnapshot, UserData, Word, sm2,
};
use crate::telemetry::Telemetry;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::json;

/// Result of writing state back to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// In-memory state is kept; the message is meant for the UI.
    Unsaved(String),
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }
}

pub struct TutorSession<S: PersistenceStore, T: Telemetry> {
    data: UserData,
    settings: Settings,
    templates: TemplateSet,
    store: S,
    telemetry: T,
}

impl<S: PersistenceStore, T: Telemetry> TutorSession<S, T> {
    /// Loads progress and settings from `store`. Missing or damaged state starts empty.
    pub fn open(store: S, telemetry: T, templates: TemplateSet) -> Self {
        let data = UserData::load(&store);
        let settings = Settings::load(&store);
        log::debug!(
            "session opened: {} learned words, {} lessons with progress",
            data.learned_words.len(),
            data.lesson_progress.len()
        );
        Self {
            data,
            settings,
            templates,
            store,
            telemetry,
        }
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self, lesson_id: &str) -> LessonProgressSnapshot {
        self.data.snapshot(lesson_id)
    }

    pub fn unlocked_level(&self, lesson_id: &str) -> DifficultyLevel {
        progression::get_unlocked_level(&self.snapshot(lesson_id))
    }

    pub fn next_unlock(&self, lesson_id: &str) -> Option<UnlockHint> {
        progression::next_unlock(&self.snapshot(lesson_id))
    }

    /// Exercises for one run of `lesson`, at the requested difficulty capped by the
    /// lesson's unlocked level. Review and fix-pack lessons never get optional drills.
    pub fn generate<R: Rng + ?Sized>(&self, lesson: &Lesson, rng: &mut R) -> Vec<ChallengeInstance> {
        let synthetic = lesson.template_id == REVIEW_TEMPLATE_ID
            || lesson.template_id == FIX_PACK_TEMPLATE_ID;
        let engine = TemplateEngine::new(&self.templates)
            .with_audio(self.settings.audio_enabled)
            .with_optional(self.settings.include_optional && !synthetic);

        let challenges = engine.expand_for_snapshot(
            lesson,
            self.settings.requested_difficulty,
            &self.snapshot(&lesson.id),
            rng,
        );
        self.telemetry.track(
            "lesson_generated",
            &json!({
                "lessonId": lesson.id,
                "templateId": lesson.template_id,
                "challenges": challenges.len(),
            }),
        );
        challenges
    }

    pub fn record_mistake(&mut self, word: &Word, ctx: &AttemptContext) -> SaveStatus {
        mastery::record_mistake(&mut self.data, word, ctx);
        self.track_attempt(Some(word), false, ctx);
        self.persist()
    }

    pub fn record_success(&mut self, word: &Word, ctx: &AttemptContext) -> SaveStatus {
        mastery::record_success(&mut self.data, word, ctx);
        self.track_attempt(Some(word), true, ctx);
        self.persist()
    }

    /// Attempt on an exercise that is not about a single word.
    pub fn record_lesson_attempt(&mut self, was_correct: bool, ctx: &AttemptContext) -> SaveStatus {
        mastery::record_lesson_attempt(&mut self.data, was_correct, ctx);
        self.track_attempt(None, was_correct, ctx);
        self.persist()
    }

    pub fn complete_lesson(&mut self, lesson: &Lesson, now: DateTime<Utc>) -> SaveStatus {
        let added = mastery::complete_lesson(&mut self.data, lesson, now);
        let snapshot = self.snapshot(&lesson.id);
        self.telemetry.track(
            "lesson_completed",
            &json!({
                "lessonId": lesson.id,
                "newWords": added,
                "accuracy": snapshot.accuracy,
                "completions": snapshot.completions,
            }),
        );
        self.persist()
    }

    pub fn due_words(&self, now: DateTime<Utc>) -> Vec<LearnedWordRecord> {
        sm2::get_due_words(&self.data.learned_words, now)
    }

    pub fn review_lesson(&self, now: DateTime<Utc>) -> Option<Lesson> {
        review::build_review_lesson(&self.data, now, DEFAULT_REVIEW_SIZE)
    }

    pub fn skill_stats(&self) -> Vec<SkillStat> {
        skills::analyze(
            &self.data.learned_words,
            &self.data.mistakes,
            &self.data.successes,
        )
    }

    pub fn fix_packs(&self) -> Vec<FixPack> {
        skills::fix_packs(
            &self.skill_stats(),
            &self.data.learned_words,
            &self.data.mistakes,
            DEFAULT_FIX_PACKS,
        )
    }

    pub fn reset_progress(&mut self) -> SaveStatus {
        self.data.reset();
        self.telemetry.track("progress_reset", &json!({}));
        self.persist()
    }

    /// Replaces the progress document, e.g. after an import.
    pub fn replace_data(&mut self, data: UserData) -> SaveStatus {
        self.data = data;
        self.persist()
    }

    pub fn set_settings(&mut self, settings: Settings) -> SaveStatus {
        self.settings = settings;
        match self.settings.save(&mut self.store) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                log::warn!("could not save settings: {}", e);
                SaveStatus::Unsaved(format!("Settings not saved: {}", e))
            }
        }
    }

    fn track_attempt(&self, word: Option<&Word>, was_correct: bool, ctx: &AttemptContext) {
        self.telemetry.track(
            "challenge_answered",
            &json!({
                "lessonId": ctx.lesson_id,
                "word": word.map(Word::key),
                "correct": was_correct,
                "retry": ctx.boost_mistake,
            }),
        );
    }

    fn persist(&mut self) -> SaveStatus {
        match self.data.save(&mut self.store) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                log::warn!("could not save progress: {}", e);
                SaveStatus::Unsaved(format!("Progress not saved: {}", e))
            }
        }
    }
}
