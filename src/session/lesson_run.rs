//! Walks a generated exercise list in rounds.
//!
//! Every exercise is shown once in round 1. Exercises answered wrongly are queued
//! for the next round, and rounds repeat until nothing is left. Correct answers in a
//! retry round forgive one earlier mistake on the word.

use super::{SaveStatus, TutorSession};
use crate::database::store::PersistenceStore;
use crate::engine::AttemptContext;
use crate::models::{ChallengeContent, ChallengeInstance, Lesson};
use crate::telemetry::Telemetry;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct RunItem {
    pub challenge: ChallengeInstance,
    pub is_passed: bool,
    pub attempts: u32,
}

impl RunItem {
    fn new(challenge: ChallengeInstance) -> Self {
        Self {
            challenge,
            is_passed: false,
            attempts: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub save: SaveStatus,
    /// Set on the answer that finished the run.
    pub finished: bool,
}

pub struct LessonRun {
    lesson: Lesson,
    items: Vec<RunItem>,
    current_round: Vec<usize>,
    current_index: usize,
    round_number: usize,
    finished: bool,
}

impl LessonRun {
    pub fn new(lesson: Lesson, challenges: Vec<ChallengeInstance>) -> Self {
        let items: Vec<RunItem> = challenges.into_iter().map(RunItem::new).collect();
        let current_round = (0..items.len()).collect();
        Self {
            lesson,
            items,
            current_round,
            current_index: 0,
            round_number: 1,
            finished: false,
        }
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    pub fn current(&self) -> Option<&ChallengeInstance> {
        if self.finished {
            return None;
        }
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.items.get(idx))
            .map(|item| &item.challenge)
    }

    /// Scores `answer` against the current exercise, records it and moves on.
    /// Completing the last round completes the lesson. `None` once the run is over.
    pub fn submit<S: PersistenceStore, T: Telemetry>(
        &mut self,
        session: &mut TutorSession<S, T>,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Option<AnswerOutcome> {
        let idx = *self.current_round.get(self.current_index).filter(|_| !self.finished)?;
        let item = &mut self.items[idx];
        let correct = item.challenge.check(answer);
        item.attempts += 1;
        item.is_passed = correct;

        let mut save = record(
            session,
            &item.challenge,
            answer,
            correct,
            &self.lesson.id,
            self.round_number,
            now,
        );

        self.advance();
        if self.finished {
            save = merge(save, session.complete_lesson(&self.lesson, now));
        }

        Some(AnswerOutcome {
            correct,
            correct_answer: self.items[idx].challenge.correct_answer.clone(),
            save,
            finished: self.finished,
        })
    }

    fn advance(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| !self.items[idx].is_passed)
            .collect();

        if failed.is_empty() {
            self.finished = true;
            log::debug!(
                "{}: run finished after {} round(s)",
                self.lesson.id,
                self.round_number
            );
            return;
        }
        self.current_round = failed;
        self.current_index = 0;
        self.round_number += 1;
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        if self.finished {
            return 0;
        }
        self.total_count() - self.current_index
    }

    /// An empty run is finished from the start.
    pub fn is_finished(&self) -> bool {
        self.finished || self.items.is_empty()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} exercises", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} exercises to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

fn record<S: PersistenceStore, T: Telemetry>(
    session: &mut TutorSession<S, T>,
    challenge: &ChallengeInstance,
    answer: &str,
    correct: bool,
    lesson_id: &str,
    round_number: usize,
    now: DateTime<Utc>,
) -> SaveStatus {
    if matches!(challenge.content, ChallengeContent::Intro) {
        return SaveStatus::Saved;
    }

    let mut ctx = AttemptContext::new(lesson_id, now);
    if round_number > 1 {
        ctx = ctx.boosting_mistake();
    }
    if !correct {
        ctx = ctx.with_details(format!("{}: answered '{}'", challenge.challenge_type, answer.trim()));
    }

    match (challenge.word(), correct) {
        (Some(word), true) => session.record_success(word, &ctx),
        (Some(word), false) => session.record_mistake(word, &ctx),
        (None, _) => session.record_lesson_attempt(correct, &ctx),
    }
}

fn merge(first: SaveStatus, second: SaveStatus) -> SaveStatus {
    match first {
        SaveStatus::Saved => second,
        unsaved => unsaved,
    }
}
