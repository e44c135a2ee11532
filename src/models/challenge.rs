//! Generated exercise instances. They are built per session and never persisted.
use super::word::{Dialogue, MinimalPair, Sentence, Word};
use crate::config::{ChallengeTypeId, Direction, Phase};
use crate::engine::answers::{normalize_answer, transcript_matches};
use serde::Serialize;

/// Lesson item an instance was generated from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChallengeSource {
    Word { word: Word },
    Sentence { sentence: Sentence },
    MinimalPair { pair: MinimalPair },
    Dialogue { dialogue: Dialogue, line: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChallengeContent {
    /// Presentation card, no answer expected.
    Intro,
    /// Pick one option.
    Options { options: Vec<String> },
    /// Arrange tiles; `tiles` may contain distractors.
    Tiles { tiles: Vec<String> },
    /// Fill the blank between `before` and `after` with one of `options`.
    Cloze {
        before: String,
        after: String,
        options: Vec<String>,
    },
    /// Type the answer; any of `accepted` is correct.
    FreeText { accepted: Vec<String> },
    /// Say `expected` out loud.
    Speech { expected: String },
    /// Match every left item with its right item.
    Pairs { left: Vec<String>, right: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeInstance {
    #[serde(rename = "type")]
    pub challenge_type: ChallengeTypeId,
    pub phase: Phase,
    pub direction: Option<Direction>,
    pub source: ChallengeSource,
    pub prompt: String,
    /// Text to play through the speech engine, if the exercise has audio.
    pub audio_text: Option<String>,
    pub content: ChallengeContent,
    pub correct_answer: String,
}

/// Separator used for match-pairs answers: `pt=en; pt=en`.
pub const PAIR_SEPARATOR: &str = "; ";

impl ChallengeInstance {
    /// Options for option-set exercises.
    pub fn options(&self) -> Option<&[String]> {
        match &self.content {
            ChallengeContent::Options { options } | ChallengeContent::Cloze { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }

    /// Word the instance exercises, if it was built from one.
    pub fn word(&self) -> Option<&Word> {
        match &self.source {
            ChallengeSource::Word { word } => Some(word),
            _ => None,
        }
    }

    /// Whether `answer` is accepted. Comparisons ignore case, surrounding punctuation
    /// and repeated whitespace. Speech answers are transcripts.
    pub fn check(&self, answer: &str) -> bool {
        match &self.content {
            ChallengeContent::Intro => true,
            ChallengeContent::FreeText { accepted } => {
                let given = normalize_answer(answer);
                !given.is_empty() && accepted.iter().any(|a| normalize_answer(a) == given)
            }
            ChallengeContent::Speech { expected } => transcript_matches(answer, expected),
            ChallengeContent::Pairs { .. } => {
                let mut given: Vec<String> = answer
                    .split(PAIR_SEPARATOR.trim())
                    .map(normalize_answer)
                    .filter(|s| !s.is_empty())
                    .collect();
                let mut expected: Vec<String> = self
                    .correct_answer
                    .split(PAIR_SEPARATOR.trim())
                    .map(normalize_answer)
                    .filter(|s| !s.is_empty())
                    .collect();
                given.sort();
                expected.sort();
                given == expected
            }
            _ => normalize_answer(answer) == normalize_answer(&self.correct_answer),
        }
    }
}
