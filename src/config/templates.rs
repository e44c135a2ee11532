//! Lesson templates: an ordered list of phases, each gated by a difficulty and holding
//! the exercise directives to generate.
//!
//! Templates written as JSON are validated once when they are loaded. A template that
//! names an unknown exercise type, difficulty or phase is rejected up front instead of
//! being skipped during generation.

use super::{ChallengeTypeId, DifficultyLevel, Phase};
use crate::error::TemplateError;
use serde::Deserialize;

pub const DEFAULT_TEMPLATE_ID: &str = "standard";
pub const REVIEW_TEMPLATE_ID: &str = "review";
pub const FIX_PACK_TEMPLATE_ID: &str = "fix_pack";

/// How many items a directive takes from the lesson.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Count {
    All,
    Limit(usize),
}

impl Count {
    pub fn take(self, available: usize) -> usize {
        match self {
            Count::All => available,
            Count::Limit(n) => n.min(available),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    pub challenge_type: ChallengeTypeId,
    pub count: Count,
    pub optional: bool,
    pub shuffle: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplatePhase {
    pub phase: Phase,
    pub min_difficulty: DifficultyLevel,
    pub exercises: Vec<Directive>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonTemplate {
    pub id: String,
    pub phases: Vec<TemplatePhase>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Keyword(String),
    Number(i64),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDirective {
    #[serde(rename = "type")]
    challenge_type: String,
    #[serde(default = "raw_count_all")]
    count: RawCount,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    shuffle: bool,
}

fn raw_count_all() -> RawCount {
    RawCount::Keyword("all".to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPhase {
    phase: String,
    #[serde(default = "raw_beginner")]
    min_difficulty: String,
    #[serde(default)]
    exercises: Vec<RawDirective>,
}

fn raw_beginner() -> String {
    DifficultyLevel::Beginner.as_str().to_string()
}

#[derive(Deserialize)]
struct RawTemplate {
    id: String,
    phases: Vec<RawPhase>,
}

impl RawTemplate {
    fn validate(self) -> Result<LessonTemplate, TemplateError> {
        let template = self.id;
        let mut phases = Vec::with_capacity(self.phases.len());
        let mut previous: Option<Phase> = None;

        for raw_phase in self.phases {
            let phase = Phase::parse(&raw_phase.phase).ok_or_else(|| TemplateError::UnknownPhase {
                template: template.clone(),
                phase: raw_phase.phase.clone(),
            })?;
            if previous.is_some_and(|p| p > phase) {
                return Err(TemplateError::PhaseOutOfOrder {
                    template,
                    phase: raw_phase.phase,
                });
            }
            previous = Some(phase);

            let min_difficulty = DifficultyLevel::parse(&raw_phase.min_difficulty).ok_or_else(|| {
                TemplateError::UnknownDifficulty {
                    template: template.clone(),
                    difficulty: raw_phase.min_difficulty.clone(),
                }
            })?;

            let mut exercises = Vec::with_capacity(raw_phase.exercises.len());
            for raw in raw_phase.exercises {
                let challenge_type = ChallengeTypeId::parse(&raw.challenge_type).ok_or_else(|| {
                    TemplateError::UnknownChallengeType {
                        template: template.clone(),
                        challenge_type: raw.challenge_type.clone(),
                    }
                })?;
                let count = match raw.count {
                    RawCount::Keyword(k) if k.eq_ignore_ascii_case("all") => Count::All,
                    RawCount::Number(n) if n > 0 => Count::Limit(n as usize),
                    _ => {
                        return Err(TemplateError::InvalidCount {
                            template,
                            challenge_type: raw.challenge_type,
                        });
                    }
                };
                exercises.push(Directive {
                    challenge_type,
                    count,
                    optional: raw.optional,
                    shuffle: raw.shuffle,
                });
            }

            phases.push(TemplatePhase {
                phase,
                min_difficulty,
                exercises,
            });
        }

        Ok(LessonTemplate {
            id: template,
            phases,
        })
    }
}

/// All templates available to a session, validated.
#[derive(Clone, Debug)]
pub struct TemplateSet {
    templates: Vec<LessonTemplate>,
}

impl TemplateSet {
    /// Parses and validates a JSON array of templates. Built-in templates are kept
    /// unless the JSON redefines them.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let raw: Vec<RawTemplate> =
            serde_json::from_str(json).map_err(|e| TemplateError::Parse {
                template: "<templates>".to_string(),
                message: e.to_string(),
            })?;

        let mut loaded: Vec<LessonTemplate> = Vec::with_capacity(raw.len());
        for template in raw {
            let template = template.validate()?;
            if loaded.iter().any(|t| t.id == template.id) {
                return Err(TemplateError::DuplicateTemplate(template.id));
            }
            loaded.push(template);
        }

        let mut set = Self::builtin();
        for template in loaded {
            match set.templates.iter_mut().find(|t| t.id == template.id) {
                Some(existing) => *existing = template,
                None => set.templates.push(template),
            }
        }
        log::debug!("loaded {} lesson templates", set.templates.len());
        Ok(set)
    }

    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&LessonTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Template by id, falling back to the standard template.
    pub fn get(&self, id: &str) -> &LessonTemplate {
        if let Some(template) = self.find(id) {
            return template;
        }
        log::warn!("unknown template '{}', using '{}'", id, DEFAULT_TEMPLATE_ID);
        self.find(DEFAULT_TEMPLATE_ID)
            .or(self.templates.first())
            .unwrap_or(&FALLBACK_TEMPLATE)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.id.as_str())
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}

static FALLBACK_TEMPLATE: LessonTemplate = LessonTemplate {
    id: String::new(),
    phases: Vec::new(),
};

fn directive(challenge_type: ChallengeTypeId, count: Count, shuffle: bool) -> Directive {
    Directive {
        challenge_type,
        count,
        optional: false,
        shuffle,
    }
}

fn optional(challenge_type: ChallengeTypeId, count: Count) -> Directive {
    Directive {
        challenge_type,
        count,
        optional: true,
        shuffle: true,
    }
}

fn phase(phase: Phase, min_difficulty: DifficultyLevel, exercises: Vec<Directive>) -> TemplatePhase {
    TemplatePhase {
        phase,
        min_difficulty,
        exercises,
    }
}

fn builtin_templates() -> Vec<LessonTemplate> {
    use ChallengeTypeId::*;
    use Count::{All, Limit};
    use DifficultyLevel::*;

    vec![
        LessonTemplate {
            id: DEFAULT_TEMPLATE_ID.to_string(),
            phases: vec![
                phase(
                    Phase::Recognition,
                    Beginner,
                    vec![
                        directive(LearnWord, All, false),
                        directive(McqPtEn, All, true),
                        optional(ImageSelect, Limit(4)),
                        optional(ListenSelect, Limit(4)),
                    ],
                ),
                phase(
                    Phase::Recall,
                    Beginner,
                    vec![directive(McqEnPt, All, true), directive(MatchPairs, Limit(1), true)],
                ),
                phase(
                    Phase::Production,
                    Intermediate,
                    vec![
                        directive(TypeTranslation, All, true),
                        directive(Cloze, Limit(3), true),
                        directive(WordOrder, Limit(3), true),
                    ],
                ),
                phase(
                    Phase::Application,
                    Advanced,
                    vec![
                        directive(SentenceBuilder, Limit(3), true),
                        directive(MinimalPair, All, false),
                        optional(SpeakWord, Limit(3)),
                    ],
                ),
                phase(
                    Phase::Mastery,
                    Hard,
                    vec![directive(Dictation, Limit(2), true), directive(FreeTranslation, Limit(2), true)],
                ),
            ],
        },
        LessonTemplate {
            id: "vocabulary".to_string(),
            phases: vec![
                phase(
                    Phase::Recognition,
                    Beginner,
                    vec![
                        directive(LearnWord, All, false),
                        directive(McqPtEn, All, true),
                        optional(ImageSelect, All),
                    ],
                ),
                phase(
                    Phase::Recall,
                    Beginner,
                    vec![directive(McqEnPt, All, true), directive(MatchPairs, Limit(2), true)],
                ),
                phase(Phase::Production, Intermediate, vec![directive(TypeTranslation, All, true)]),
                phase(
                    Phase::Application,
                    Advanced,
                    vec![directive(MinimalPair, All, true), optional(SpeakWord, All)],
                ),
            ],
        },
        LessonTemplate {
            id: "conversation".to_string(),
            phases: vec![
                phase(
                    Phase::Recognition,
                    Beginner,
                    vec![directive(LearnWord, Limit(5), false), directive(McqPtEn, Limit(5), true)],
                ),
                phase(Phase::Recall, Beginner, vec![directive(McqEnPt, Limit(5), true)]),
                phase(
                    Phase::Production,
                    Intermediate,
                    vec![directive(WordOrder, All, true), directive(Cloze, All, true)],
                ),
                phase(
                    Phase::Application,
                    Advanced,
                    vec![directive(DialogueReply, All, false), directive(SentenceBuilder, All, true)],
                ),
                phase(
                    Phase::Mastery,
                    Hard,
                    vec![directive(FreeTranslation, All, true), optional(Dictation, Limit(3))],
                ),
            ],
        },
        LessonTemplate {
            id: REVIEW_TEMPLATE_ID.to_string(),
            phases: vec![
                phase(Phase::Recognition, Beginner, vec![directive(McqPtEn, All, true)]),
                phase(Phase::Recall, Beginner, vec![directive(McqEnPt, All, true)]),
                phase(
                    Phase::Production,
                    Intermediate,
                    vec![directive(TypeTranslation, All, true), optional(SpeakWord, All)],
                ),
            ],
        },
        LessonTemplate {
            id: FIX_PACK_TEMPLATE_ID.to_string(),
            phases: vec![
                phase(Phase::Recognition, Beginner, vec![directive(LearnWord, All, false)]),
                phase(Phase::Recall, Beginner, vec![directive(McqEnPt, All, true)]),
                phase(Phase::Production, Intermediate, vec![directive(TypeTranslation, All, true)]),
            ],
        },
    ]
}
