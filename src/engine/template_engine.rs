//! Expands a lesson template into the ordered list of exercises for one session.
//!
//! Output order is the template's phase order; phases are never interleaved. Within a
//! phase, directives run in order and each one produces at most `count` instances.

use super::builder::{self, SourceItem};
use super::progression;
use crate::config::{
    DifficultyLevel, Directive, LessonResources, LessonTemplate, SourceKind, TemplateSet,
};
use crate::models::{ChallengeInstance, Lesson, LessonProgressSnapshot};
use rand::Rng;
use rand::seq::SliceRandom;

pub struct TemplateEngine<'a> {
    templates: &'a TemplateSet,
    audio_available: bool,
    include_optional: bool,
}

impl<'a> TemplateEngine<'a> {
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self {
            templates,
            audio_available: false,
            include_optional: true,
        }
    }

    /// Whether the session can play and record audio.
    pub fn with_audio(mut self, available: bool) -> Self {
        self.audio_available = available;
        self
    }

    /// Whether directives marked optional are generated.
    pub fn with_optional(mut self, include: bool) -> Self {
        self.include_optional = include;
        self
    }

    /// Generates the session for `lesson` using its own template, at the requested
    /// difficulty capped by what the snapshot has unlocked.
    pub fn expand_for_snapshot<R: Rng + ?Sized>(
        &self,
        lesson: &Lesson,
        requested: DifficultyLevel,
        snapshot: &LessonProgressSnapshot,
        rng: &mut R,
    ) -> Vec<ChallengeInstance> {
        let effective = progression::effective_difficulty(requested, snapshot);
        let template = self.templates.get(&lesson.template_id);
        self.expand(lesson, template, effective, rng)
    }

    pub fn expand<R: Rng + ?Sized>(
        &self,
        lesson: &Lesson,
        template: &LessonTemplate,
        effective: DifficultyLevel,
        rng: &mut R,
    ) -> Vec<ChallengeInstance> {
        let resources = LessonResources::of(lesson, self.audio_available);
        let mut out = Vec::new();

        for phase in &template.phases {
            if phase.min_difficulty > effective {
                log::debug!(
                    "{}: skipping phase {} (needs {}, running at {})",
                    lesson.id,
                    phase.phase.as_str(),
                    phase.min_difficulty,
                    effective
                );
                continue;
            }
            for directive in &phase.exercises {
                if !self.directive_applies(directive, &resources, effective) {
                    continue;
                }
                out.extend(self.run_directive(directive, lesson, rng));
            }
        }

        log::debug!(
            "{}: generated {} challenges with template '{}' at {}",
            lesson.id,
            out.len(),
            template.id,
            effective
        );
        out
    }

    fn directive_applies(
        &self,
        directive: &Directive,
        resources: &LessonResources,
        effective: DifficultyLevel,
    ) -> bool {
        let meta = directive.challenge_type.meta();
        if directive.optional && !self.include_optional {
            return false;
        }
        if meta.min_difficulty > effective {
            return false;
        }
        if !resources.satisfies(&meta.requirements) {
            log::debug!("skipping {}: lesson lacks a required resource", meta.id);
            return false;
        }
        true
    }

    fn run_directive<R: Rng + ?Sized>(
        &self,
        directive: &Directive,
        lesson: &Lesson,
        rng: &mut R,
    ) -> Vec<ChallengeInstance> {
        let challenge_type = directive.challenge_type;
        let mut items = source_items(challenge_type.meta().source, lesson);
        if directive.shuffle {
            items.shuffle(rng);
        }

        // Items that cannot carry the exercise are skipped without using up the count.
        let limit = directive.count.take(items.len());
        let mut out = Vec::with_capacity(limit);
        for item in items {
            if out.len() >= limit {
                break;
            }
            if let Some(instance) = builder::build(challenge_type, item, lesson, rng) {
                out.push(instance);
            }
        }
        out
    }
}

fn source_items(kind: SourceKind, lesson: &Lesson) -> Vec<SourceItem<'_>> {
    match kind {
        SourceKind::Words => lesson.words.iter().map(SourceItem::Word).collect(),
        SourceKind::Sentences => lesson.sentences.iter().map(SourceItem::Sentence).collect(),
        SourceKind::MinimalPairs => lesson.minimal_pairs.iter().map(SourceItem::MinimalPair).collect(),
        SourceKind::Dialogues => lesson.dialogues.iter().map(SourceItem::Dialogue).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChallengeTypeId, Count, Phase, TemplatePhase};
    use crate::models::{Sentence, Word};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lesson() -> Lesson {
        Lesson {
            id: "greetings".to_string(),
            words: vec![
                Word::new("olá", "hello"),
                Word::new("adeus", "goodbye"),
                Word::new("obrigado", "thank you"),
                Word::new("por favor", "please"),
            ],
            sentences: vec![
                Sentence::new("Olá, como está?", "Hello, how are you?"),
                Sentence::new("Muito obrigado pela ajuda.", "Thank you very much for the help."),
            ],
            ..Default::default()
        }
    }

    fn directive(challenge_type: ChallengeTypeId, count: Count) -> Directive {
        Directive {
            challenge_type,
            count,
            optional: false,
            shuffle: true,
        }
    }

    fn types(challenges: &[ChallengeInstance]) -> Vec<ChallengeTypeId> {
        challenges.iter().map(|c| c.challenge_type).collect()
    }

    #[test]
    fn test_beginner_gets_recognition_and_recall_only() {
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates);
        let lesson = lesson();
        let out = engine.expand(
            &lesson,
            templates.get("standard"),
            DifficultyLevel::Beginner,
            &mut ChaCha8Rng::seed_from_u64(1),
        );

        assert!(out.iter().all(|c| c.phase <= Phase::Recall));
        // learn_word + mcq_pt_en + mcq_en_pt for each word; match_pairs is intermediate
        assert_eq!(out.len(), 12);
        assert!(!types(&out).contains(&ChallengeTypeId::MatchPairs));
        assert!(!types(&out).contains(&ChallengeTypeId::ImageSelect));
        assert!(!types(&out).contains(&ChallengeTypeId::ListenSelect));
    }

    #[test]
    fn test_phase_order_is_preserved() {
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates).with_audio(true);
        let out = engine.expand(
            &lesson(),
            templates.get("standard"),
            DifficultyLevel::Hard,
            &mut ChaCha8Rng::seed_from_u64(2),
        );

        let phases: Vec<Phase> = out.iter().map(|c| c.phase).collect();
        let mut sorted = phases.clone();
        sorted.sort();
        assert_eq!(phases, sorted);
        assert!(phases.contains(&Phase::Mastery));
    }

    #[test]
    fn test_advanced_phase_is_omitted_for_beginners() {
        let template = LessonTemplate {
            id: "t".to_string(),
            phases: vec![TemplatePhase {
                phase: Phase::Application,
                min_difficulty: DifficultyLevel::Advanced,
                exercises: vec![directive(ChallengeTypeId::McqPtEn, Count::All)],
            }],
        };
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert!(engine
            .expand(&lesson(), &template, DifficultyLevel::Beginner, &mut rng)
            .is_empty());
        assert_eq!(
            engine
                .expand(&lesson(), &template, DifficultyLevel::Advanced, &mut rng)
                .len(),
            4
        );
    }

    #[test]
    fn test_missing_resources_skip_directives() {
        let mut lesson = lesson();
        lesson.sentences.clear();
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates);
        let out = engine.expand(
            &lesson,
            templates.get("standard"),
            DifficultyLevel::Hard,
            &mut ChaCha8Rng::seed_from_u64(4),
        );

        assert!(!out.is_empty());
        for challenge in &out {
            assert!(!challenge.challenge_type.meta().requirements.sentences);
            assert!(!challenge.challenge_type.meta().requirements.audio);
        }
    }

    #[test]
    fn test_count_limits_items() {
        let template = LessonTemplate {
            id: "t".to_string(),
            phases: vec![TemplatePhase {
                phase: Phase::Recognition,
                min_difficulty: DifficultyLevel::Beginner,
                exercises: vec![directive(ChallengeTypeId::McqPtEn, Count::Limit(2))],
            }],
        };
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates);
        let out = engine.expand(
            &lesson(),
            &template,
            DifficultyLevel::Beginner,
            &mut ChaCha8Rng::seed_from_u64(5),
        );

        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_optional_directives_can_be_disabled() {
        let mut lesson = lesson();
        lesson.words[0].image = Some("ola.png".to_string());
        let templates = TemplateSet::builtin();
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let with = TemplateEngine::new(&templates).expand(
            &lesson,
            templates.get("standard"),
            DifficultyLevel::Beginner,
            &mut rng,
        );
        let without = TemplateEngine::new(&templates).with_optional(false).expand(
            &lesson,
            templates.get("standard"),
            DifficultyLevel::Beginner,
            &mut rng,
        );

        assert!(types(&with).contains(&ChallengeTypeId::ImageSelect));
        assert!(!types(&without).contains(&ChallengeTypeId::ImageSelect));
    }

    #[test]
    fn test_empty_lesson_yields_no_challenges() {
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates).with_audio(true);
        let out = engine.expand(
            &Lesson::default(),
            templates.get("standard"),
            DifficultyLevel::Hard,
            &mut ChaCha8Rng::seed_from_u64(7),
        );

        assert!(out.is_empty());
    }

    #[test]
    fn test_expand_is_reproducible_with_same_seed() {
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates).with_audio(true);
        let lesson = lesson();

        let first = engine.expand(
            &lesson,
            templates.get("standard"),
            DifficultyLevel::Hard,
            &mut ChaCha8Rng::seed_from_u64(99),
        );
        let second = engine.expand(
            &lesson,
            templates.get("standard"),
            DifficultyLevel::Hard,
            &mut ChaCha8Rng::seed_from_u64(99),
        );

        assert_eq!(first, second);
    }

    #[test]
    fn test_requested_difficulty_is_capped_by_progress() {
        let templates = TemplateSet::builtin();
        let engine = TemplateEngine::new(&templates);
        let fresh = LessonProgressSnapshot::default();

        let out = engine.expand_for_snapshot(
            &lesson(),
            DifficultyLevel::Hard,
            &fresh,
            &mut ChaCha8Rng::seed_from_u64(8),
        );
        assert!(out.iter().all(|c| c.challenge_type.meta().min_difficulty == DifficultyLevel::Beginner));

        let practiced = LessonProgressSnapshot {
            accuracy: 75,
            completions: 1,
        };
        let out = engine.expand_for_snapshot(
            &lesson(),
            DifficultyLevel::Hard,
            &practiced,
            &mut ChaCha8Rng::seed_from_u64(8),
        );
        assert!(types(&out).contains(&ChallengeTypeId::TypeTranslation));
        assert!(!types(&out).contains(&ChallengeTypeId::SentenceBuilder));
    }
}
