//! Builds one exercise instance from one lesson item.
//!
//! Two generation patterns cover most types:
//! - option sets: the correct answer plus distractors drawn from the rest of the lesson,
//!   topped up from a generic pool when the lesson is too small;
//! - token sequences: a sentence split into tiles (or a blank), with distractor tokens
//!   taken from other sentences and never from the target sentence itself.
//!
//! All randomness comes from the caller's RNG so a seeded RNG reproduces a session.

use super::answers::normalize_answer;
use crate::config::ChallengeTypeId;
use crate::models::challenge::PAIR_SEPARATOR;
use crate::models::{
    ChallengeContent, ChallengeInstance, ChallengeSource, Dialogue, Lesson, MinimalPair, Sentence,
    Word,
};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

pub const DEFAULT_OPTION_COUNT: usize = 4;
/// Extra tiles mixed into sentence-builder exercises.
pub const EXTRA_TILES: usize = 2;
const MATCH_PAIRS_SIZE: usize = 4;
const MAX_RESHUFFLES: usize = 3;

const GENERIC_PT: &[&str] = &["casa", "gato", "livro", "água", "sol", "mesa", "pão", "rua"];
const GENERIC_EN: &[&str] = &["house", "cat", "book", "water", "sun", "table", "bread", "street"];
const FILLER_TOKENS: &[&str] = &["muito", "também", "sempre", "aqui", "hoje", "mas", "com", "ainda"];
const GENERIC_REPLIES: &[&str] = &["Bom dia!", "Até logo.", "Com licença.", "Não sei.", "Muito obrigado."];

/// A lesson item selected by a template directive.
#[derive(Clone, Copy, Debug)]
pub enum SourceItem<'a> {
    Word(&'a Word),
    Sentence(&'a Sentence),
    MinimalPair(&'a MinimalPair),
    Dialogue(&'a Dialogue),
}

/// Builds an instance of `challenge_type` for `item`. Returns `None` when the item cannot
/// carry that exercise (wrong item kind, a one-token sentence, a word without an image).
pub fn build<R: Rng + ?Sized>(
    challenge_type: ChallengeTypeId,
    item: SourceItem<'_>,
    lesson: &Lesson,
    rng: &mut R,
) -> Option<ChallengeInstance> {
    use ChallengeTypeId as T;

    match (challenge_type, item) {
        (T::LearnWord, SourceItem::Word(word)) => Some(learn_word(word)),
        (T::McqPtEn, SourceItem::Word(word)) => Some(mcq_pt_en(word, lesson, rng)),
        (T::ImageSelect, SourceItem::Word(word)) => image_select(word, lesson, rng),
        (T::ListenSelect, SourceItem::Word(word)) => Some(listen_select(word, lesson, rng)),
        (T::McqEnPt, SourceItem::Word(word)) => Some(mcq_en_pt(word, lesson, rng)),
        (T::MatchPairs, SourceItem::Word(word)) => match_pairs(word, lesson, rng),
        (T::TypeTranslation, SourceItem::Word(word)) => Some(type_translation(word)),
        (T::SpeakWord, SourceItem::Word(word)) => Some(speak_word(word)),
        (T::Cloze, SourceItem::Sentence(sentence)) => cloze(sentence, lesson, rng),
        (T::WordOrder, SourceItem::Sentence(sentence)) => word_order(sentence, rng),
        (T::SentenceBuilder, SourceItem::Sentence(sentence)) => {
            sentence_builder(sentence, lesson, rng)
        }
        (T::Dictation, SourceItem::Sentence(sentence)) => Some(dictation(sentence)),
        (T::FreeTranslation, SourceItem::Sentence(sentence)) => Some(free_translation(sentence)),
        (T::MinimalPair, SourceItem::MinimalPair(pair)) => minimal_pair(pair, rng),
        (T::DialogueReply, SourceItem::Dialogue(dialogue)) => {
            dialogue_reply(dialogue, lesson, rng)
        }
        _ => None,
    }
}

fn instance(
    challenge_type: ChallengeTypeId,
    source: ChallengeSource,
    prompt: &str,
    content: ChallengeContent,
    correct_answer: &str,
    audio_text: Option<&str>,
) -> ChallengeInstance {
    let meta = challenge_type.meta();
    ChallengeInstance {
        challenge_type,
        phase: meta.phase,
        direction: meta.direction,
        source,
        prompt: prompt.to_string(),
        audio_text: audio_text.map(str::to_string),
        content,
        correct_answer: correct_answer.to_string(),
    }
}

fn word_source(word: &Word) -> ChallengeSource {
    ChallengeSource::Word { word: word.clone() }
}

fn sentence_source(sentence: &Sentence) -> ChallengeSource {
    ChallengeSource::Sentence {
        sentence: sentence.clone(),
    }
}

/// Draws up to `n` distinct distractors: shuffled `pool` first, then shuffled `fallback`.
/// Anything whose normalized form is already in `exclude` is skipped; chosen values are
/// added to `exclude`.
fn draw_distractors<R: Rng + ?Sized>(
    pool: Vec<String>,
    fallback: &[&str],
    exclude: &mut HashSet<String>,
    n: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut candidates = distinct_unseen(pool, exclude);
    candidates.shuffle(rng);
    candidates.truncate(n);
    for c in &candidates {
        exclude.insert(normalize_answer(c));
    }

    if candidates.len() < n {
        let mut extra = distinct_unseen(fallback.iter().map(|s| s.to_string()).collect(), exclude);
        extra.shuffle(rng);
        extra.truncate(n - candidates.len());
        for c in &extra {
            exclude.insert(normalize_answer(c));
        }
        candidates.extend(extra);
    }
    candidates
}

fn distinct_unseen(items: Vec<String>, exclude: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let key = normalize_answer(item);
            !key.is_empty() && !exclude.contains(&key) && seen.insert(key)
        })
        .collect()
}

/// `target` shuffled options containing `correct` exactly once and no duplicates.
pub fn option_set<R: Rng + ?Sized>(
    correct: &str,
    pool: Vec<String>,
    fallback: &[&str],
    target: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut exclude = HashSet::from([normalize_answer(correct)]);
    let mut options = draw_distractors(pool, fallback, &mut exclude, target.max(1) - 1, rng);
    options.push(correct.to_string());
    options.shuffle(rng);
    options
}

fn other_words<'a>(word: &'a Word, lesson: &'a Lesson) -> impl Iterator<Item = &'a Word> {
    let key = word.key();
    lesson.words.iter().filter(move |w| w.key() != key)
}

fn learn_word(word: &Word) -> ChallengeInstance {
    instance(
        ChallengeTypeId::LearnWord,
        word_source(word),
        &word.pt,
        ChallengeContent::Intro,
        &word.en,
        Some(&word.pt),
    )
}

fn mcq_pt_en<R: Rng + ?Sized>(word: &Word, lesson: &Lesson, rng: &mut R) -> ChallengeInstance {
    let pool = other_words(word, lesson).map(|w| w.en.clone()).collect();
    let options = option_set(&word.en, pool, GENERIC_EN, DEFAULT_OPTION_COUNT, rng);
    instance(
        ChallengeTypeId::McqPtEn,
        word_source(word),
        &word.pt,
        ChallengeContent::Options { options },
        &word.en,
        Some(&word.pt),
    )
}

fn mcq_en_pt<R: Rng + ?Sized>(word: &Word, lesson: &Lesson, rng: &mut R) -> ChallengeInstance {
    let pool = other_words(word, lesson).map(|w| w.pt.clone()).collect();
    let options = option_set(&word.pt, pool, GENERIC_PT, DEFAULT_OPTION_COUNT, rng);
    instance(
        ChallengeTypeId::McqEnPt,
        word_source(word),
        &word.en,
        ChallengeContent::Options { options },
        &word.pt,
        None,
    )
}

fn image_select<R: Rng + ?Sized>(
    word: &Word,
    lesson: &Lesson,
    rng: &mut R,
) -> Option<ChallengeInstance> {
    let image = word.image.as_deref().filter(|_| word.has_image())?;
    let pool = other_words(word, lesson).map(|w| w.pt.clone()).collect();
    let options = option_set(&word.pt, pool, GENERIC_PT, DEFAULT_OPTION_COUNT, rng);
    Some(instance(
        ChallengeTypeId::ImageSelect,
        word_source(word),
        image,
        ChallengeContent::Options { options },
        &word.pt,
        None,
    ))
}

fn listen_select<R: Rng + ?Sized>(word: &Word, lesson: &Lesson, rng: &mut R) -> ChallengeInstance {
    let pool = other_words(word, lesson).map(|w| w.pt.clone()).collect();
    let options = option_set(&word.pt, pool, GENERIC_PT, DEFAULT_OPTION_COUNT, rng);
    instance(
        ChallengeTypeId::ListenSelect,
        word_source(word),
        "",
        ChallengeContent::Options { options },
        &word.pt,
        Some(&word.pt),
    )
}

fn match_pairs<R: Rng + ?Sized>(
    word: &Word,
    lesson: &Lesson,
    rng: &mut R,
) -> Option<ChallengeInstance> {
    let mut seen_pt = HashSet::from([normalize_answer(&word.pt)]);
    let mut seen_en = HashSet::from([normalize_answer(&word.en)]);
    let mut others: Vec<&Word> = other_words(word, lesson)
        .filter(|w| {
            let (pt, en) = (normalize_answer(&w.pt), normalize_answer(&w.en));
            if seen_pt.contains(&pt) || seen_en.contains(&en) {
                return false;
            }
            seen_pt.insert(pt);
            seen_en.insert(en);
            true
        })
        .collect();
    if others.is_empty() {
        return None;
    }
    others.shuffle(rng);
    others.truncate(MATCH_PAIRS_SIZE - 1);

    let chosen: Vec<&Word> = std::iter::once(word).chain(others).collect();
    let mut left: Vec<String> = chosen.iter().map(|w| w.pt.clone()).collect();
    let mut right: Vec<String> = chosen.iter().map(|w| w.en.clone()).collect();
    left.shuffle(rng);
    right.shuffle(rng);
    let answer = chosen
        .iter()
        .map(|w| format!("{}={}", w.pt, w.en))
        .collect::<Vec<_>>()
        .join(PAIR_SEPARATOR);

    Some(instance(
        ChallengeTypeId::MatchPairs,
        word_source(word),
        "",
        ChallengeContent::Pairs { left, right },
        &answer,
        None,
    ))
}

fn type_translation(word: &Word) -> ChallengeInstance {
    let mut accepted = vec![word.pt.clone()];
    accepted.extend(word.pt_alternate.iter().filter(|a| !a.trim().is_empty()).cloned());
    instance(
        ChallengeTypeId::TypeTranslation,
        word_source(word),
        &word.en,
        ChallengeContent::FreeText { accepted },
        &word.pt,
        None,
    )
}

fn speak_word(word: &Word) -> ChallengeInstance {
    instance(
        ChallengeTypeId::SpeakWord,
        word_source(word),
        &word.pt,
        ChallengeContent::Speech {
            expected: word.pt.clone(),
        },
        &word.pt,
        Some(&word.pt),
    )
}

/// Splits a raw token into leading punctuation, the word itself and trailing punctuation.
fn token_parts(token: &str) -> (&str, &str, &str) {
    let is_edge = |c: char| !c.is_alphanumeric() && c != '\'' && c != '-';
    let core_start = token.len() - token.trim_start_matches(is_edge).len();
    let core_end = token.trim_end_matches(is_edge).len().max(core_start);
    (
        &token[..core_start],
        &token[core_start..core_end],
        &token[core_end..],
    )
}

fn bare_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| token_parts(t).1.to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Tokens of the other sentences that do not appear (case-insensitively) in `target`.
fn foreign_tokens(target: &Sentence, lesson: &Lesson) -> (Vec<String>, HashSet<String>) {
    let in_target: HashSet<String> = bare_tokens(&target.pt)
        .iter()
        .map(|t| normalize_answer(t))
        .collect();
    let pool = lesson
        .sentences
        .iter()
        .filter(|s| *s != target)
        .flat_map(|s| bare_tokens(&s.pt))
        .filter(|t| !in_target.contains(&normalize_answer(t)))
        .collect();
    (pool, in_target)
}

fn cloze<R: Rng + ?Sized>(
    sentence: &Sentence,
    lesson: &Lesson,
    rng: &mut R,
) -> Option<ChallengeInstance> {
    let raw: Vec<&str> = sentence.pt.split_whitespace().collect();
    let candidates: Vec<usize> = (0..raw.len())
        .filter(|&i| !token_parts(raw[i]).1.is_empty())
        .collect();
    if raw.len() < 2 || candidates.is_empty() {
        return None;
    }

    let blank = candidates[rng.random_range(0..candidates.len())];
    let (lead, answer, trail) = token_parts(raw[blank]);
    let before = format!("{} {}", raw[..blank].join(" "), lead);
    let after = format!("{} {}", trail, raw[blank + 1..].join(" "));

    let (pool, mut exclude) = foreign_tokens(sentence, lesson);
    let mut options = draw_distractors(pool, FILLER_TOKENS, &mut exclude, DEFAULT_OPTION_COUNT - 1, rng);
    options.push(answer.to_string());
    options.shuffle(rng);

    Some(instance(
        ChallengeTypeId::Cloze,
        sentence_source(sentence),
        &sentence.en,
        ChallengeContent::Cloze {
            before: before.trim().to_string(),
            after: after.trim().to_string(),
            options,
        },
        answer,
        None,
    ))
}

/// Shuffles `tiles`, retrying a few times when the result is still in reading order.
fn scramble<R: Rng + ?Sized>(tiles: &mut [String], original: &[String], rng: &mut R) {
    for _ in 0..MAX_RESHUFFLES {
        tiles.shuffle(rng);
        if tiles != original {
            return;
        }
    }
    tiles.rotate_left(1);
}

fn word_order<R: Rng + ?Sized>(sentence: &Sentence, rng: &mut R) -> Option<ChallengeInstance> {
    let original: Vec<String> = sentence.pt.split_whitespace().map(str::to_string).collect();
    if original.len() < 2 {
        return None;
    }
    let mut tiles = original.clone();
    scramble(&mut tiles, &original, rng);

    Some(instance(
        ChallengeTypeId::WordOrder,
        sentence_source(sentence),
        &sentence.en,
        ChallengeContent::Tiles { tiles },
        &original.join(" "),
        None,
    ))
}

fn sentence_builder<R: Rng + ?Sized>(
    sentence: &Sentence,
    lesson: &Lesson,
    rng: &mut R,
) -> Option<ChallengeInstance> {
    let original: Vec<String> = sentence.pt.split_whitespace().map(str::to_string).collect();
    if original.len() < 2 {
        return None;
    }
    let (pool, mut exclude) = foreign_tokens(sentence, lesson);
    let extras = draw_distractors(pool, FILLER_TOKENS, &mut exclude, EXTRA_TILES, rng);

    let mut tiles = original.clone();
    tiles.extend(extras);
    tiles.shuffle(rng);

    Some(instance(
        ChallengeTypeId::SentenceBuilder,
        sentence_source(sentence),
        &sentence.en,
        ChallengeContent::Tiles { tiles },
        &original.join(" "),
        None,
    ))
}

fn dictation(sentence: &Sentence) -> ChallengeInstance {
    instance(
        ChallengeTypeId::Dictation,
        sentence_source(sentence),
        &sentence.en,
        ChallengeContent::FreeText {
            accepted: vec![sentence.pt.clone()],
        },
        &sentence.pt,
        Some(&sentence.pt),
    )
}

fn free_translation(sentence: &Sentence) -> ChallengeInstance {
    instance(
        ChallengeTypeId::FreeTranslation,
        sentence_source(sentence),
        &sentence.en,
        ChallengeContent::FreeText {
            accepted: vec![sentence.pt.clone()],
        },
        &sentence.pt,
        None,
    )
}

fn minimal_pair<R: Rng + ?Sized>(pair: &MinimalPair, rng: &mut R) -> Option<ChallengeInstance> {
    if normalize_answer(&pair.a.pt) == normalize_answer(&pair.b.pt) {
        return None;
    }
    let (target, other) = if rng.random_bool(0.5) {
        (&pair.a, &pair.b)
    } else {
        (&pair.b, &pair.a)
    };
    let options = option_set(&target.pt, vec![other.pt.clone()], &[], 2, rng);

    Some(instance(
        ChallengeTypeId::MinimalPair,
        ChallengeSource::MinimalPair { pair: pair.clone() },
        pair.hint.as_deref().unwrap_or(""),
        ChallengeContent::Options { options },
        &target.pt,
        Some(&target.pt),
    ))
}

fn dialogue_reply<R: Rng + ?Sized>(
    dialogue: &Dialogue,
    lesson: &Lesson,
    rng: &mut R,
) -> Option<ChallengeInstance> {
    if dialogue.lines.len() < 2 {
        return None;
    }
    let line = rng.random_range(1..dialogue.lines.len());
    let cue = &dialogue.lines[line - 1];
    let reply = &dialogue.lines[line];

    let pool = lesson
        .dialogues
        .iter()
        .flat_map(|d| d.lines.iter().map(|l| l.pt.clone()))
        .chain(lesson.sentences.iter().map(|s| s.pt.clone()))
        .filter(|pt| *pt != cue.pt)
        .collect();
    let options = option_set(&reply.pt, pool, GENERIC_REPLIES, DEFAULT_OPTION_COUNT, rng);

    Some(instance(
        ChallengeTypeId::DialogueReply,
        ChallengeSource::Dialogue {
            dialogue: dialogue.clone(),
            line,
        },
        &cue.pt,
        ChallengeContent::Options { options },
        &reply.pt,
        Some(&cue.pt),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DialogueLine;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn cafe_lesson() -> Lesson {
        Lesson {
            id: "cafe".to_string(),
            words: vec![
                Word::new("o café", "the coffee"),
                Word::new("o chá", "the tea"),
                Word::new("a água", "the water"),
                Word::new("o leite", "the milk"),
                Word::new("o pão", "the bread"),
                Word::new("a conta", "the bill"),
            ],
            sentences: vec![
                Sentence::new("Eu quero um café.", "I want a coffee."),
                Sentence::new("A conta, por favor.", "The bill, please."),
                Sentence::new("Tem leite sem lactose?", "Do you have lactose-free milk?"),
            ],
            ..Default::default()
        }
    }

    fn assert_single_correct(instance: &ChallengeInstance) {
        let options = instance.options().expect("option-set instance");
        let keys: HashSet<String> = options.iter().map(|o| normalize_answer(o)).collect();
        assert_eq!(keys.len(), options.len(), "duplicate options: {:?}", options);
        assert_eq!(
            options.iter().filter(|o| **o == instance.correct_answer).count(),
            1,
            "{:?} should contain {} once",
            options,
            instance.correct_answer
        );
    }

    #[test]
    fn test_option_sets_hold_single_correct_answer() {
        let lesson = cafe_lesson();
        for seed in 0..50 {
            let mut rng = rng(seed);
            for word in &lesson.words {
                for ty in [
                    ChallengeTypeId::McqPtEn,
                    ChallengeTypeId::McqEnPt,
                    ChallengeTypeId::ListenSelect,
                ] {
                    let instance = build(ty, SourceItem::Word(word), &lesson, &mut rng).unwrap();
                    assert_eq!(instance.options().unwrap().len(), DEFAULT_OPTION_COUNT);
                    assert_single_correct(&instance);
                    assert!(instance.check(&instance.correct_answer.clone()));
                }
            }
        }
    }

    #[test]
    fn test_small_lesson_pads_with_generic_options() {
        let lesson = Lesson {
            words: vec![Word::new("sim", "yes"), Word::new("não", "no")],
            ..Default::default()
        };
        let mut rng = rng(7);
        let instance =
            build(ChallengeTypeId::McqPtEn, SourceItem::Word(&lesson.words[0]), &lesson, &mut rng)
                .unwrap();

        let options = instance.options().unwrap();
        assert_eq!(options.len(), 4);
        assert!(options.contains(&"no".to_string()));
        assert_single_correct(&instance);
    }

    #[test]
    fn test_generic_pool_never_duplicates_correct_answer() {
        // "water" is in the generic pool as well.
        let lesson = Lesson {
            words: vec![Word::new("a água", "Water")],
            ..Default::default()
        };
        for seed in 0..30 {
            let instance = build(
                ChallengeTypeId::McqPtEn,
                SourceItem::Word(&lesson.words[0]),
                &lesson,
                &mut rng(seed),
            )
            .unwrap();
            assert_single_correct(&instance);
            assert_eq!(instance.options().unwrap().len(), 4);
        }
    }

    #[test]
    fn test_cloze_distractors_come_from_other_sentences() {
        let lesson = cafe_lesson();
        let target = &lesson.sentences[0];
        let target_tokens: HashSet<String> =
            bare_tokens(&target.pt).iter().map(|t| normalize_answer(t)).collect();

        for seed in 0..30 {
            let instance =
                build(ChallengeTypeId::Cloze, SourceItem::Sentence(target), &lesson, &mut rng(seed))
                    .unwrap();
            assert_single_correct(&instance);
            for option in instance.options().unwrap() {
                if *option != instance.correct_answer {
                    assert!(!target_tokens.contains(&normalize_answer(option)));
                }
            }
            let ChallengeContent::Cloze { before, after, .. } = &instance.content else {
                panic!("expected cloze content");
            };
            let rebuilt = format!("{} {} {}", before, instance.correct_answer, after);
            assert_eq!(normalize_answer(&rebuilt), normalize_answer(&target.pt));
        }
    }

    #[test]
    fn test_cloze_falls_back_to_filler_tokens() {
        let lesson = Lesson {
            sentences: vec![Sentence::new("Bom dia", "Good morning")],
            ..Default::default()
        };
        let instance = build(
            ChallengeTypeId::Cloze,
            SourceItem::Sentence(&lesson.sentences[0]),
            &lesson,
            &mut rng(3),
        )
        .unwrap();

        let options = instance.options().unwrap();
        assert_eq!(options.len(), DEFAULT_OPTION_COUNT);
        assert!(options
            .iter()
            .filter(|o| **o != instance.correct_answer)
            .all(|o| FILLER_TOKENS.contains(&o.as_str())));
    }

    #[test]
    fn test_single_token_sentence_is_skipped() {
        let lesson = Lesson {
            sentences: vec![Sentence::new("Obrigado!", "Thanks!")],
            ..Default::default()
        };
        let sentence = SourceItem::Sentence(&lesson.sentences[0]);
        let mut rng = rng(1);

        assert!(build(ChallengeTypeId::Cloze, sentence, &lesson, &mut rng).is_none());
        assert!(build(ChallengeTypeId::WordOrder, sentence, &lesson, &mut rng).is_none());
        assert!(build(ChallengeTypeId::SentenceBuilder, sentence, &lesson, &mut rng).is_none());
    }

    #[test]
    fn test_word_order_tiles_are_a_scrambled_permutation() {
        let lesson = cafe_lesson();
        let sentence = &lesson.sentences[1];
        let instance = build(
            ChallengeTypeId::WordOrder,
            SourceItem::Sentence(sentence),
            &lesson,
            &mut rng(11),
        )
        .unwrap();

        let ChallengeContent::Tiles { tiles } = &instance.content else {
            panic!("expected tiles");
        };
        let mut sorted_tiles = tiles.clone();
        sorted_tiles.sort();
        let mut expected: Vec<String> = sentence.pt.split_whitespace().map(str::to_string).collect();
        assert_ne!(*tiles, expected);
        expected.sort();
        assert_eq!(sorted_tiles, expected);
        assert!(instance.check("a conta por favor"));
    }

    #[test]
    fn test_sentence_builder_adds_foreign_distractors() {
        let lesson = cafe_lesson();
        let sentence = &lesson.sentences[0];
        let instance = build(
            ChallengeTypeId::SentenceBuilder,
            SourceItem::Sentence(sentence),
            &lesson,
            &mut rng(5),
        )
        .unwrap();

        let ChallengeContent::Tiles { tiles } = &instance.content else {
            panic!("expected tiles");
        };
        let words = sentence.pt.split_whitespace().count();
        assert_eq!(tiles.len(), words + EXTRA_TILES);
        let target: HashSet<String> = bare_tokens(&sentence.pt).iter().map(|t| normalize_answer(t)).collect();
        let extras: Vec<&String> = tiles
            .iter()
            .filter(|t| !sentence.pt.split_whitespace().any(|w| w == t.as_str()))
            .collect();
        assert_eq!(extras.len(), EXTRA_TILES);
        assert!(extras.iter().all(|t| !target.contains(&normalize_answer(t))));
    }

    #[test]
    fn test_image_select_needs_an_image() {
        let mut lesson = cafe_lesson();
        let mut rng = rng(2);
        assert!(
            build(ChallengeTypeId::ImageSelect, SourceItem::Word(&lesson.words[0]), &lesson, &mut rng)
                .is_none()
        );

        lesson.words[0].image = Some("img/cafe.png".to_string());
        let instance =
            build(ChallengeTypeId::ImageSelect, SourceItem::Word(&lesson.words[0]), &lesson, &mut rng)
                .unwrap();
        assert_eq!(instance.prompt, "img/cafe.png");
        assert_single_correct(&instance);
    }

    #[test]
    fn test_type_translation_accepts_alternate() {
        let mut word = Word::new("o autocarro", "the bus");
        word.pt_alternate = Some("o ônibus".to_string());
        let lesson = Lesson::default();

        let instance =
            build(ChallengeTypeId::TypeTranslation, SourceItem::Word(&word), &lesson, &mut rng(0)).unwrap();
        assert!(instance.check("O autocarro"));
        assert!(instance.check("o ônibus!"));
        assert!(!instance.check("o comboio"));
        assert!(!instance.check(""));
    }

    #[test]
    fn test_match_pairs_skips_only_colliding_words() {
        let lesson = Lesson {
            words: vec![
                Word::new("sim", "yes"),
                Word::new("claro", "yes"),
                Word::new("claro", "of course"),
            ],
            ..Default::default()
        };
        let instance = build(
            ChallengeTypeId::MatchPairs,
            SourceItem::Word(&lesson.words[0]),
            &lesson,
            &mut rng(4),
        )
        .unwrap();

        let ChallengeContent::Pairs { left, right } = &instance.content else {
            panic!("expected pairs");
        };
        assert_eq!(left.len(), 2);
        assert!(left.contains(&"claro".to_string()));
        assert!(right.contains(&"of course".to_string()));
        assert!(instance.check("sim=yes; claro=of course"));
    }

    #[test]
    fn test_match_pairs() {
        let lesson = cafe_lesson();
        let instance = build(
            ChallengeTypeId::MatchPairs,
            SourceItem::Word(&lesson.words[0]),
            &lesson,
            &mut rng(9),
        )
        .unwrap();

        let ChallengeContent::Pairs { left, right } = &instance.content else {
            panic!("expected pairs");
        };
        assert_eq!(left.len(), MATCH_PAIRS_SIZE);
        assert_eq!(right.len(), MATCH_PAIRS_SIZE);
        assert!(left.contains(&"o café".to_string()));

        let reversed: Vec<&str> = instance.correct_answer.rsplit(PAIR_SEPARATOR).collect();
        assert!(instance.check(&reversed.join("; ")));

        let single = Lesson {
            words: vec![Word::new("sim", "yes")],
            ..Default::default()
        };
        assert!(
            build(ChallengeTypeId::MatchPairs, SourceItem::Word(&single.words[0]), &single, &mut rng(9))
                .is_none()
        );
    }

    #[test]
    fn test_minimal_pair_offers_both_words() {
        let pair = MinimalPair {
            a: Word::new("avó", "grandmother"),
            b: Word::new("avô", "grandfather"),
            hint: None,
        };
        let lesson = Lesson::default();
        let instance =
            build(ChallengeTypeId::MinimalPair, SourceItem::MinimalPair(&pair), &lesson, &mut rng(4)).unwrap();

        let options = instance.options().unwrap();
        assert_eq!(options.len(), 2);
        assert!(options.contains(&"avó".to_string()));
        assert!(options.contains(&"avô".to_string()));
        assert_eq!(instance.audio_text.as_deref(), Some(instance.correct_answer.as_str()));
    }

    #[test]
    fn test_dialogue_reply() {
        let dialogue = Dialogue {
            title: "No café".to_string(),
            lines: vec![
                DialogueLine {
                    speaker: "A".to_string(),
                    pt: "Bom dia! O que deseja?".to_string(),
                    en: "Good morning! What would you like?".to_string(),
                },
                DialogueLine {
                    speaker: "B".to_string(),
                    pt: "Um café, por favor.".to_string(),
                    en: "A coffee, please.".to_string(),
                },
            ],
        };
        let lesson = Lesson {
            dialogues: vec![dialogue.clone()],
            ..Default::default()
        };
        let instance =
            build(ChallengeTypeId::DialogueReply, SourceItem::Dialogue(&dialogue), &lesson, &mut rng(6)).unwrap();

        assert_eq!(instance.prompt, "Bom dia! O que deseja?");
        assert_eq!(instance.correct_answer, "Um café, por favor.");
        assert_single_correct(&instance);
    }

    #[test]
    fn test_mismatched_item_kind_is_skipped() {
        let lesson = cafe_lesson();
        let mut rng = rng(0);
        assert!(build(
            ChallengeTypeId::Cloze,
            SourceItem::Word(&lesson.words[0]),
            &lesson,
            &mut rng
        )
        .is_none());
    }

    #[test]
    fn test_same_seed_same_instance() {
        let lesson = cafe_lesson();
        let a = build(ChallengeTypeId::SentenceBuilder, SourceItem::Sentence(&lesson.sentences[2]), &lesson, &mut rng(42));
        let b = build(ChallengeTypeId::SentenceBuilder, SourceItem::Sentence(&lesson.sentences[2]), &lesson, &mut rng(42));
        assert_eq!(a, b);
    }
}
