//! Classifies learned words into skills and ranks the weakest ones.
//!
//! A skill is a fixed predicate over a word. Predicates overlap freely: "as mães"
//! counts towards gender agreement, nasal vowels and accents at once.

use crate::config::templates::FIX_PACK_TEMPLATE_ID;
use crate::models::word_stat::count_for;
use crate::models::{LearnedWordRecord, Lesson, MistakeRecord, SuccessRecord, Word};
use serde::Serialize;

pub const DEFAULT_FIX_PACKS: usize = 3;
pub const FIX_PACK_WORDS: usize = 8;

const ARTICLES: &[&str] = &["o", "a", "os", "as", "um", "uma", "uns", "umas"];
const ACCENTED: &[char] = &['á', 'à', 'â', 'é', 'ê', 'í', 'ó', 'ô', 'ú', 'ç'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    GenderAgreement,
    Numbers,
    NasalVowels,
    PalatalSounds,
    Accents,
    Verbs,
    Phrases,
}

#[derive(Clone, Copy, Debug)]
pub struct SkillDefinition {
    pub id: SkillId,
    pub label: &'static str,
    pub fix_instruction: &'static str,
}

pub static SKILLS: [SkillDefinition; 7] = [
    SkillDefinition {
        id: SkillId::GenderAgreement,
        label: "Gender & articles",
        fix_instruction: "Say each noun with its article (o/a, um/uma) until the pairing is automatic.",
    },
    SkillDefinition {
        id: SkillId::Numbers,
        label: "Numbers",
        fix_instruction: "Count out loud and type each number word from its digits.",
    },
    SkillDefinition {
        id: SkillId::NasalVowels,
        label: "Nasal vowels",
        fix_instruction: "Listen for ão, õe and final -m; repeat each word slowly, then at full speed.",
    },
    SkillDefinition {
        id: SkillId::PalatalSounds,
        label: "lh & nh",
        fix_instruction: "Contrast lh/l and nh/n: read each word aloud and spell it back.",
    },
    SkillDefinition {
        id: SkillId::Accents,
        label: "Accents",
        fix_instruction: "Type these words with every accent and cedilla; accents change meaning.",
    },
    SkillDefinition {
        id: SkillId::Verbs,
        label: "Verbs",
        fix_instruction: "Translate each verb both ways, then use it in a short sentence.",
    },
    SkillDefinition {
        id: SkillId::Phrases,
        label: "Multi-word phrases",
        fix_instruction: "Practice these phrases as whole chunks rather than word by word.",
    },
];

fn content_tokens(pt: &str) -> Vec<String> {
    pt.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl SkillId {
    pub fn definition(self) -> &'static SkillDefinition {
        &SKILLS[self as usize]
    }

    pub fn matches(self, word: &Word) -> bool {
        let pt = word.pt.to_lowercase();
        let tokens = content_tokens(&word.pt);
        match self {
            SkillId::GenderAgreement => {
                word.is_gendered || tokens.first().is_some_and(|t| ARTICLES.contains(&t.as_str()))
            }
            SkillId::Numbers => word.is_number,
            SkillId::NasalVowels => {
                pt.contains(['ã', 'õ'])
                    || tokens.iter().any(|t| {
                        ["am", "em", "im", "om", "um"].iter().any(|end| t.ends_with(end))
                    })
            }
            SkillId::PalatalSounds => pt.contains("lh") || pt.contains("nh"),
            SkillId::Accents => pt.contains(ACCENTED),
            SkillId::Verbs => word.en.trim().to_lowercase().starts_with("to "),
            SkillId::Phrases => {
                tokens
                    .iter()
                    .filter(|t| !ARTICLES.contains(&t.as_str()))
                    .count()
                    >= 2
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStat {
    pub id: SkillId,
    pub label: &'static str,
    pub fix_instruction: &'static str,
    pub words: u32,
    pub attempts: u32,
    pub misses: u32,
    /// 0..=100; 100 when nothing was attempted.
    pub accuracy: u8,
}

/// Per-skill totals over the learned words, weakest (most misses) first.
pub fn analyze(
    learned: &[LearnedWordRecord],
    mistakes: &[MistakeRecord],
    successes: &[SuccessRecord],
) -> Vec<SkillStat> {
    let mut stats: Vec<SkillStat> = SKILLS
        .iter()
        .map(|def| SkillStat {
            id: def.id,
            label: def.label,
            fix_instruction: def.fix_instruction,
            words: 0,
            attempts: 0,
            misses: 0,
            accuracy: 100,
        })
        .collect();

    for record in learned {
        let misses = count_for(mistakes, &record.key);
        let hits = count_for(successes, &record.key);
        for stat in stats.iter_mut().filter(|s| s.id.matches(&record.word)) {
            stat.words = stat.words.saturating_add(1);
            stat.misses = stat.misses.saturating_add(misses);
            stat.attempts = stat.attempts.saturating_add(misses.saturating_add(hits));
        }
    }

    for stat in &mut stats {
        if stat.attempts > 0 {
            let hits = stat.attempts.saturating_sub(stat.misses) as f64;
            stat.accuracy = (hits / stat.attempts as f64 * 100.0).round() as u8;
        }
    }

    // stable: ties keep catalog order
    stats.sort_by(|a, b| b.misses.cmp(&a.misses));
    stats
}

/// Remediation bundle for one weak skill.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPack {
    pub skill: SkillId,
    pub label: &'static str,
    pub instruction: &'static str,
    pub words: Vec<Word>,
}

impl FixPack {
    /// Lesson that drills the pack's words with the fix-pack template.
    pub fn to_lesson(&self) -> Lesson {
        Lesson {
            id: format!("fix-{}", self.skill_slug()),
            title: self.label.to_string(),
            words: self.words.clone(),
            template_id: FIX_PACK_TEMPLATE_ID.to_string(),
            ..Default::default()
        }
    }

    fn skill_slug(&self) -> String {
        serde_json::to_value(self.skill)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "skill".to_string())
    }
}

/// Up to `max_packs` packs for the skills with misses, in `stats` order. Each pack holds
/// the skill's words that still carry mistakes, most-missed first.
pub fn fix_packs(
    stats: &[SkillStat],
    learned: &[LearnedWordRecord],
    mistakes: &[MistakeRecord],
    max_packs: usize,
) -> Vec<FixPack> {
    stats
        .iter()
        .filter(|s| s.misses > 0)
        .filter_map(|stat| {
            let mut words: Vec<(u32, &LearnedWordRecord)> = learned
                .iter()
                .filter(|r| stat.id.matches(&r.word))
                .map(|r| (count_for(mistakes, &r.key), r))
                .filter(|(count, _)| *count > 0)
                .collect();
            if words.is_empty() {
                return None;
            }
            words.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.key.cmp(&b.1.key)));
            words.truncate(FIX_PACK_WORDS);

            Some(FixPack {
                skill: stat.id,
                label: stat.label,
                instruction: stat.fix_instruction,
                words: words.into_iter().map(|(_, r)| r.word.clone()).collect(),
            })
        })
        .take(max_packs)
        .collect()
}
