//! Per-word mistake and success counters.
use super::Word;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest rolling log of contexts kept per record.
pub const MAX_CONTEXTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStat {
    pub key: String,
    pub pt: String,
    pub en: String,
    pub count: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen_at: DateTime<Utc>,
    #[serde(default)]
    pub contexts: Vec<String>,
}

pub type MistakeRecord = WordStat;
pub type SuccessRecord = WordStat;

impl WordStat {
    pub fn new(word: &Word, now: DateTime<Utc>) -> Self {
        Self {
            key: word.key(),
            pt: word.pt.clone(),
            en: word.en.clone(),
            count: 0,
            last_seen_at: now,
            contexts: Vec::new(),
        }
    }

    /// Counts one more occurrence, keeping only the newest `MAX_CONTEXTS` contexts.
    pub fn bump(&mut self, context: Option<&str>, now: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        self.last_seen_at = now;
        if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
            self.contexts.push(context.to_string());
            if self.contexts.len() > MAX_CONTEXTS {
                let excess = self.contexts.len() - MAX_CONTEXTS;
                self.contexts.drain(..excess);
            }
        }
    }

    pub fn forgive_one(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

/// Finds the record for `word`, creating an empty one when missing.
pub fn find_or_create<'a>(
    records: &'a mut Vec<WordStat>,
    word: &Word,
    now: DateTime<Utc>,
) -> &'a mut WordStat {
    let key = word.key();
    match records.iter().position(|r| r.key == key) {
        Some(idx) => &mut records[idx],
        None => {
            records.push(WordStat::new(word, now));
            let last = records.len() - 1;
            &mut records[last]
        }
    }
}

pub fn count_for(records: &[WordStat], key: &str) -> u32 {
    records
        .iter()
        .find(|r| r.key == key)
        .map(|r| r.count)
        .unwrap_or(0)
}
