//! The progress document: learned words, mistake/success tables and lesson counters.
//!
//! Loading never fails. Stored JSON is merged over an empty document: collections that
//! are not arrays become empty, scalars are clamped into range or defaulted, and
//! version 1 documents are migrated. Only records without a usable key are dropped.

use super::learned_word::{DEFAULT_EASE_FACTOR, MAX_SRS_LEVEL, MIN_SRS_LEVEL};
use super::word::word_key;
use super::word_stat::{MistakeRecord, SuccessRecord};
use super::{LearnedWordRecord, LessonProgress, LessonProgressSnapshot, Word};
use crate::database::store::{PersistenceStore, StoreKey};
use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const SCHEMA_VERSION: u32 = 2;

/// Last millisecond of the year 9999.
const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub version: u32,
    pub learned_words: Vec<LearnedWordRecord>,
    pub mistakes: Vec<MistakeRecord>,
    pub successes: Vec<SuccessRecord>,
    pub lesson_progress: Vec<LessonProgress>,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            learned_words: Vec::new(),
            mistakes: Vec::new(),
            successes: Vec::new(),
            lesson_progress: Vec::new(),
        }
    }
}

impl UserData {
    pub fn learned_word(&self, key: &str) -> Option<&LearnedWordRecord> {
        self.learned_words.iter().find(|r| r.key == key)
    }

    pub fn learned_word_mut(&mut self, key: &str) -> Option<&mut LearnedWordRecord> {
        self.learned_words.iter_mut().find(|r| r.key == key)
    }

    pub fn progress(&self, lesson_id: &str) -> Option<&LessonProgress> {
        self.lesson_progress.iter().find(|p| p.lesson_id == lesson_id)
    }

    pub fn progress_mut(&mut self, lesson_id: &str) -> &mut LessonProgress {
        match self
            .lesson_progress
            .iter()
            .position(|p| p.lesson_id == lesson_id)
        {
            Some(idx) => &mut self.lesson_progress[idx],
            None => {
                self.lesson_progress.push(LessonProgress::new(lesson_id));
                let last = self.lesson_progress.len() - 1;
                &mut self.lesson_progress[last]
            }
        }
    }

    /// Snapshot for the progression gate; an untouched lesson reads as 0% / 0 completions.
    pub fn snapshot(&self, lesson_id: &str) -> LessonProgressSnapshot {
        self.progress(lesson_id)
            .map(LessonProgress::snapshot)
            .unwrap_or_default()
    }

    /// Clears every progress collection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Builds a document from stored JSON, repairing whatever it can.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(mut root) = value else {
            if !value.is_null() {
                log::warn!("user data is not an object, starting fresh");
            }
            return Self::default();
        };

        let version = root
            .get("version")
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(1);
        if version > SCHEMA_VERSION {
            log::warn!(
                "user data has newer schema version {} (supported: {}), reading what is known",
                version,
                SCHEMA_VERSION
            );
        }

        let mut learned_words: Vec<LearnedWordRecord> = collect_records(
            root.remove("learnedWords"),
            "learnedWords",
            "key",
            migrate_learned_word,
        );
        let mistakes: Vec<MistakeRecord> =
            collect_records(root.remove("mistakes"), "mistakes", "key", migrate_word_stat);
        let successes: Vec<SuccessRecord> =
            collect_records(root.remove("successes"), "successes", "key", migrate_word_stat);
        let mut lesson_progress: Vec<LessonProgress> = collect_records(
            root.remove("lessonProgress"),
            "lessonProgress",
            "lessonId",
            migrate_progress,
        );

        for record in &mut learned_words {
            record.clamp_invariants();
        }
        // Keep the most recently reviewed record per key.
        learned_words.sort_by(|a, b| b.last_reviewed_at.cmp(&a.last_reviewed_at));
        let mut seen = HashSet::new();
        learned_words.retain(|r| seen.insert(r.key.clone()));
        learned_words.sort_by(|a, b| a.key.cmp(&b.key));

        for progress in &mut lesson_progress {
            progress.correct = progress.correct.min(progress.attempts);
        }

        Self {
            version: SCHEMA_VERSION,
            learned_words,
            mistakes: dedup_by_key(mistakes, |r| r.key.clone()),
            successes: dedup_by_key(successes, |r| r.key.clone()),
            lesson_progress: dedup_by_key(lesson_progress, |p| p.lesson_id.clone()),
        }
    }

    /// Loads the document from the store; any failure yields an empty document.
    pub fn load(store: &dyn PersistenceStore) -> Self {
        match store.load(StoreKey::UserData.as_str()) {
            Ok(Some(value)) => Self::from_json(value),
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("could not load user data, starting fresh: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn PersistenceStore) -> Result<(), StoreError> {
        store.save(StoreKey::UserData.as_str(), &self.to_json())
    }
}

/// Reads a collection stored either as an array (current) or as a map keyed by
/// `id_field` (version 1). Entries that still fail to parse after `migrate` are dropped.
fn collect_records<T, F>(value: Option<Value>, name: &str, id_field: &str, migrate: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: Fn(&mut Map<String, Value>),
{
    let entries: Vec<Value> = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(id, mut entry)| {
                if let Value::Object(fields) = &mut entry {
                    fields
                        .entry(id_field.to_string())
                        .or_insert(Value::String(id));
                }
                entry
            })
            .collect(),
        Some(_) => {
            log::warn!("'{}' is not a collection, resetting it", name);
            return Vec::new();
        }
    };

    let total = entries.len();
    let records: Vec<T> = entries
        .into_iter()
        .filter_map(|mut entry| {
            if let Value::Object(fields) = &mut entry {
                migrate(fields);
            }
            serde_json::from_value(entry).ok()
        })
        .collect();

    if records.len() < total {
        log::warn!(
            "dropped {} malformed entries from '{}'",
            total - records.len(),
            name
        );
    }
    records
}

/// Version 1 records carried no word snapshot; rebuild it from the `pt|en` key.
/// A record is kept as long as either the key or the word snapshot is usable.
fn migrate_learned_word(fields: &mut Map<String, Value>) {
    let word_is_usable = fields
        .get("word")
        .is_some_and(|w| w["pt"].is_string() && w["en"].is_string());
    if !word_is_usable {
        fields.remove("word");
        let word = fields
            .get("key")
            .and_then(Value::as_str)
            .and_then(|k| k.split_once('|'))
            .and_then(|(pt, en)| serde_json::to_value(Word::new(pt, en)).ok());
        if let Some(word) = word {
            fields.insert("word".to_string(), word);
        }
    }
    if !fields.get("key").is_some_and(Value::is_string) {
        fields.remove("key");
        let key = fields
            .get("word")
            .and_then(|w| Some(word_key(w["pt"].as_str()?, w["en"].as_str()?)));
        if let Some(key) = key {
            fields.insert("key".to_string(), Value::String(key));
        }
    }

    coerce_count(fields, "srsLevel", u64::from(MIN_SRS_LEVEL), u64::from(MAX_SRS_LEVEL));
    coerce_count(fields, "repetitions", 0, u64::from(u32::MAX));
    if !fields.get("easeFactor").is_some_and(Value::is_number) {
        fields.insert("easeFactor".to_string(), Value::from(DEFAULT_EASE_FACTOR));
    }
    coerce_timestamp(fields, "lastReviewedAt");
    coerce_timestamp(fields, "nextReviewAt");
    drop_non_string(fields, "lessonId");
    drop_non_string(fields, "topicId");
}

/// Version 1 counters had no `pt`/`en` columns and could miss `count`.
fn migrate_word_stat(fields: &mut Map<String, Value>) {
    if let Some((pt, en)) = fields
        .get("key")
        .and_then(Value::as_str)
        .and_then(|k| k.split_once('|'))
        .map(|(pt, en)| (pt.to_string(), en.to_string()))
    {
        if !fields.get("pt").is_some_and(Value::is_string) {
            fields.insert("pt".to_string(), Value::String(pt));
        }
        if !fields.get("en").is_some_and(Value::is_string) {
            fields.insert("en".to_string(), Value::String(en));
        }
    }
    coerce_count(fields, "count", 0, u64::from(u32::MAX));
    coerce_timestamp(fields, "lastSeenAt");
    if let Some(Value::Array(contexts)) = fields.get_mut("contexts") {
        contexts.retain(Value::is_string);
    } else {
        fields.remove("contexts");
    }
}

fn migrate_progress(fields: &mut Map<String, Value>) {
    for name in ["attempts", "correct", "completions"] {
        coerce_count(fields, name, 0, u64::from(u32::MAX));
    }
}

/// Replaces a missing or out-of-range counter with the nearest value in `min..=max`.
/// Fractions are truncated.
fn coerce_count(fields: &mut Map<String, Value>, name: &str, min: u64, max: u64) {
    let value = match fields.get(name) {
        Some(Value::Number(n)) => match (n.as_u64(), n.as_f64()) {
            (Some(v), _) => v,
            (None, Some(f)) if f > 0.0 => f.min(max as f64) as u64,
            _ => min,
        },
        _ => min,
    };
    fields.insert(name.to_string(), Value::from(value.clamp(min, max)));
}

/// Millisecond timestamps outside `0..=MAX_TIMESTAMP_MS` or of the wrong type become 0,
/// which makes a learned word due immediately.
fn coerce_timestamp(fields: &mut Map<String, Value>, name: &str) {
    let millis = match fields.get(name) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .filter(|ms| (0..=MAX_TIMESTAMP_MS).contains(ms))
            .unwrap_or(0),
        _ => 0,
    };
    fields.insert(name.to_string(), Value::from(millis));
}

fn drop_non_string(fields: &mut Map<String, Value>, name: &str) {
    if fields.get(name).is_some_and(|v| !v.is_string()) {
        fields.remove(name);
    }
}

fn dedup_by_key<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
