//! Lesson content: words, sentences and the optional extras a lesson can carry.
//! Content is immutable from the engine's point of view.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub pt: String,
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pt_alternate: Option<String>,
    #[serde(default)]
    pub is_gendered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_number: bool,
}

impl Word {
    pub fn new(pt: &str, en: &str) -> Self {
        Self {
            pt: pt.to_string(),
            en: en.to_string(),
            pt_alternate: None,
            is_gendered: false,
            image: None,
            is_number: false,
        }
    }

    /// Identity used by every per-word table: `pt|en`.
    pub fn key(&self) -> String {
        word_key(&self.pt, &self.en)
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

pub fn word_key(pt: &str, en: &str) -> String {
    format!("{}|{}", pt, en)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub pt: String,
    pub en: String,
}

impl Sentence {
    pub fn new(pt: &str, en: &str) -> Self {
        Self {
            pt: pt.to_string(),
            en: en.to_string(),
        }
    }
}

/// Two words that differ by a single sound (e.g. "avó" / "avô").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalPair {
    pub a: Word,
    pub b: Word,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub pt: String,
    pub en: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    #[serde(default)]
    pub title: String,
    pub lines: Vec<DialogueLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarPattern {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<Sentence>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_key() {
        let word = Word::new("obrigado", "thank you");
        assert_eq!(word.key(), "obrigado|thank you");
    }

    #[test]
    fn test_word_deserialize_defaults() {
        let word: Word = serde_json::from_str(r#"{"pt": "casa", "en": "house"}"#).unwrap();

        assert_eq!(word.pt, "casa");
        assert!(!word.is_gendered);
        assert!(!word.is_number);
        assert!(word.pt_alternate.is_none());
        assert!(!word.has_image());
    }

    #[test]
    fn test_word_camel_case_fields() {
        let json = r#"{"pt": "o gato", "en": "the cat", "ptAlternate": "gato",
                       "isGendered": true, "image": "cat.png"}"#;
        let word: Word = serde_json::from_str(json).unwrap();

        assert_eq!(word.pt_alternate.as_deref(), Some("gato"));
        assert!(word.is_gendered);
        assert!(word.has_image());
    }
}
