//! A lesson is the unit of content a session is generated from.
use super::word::{Dialogue, GrammarPattern, MinimalPair, Sentence, Word};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic_id: String,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    #[serde(default = "default_template_id")]
    pub template_id: String,
    #[serde(default)]
    pub minimal_pairs: Vec<MinimalPair>,
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    #[serde(default)]
    pub grammar_patterns: Vec<GrammarPattern>,
}

fn default_template_id() -> String {
    "standard".to_string()
}

impl Default for Lesson {
    fn default() -> Self {
        Self {
            id: "lesson".to_string(),
            title: String::new(),
            topic_id: String::new(),
            words: Vec::new(),
            sentences: Vec::new(),
            template_id: default_template_id(),
            minimal_pairs: Vec::new(),
            dialogues: Vec::new(),
            grammar_patterns: Vec::new(),
        }
    }
}

impl Lesson {
    pub fn has_images(&self) -> bool {
        self.words.iter().any(Word::has_image)
    }
}
