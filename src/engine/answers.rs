//! Answer normalization and the transcript heuristic used for speaking exercises.
use std::collections::HashSet;

/// Share of expected tokens a transcript must contain to count as a match.
pub const TRANSCRIPT_MATCH_RATIO: f64 = 0.6;

const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '¿', '¡', '"', '“', '”', '«', '»', '(', ')'];

/// Lowercases, drops punctuation and collapses whitespace.
pub fn normalize_answer(text: &str) -> String {
    text.to_lowercase()
        .replace(PUNCTUATION, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokens(text: &str) -> Vec<String> {
    normalize_answer(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token-overlap check between a speech transcript and the expected text.
pub fn transcript_matches(transcript: &str, expected: &str) -> bool {
    let expected = tokens(expected);
    if expected.is_empty() {
        return false;
    }
    let heard: HashSet<String> = tokens(transcript).into_iter().collect();
    let matched = expected.iter().filter(|t| heard.contains(*t)).count();
    matched as f64 / expected.len() as f64 >= TRANSCRIPT_MATCH_RATIO
}
