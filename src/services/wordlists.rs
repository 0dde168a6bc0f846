// Word Lists
// Keyword heuristics externalized as data so the engine stays
// language-pluggable. English defaults are embedded; callers may load a
// replacement set from configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const STOPWORDS_EN: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can",
    "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "here", "his", "how", "if", "in", "into", "is", "it", "its",
    "just", "more", "most", "no", "not", "of", "on", "only", "or", "other",
    "our", "out", "over", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "will", "with",
    "would", "you", "your", "about", "after", "again", "also", "because",
    "before", "being", "between", "both", "each", "few", "further", "once",
];

const PERSONAL_MARKERS_EN: &[&str] = &[
    "i", "i'm", "i've", "i'd", "me", "my", "mine", "we", "us", "our",
    "ours", "honestly", "actually", "maybe", "guess", "think", "feel",
    "felt", "kinda", "sorta", "probably", "really", "stuff", "thing",
    "yeah", "okay", "wow", "hmm",
];

const EMOTICON_MARKERS: &[&str] = &[":)", ":(", ";)", ":D", ":/", "...", "!"];

const ELABORATION_EN: &[&str] = &["furthermore", "moreover", "additionally", "in addition", "also"];
const CONTRAST_EN: &[&str] = &["however", "nevertheless", "on the other hand", "conversely", "in contrast"];
const CAUSATION_EN: &[&str] = &["therefore", "consequently", "as a result", "thus", "hence"];
const EXAMPLE_EN: &[&str] = &["for example", "for instance", "specifically", "in particular"];
const SUMMARY_EN: &[&str] = &["in conclusion", "in summary", "overall", "to summarize", "finally"];

/// Canonical discourse-transition vocabulary, by rhetorical class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionMarkers {
    pub elaboration: Vec<String>,
    pub contrast: Vec<String>,
    pub causation: Vec<String>,
    pub example: Vec<String>,
    pub summary: Vec<String>,
}

impl TransitionMarkers {
    fn english() -> Self {
        let own = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            elaboration: own(ELABORATION_EN),
            contrast: own(CONTRAST_EN),
            causation: own(CAUSATION_EN),
            example: own(EXAMPLE_EN),
            summary: own(SUMMARY_EN),
        }
    }

    fn iter_all(&self) -> impl Iterator<Item = &String> {
        self.elaboration
            .iter()
            .chain(self.contrast.iter())
            .chain(self.causation.iter())
            .chain(self.example.iter())
            .chain(self.summary.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordLists {
    pub stopwords: HashSet<String>,
    pub personal_markers: Vec<String>,
    pub emoticon_markers: Vec<String>,
    pub transitions: TransitionMarkers,
}

impl Default for WordLists {
    fn default() -> Self {
        Self::english()
    }
}

impl WordLists {
    pub fn english() -> Self {
        Self {
            stopwords: STOPWORDS_EN.iter().map(|s| s.to_string()).collect(),
            personal_markers: PERSONAL_MARKERS_EN.iter().map(|s| s.to_string()).collect(),
            emoticon_markers: EMOTICON_MARKERS.iter().map(|s| s.to_string()).collect(),
            transitions: TransitionMarkers::english(),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn is_personal_marker(&self, token: &str) -> bool {
        self.personal_markers.iter().any(|m| m == token)
    }

    /// Count personal-marker occurrences: word markers over the token
    /// stream plus emoticon/ellipsis/exclamation sequences in the raw text.
    pub fn personal_marker_count(&self, tokens: &[String], text: &str) -> usize {
        let word_hits = tokens.iter().filter(|t| self.is_personal_marker(t)).count();
        let glyph_hits: usize = self
            .emoticon_markers
            .iter()
            .map(|m| text.matches(m.as_str()).count())
            .sum();
        word_hits + glyph_hits
    }

    /// Does the sentence open with a canonical transition marker?
    pub fn starts_with_transition(&self, sentence: &str) -> bool {
        let lowered = sentence.trim_start().to_lowercase();
        self.transitions
            .iter_all()
            .any(|m| lowered.starts_with(m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_exclude_content_terms() {
        let lists = WordLists::english();
        assert!(lists.is_stopword("the"));
        assert!(lists.is_stopword("between"));
        assert!(!lists.is_stopword("system"));
        assert!(!lists.is_stopword("data"));
    }

    #[test]
    fn test_personal_marker_count() {
        let lists = WordLists::english();
        let text = "I think it helped :) honestly...";
        let tokens: Vec<String> = vec!["i", "think", "it", "helped", "honestly"]
            .into_iter()
            .map(String::from)
            .collect();
        let count = lists.personal_marker_count(&tokens, text);
        // i + think + honestly + ":)" + "..."
        assert!(count >= 5);
    }

    #[test]
    fn test_starts_with_transition() {
        let lists = WordLists::english();
        assert!(lists.starts_with_transition("However, the result held"));
        assert!(lists.starts_with_transition("  for example this one"));
        assert!(!lists.starts_with_transition("The result held"));
    }

    #[test]
    fn test_lists_are_overridable_via_serde() {
        let json = r#"{
            "stopwords": ["og", "det"],
            "personalMarkers": ["jeg", "vi"],
            "emoticonMarkers": [":)"],
            "transitions": {
                "elaboration": ["desuden"],
                "contrast": ["dog"],
                "causation": ["derfor"],
                "example": ["for eksempel"],
                "summary": ["samlet set"]
            }
        }"#;
        let lists: WordLists = serde_json::from_str(json).unwrap();
        assert!(lists.is_stopword("og"));
        assert!(lists.is_personal_marker("jeg"));
        assert!(lists.starts_with_transition("Derfor virker det"));
    }
}
