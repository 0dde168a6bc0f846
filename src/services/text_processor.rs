// Text Processing Service
// Segmentation and tokenization shared by every analyzer.

use regex::Regex;
use std::sync::OnceLock;

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{3000}\u{00A0}]").expect("space regex"))
}

fn hws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\x0C\x0B]+").expect("horizontal whitespace regex"))
}

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence regex"))
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph regex"))
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_']+").expect("word regex"))
}

/// Normalize punctuation and whitespace before analysis.
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text.to_string();

    // Replace smart quotes
    s = s.replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'");

    // Replace em dash
    s = s.replace('\u{2014}', "-");

    // Replace ideographic space and non-breaking space
    s = space_re().replace_all(&s, " ").to_string();

    // Normalize line endings
    s = s.replace("\r\n", "\n").replace('\r', "\n");

    // Collapse horizontal whitespace
    s = hws_re().replace_all(&s, " ").to_string();

    // Strip each line
    s = s.lines()
        .map(|ln| ln.trim())
        .collect::<Vec<_>>()
        .join("\n");

    s.trim().to_string()
}

/// Split text into sentences on terminal punctuation.
/// Text without any terminal punctuation is a single sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    sentence_re()
        .split(text)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Split text into paragraphs on blank-line boundaries.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    paragraph_re()
        .split(text)
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}

/// Lowercased word tokens (alphanumeric runs, apostrophes kept).
pub fn tokenize_words(text: &str) -> Vec<String> {
    word_re()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Whitespace-delimited tokens with punctuation preserved, for shape analysis.
pub fn raw_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_string()).collect()
}

/// Count word tokens in a sentence.
pub fn sentence_word_count(sentence: &str) -> usize {
    word_re().find_iter(sentence).count()
}

/// One segmentation of a document, computed once and shared by all
/// analyzers (they are read-only over it).
#[derive(Debug, Clone)]
pub struct SegmentedText {
    pub text: String,
    pub sentences: Vec<String>,
    pub paragraphs: Vec<String>,
    pub words: Vec<String>,
    pub raw_tokens: Vec<String>,
}

impl SegmentedText {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sentences: split_sentences(text),
            paragraphs: split_paragraphs(text),
            words: tokenize_words(text),
            raw_tokens: raw_tokens(text),
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        let input = "Hello\u{201c}World\u{201d}";
        let output = normalize_punctuation(input);
        assert_eq!(output, "Hello\"World\"");
    }

    #[test]
    fn test_split_sentences() {
        let text = "First sentence. Second one! Third?";
        let sentences = split_sentences(text);
        assert_eq!(sentences, vec!["First sentence", "Second one", "Third"]);
    }

    #[test]
    fn test_split_sentences_no_terminal_punctuation() {
        let sentences = split_sentences("no punctuation at all");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0], "no punctuation at all");
    }

    #[test]
    fn test_split_sentences_is_idempotent() {
        let text = "One. Two. Three.";
        let first = split_sentences(text);
        let rejoined = first.join(". ");
        let second = split_sentences(&rejoined);
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "First paragraph.\n\nSecond paragraph.";
        let paragraphs = split_paragraphs(text);
        assert_eq!(paragraphs.len(), 2);
    }

    #[test]
    fn test_tokenize_words_lowercases() {
        let words = tokenize_words("The System doesn't sleep");
        assert_eq!(words, vec!["the", "system", "doesn't", "sleep"]);
    }

    #[test]
    fn test_segmented_text_empty_fragments_dropped() {
        let doc = SegmentedText::new("One... Two!!  ");
        assert_eq!(doc.sentences, vec!["One", "Two"]);
        assert_eq!(doc.word_count(), 2);
    }
}
