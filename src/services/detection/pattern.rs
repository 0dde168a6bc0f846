// Pattern Consistency Analyzer
// Reduces tokens to shape descriptors (capitalization class + punctuation
// flags) and measures how often the same shapes recur, at two
// granularities: sliding token windows and sentence openings. Shape
// equality is structural, so different words with the same shape still
// count as a repeat.

use super::{Analyzer, NEUTRAL_SCORE};
use crate::models::AnalyzerScore;
use crate::services::config_store::PatternConfig;
use crate::services::text_processor::SegmentedText;
use std::collections::HashMap;

pub const NAME: &str = "pattern";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CapsClass {
    Lower,
    Capitalized,
    Upper,
    Mixed,
    Numeric,
    /// Token with no alphanumeric core (pure punctuation, emoticons).
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TokenShape {
    caps: CapsClass,
    leading_punct: bool,
    trailing_punct: bool,
}

fn shape_of(token: &str) -> TokenShape {
    let leading_punct = token
        .chars()
        .next()
        .is_some_and(|c| !c.is_alphanumeric());
    let trailing_punct = token
        .chars()
        .last()
        .is_some_and(|c| !c.is_alphanumeric());

    let core: Vec<char> = token.chars().filter(|c| c.is_alphanumeric()).collect();
    let caps = if core.is_empty() {
        CapsClass::Symbol
    } else if core.iter().all(|c| c.is_ascii_digit()) {
        CapsClass::Numeric
    } else if core.iter().all(|c| !c.is_uppercase()) {
        CapsClass::Lower
    } else if core.iter().all(|c| !c.is_lowercase()) {
        CapsClass::Upper
    } else if core[0].is_uppercase() && core[1..].iter().all(|c| !c.is_uppercase()) {
        CapsClass::Capitalized
    } else {
        CapsClass::Mixed
    };

    TokenShape {
        caps,
        leading_punct,
        trailing_punct,
    }
}

pub struct PatternAnalyzer {
    cfg: PatternConfig,
}

impl PatternAnalyzer {
    pub fn new(cfg: PatternConfig) -> Self {
        Self { cfg }
    }

    /// Repeat rate of window shapes: sum of (count - 1) over the shape
    /// frequency table, relative to the window count.
    fn token_shape_rate(&self, doc: &SegmentedText) -> Option<f64> {
        let shapes: Vec<TokenShape> = doc.raw_tokens.iter().map(|t| shape_of(t)).collect();
        if shapes.len() < self.cfg.shape_window + 1 {
            return None;
        }

        let mut counts: HashMap<&[TokenShape], usize> = HashMap::new();
        let mut total = 0usize;
        for window in shapes.windows(self.cfg.shape_window) {
            *counts.entry(window).or_insert(0) += 1;
            total += 1;
        }
        let repeats: usize = counts.values().filter(|&&c| c >= 2).map(|&c| c - 1).sum();
        Some(repeats as f64 / total.max(1) as f64)
    }

    /// Adjacent-sentence repeat ratio of first-two-token shapes.
    fn sentence_start_rate(&self, doc: &SegmentedText) -> f64 {
        if doc.sentences.len() < 2 {
            return 0.0;
        }

        let starts: Vec<(Option<TokenShape>, Option<TokenShape>)> = doc
            .sentences
            .iter()
            .map(|s| {
                let mut tokens = s.split_whitespace();
                (tokens.next().map(shape_of), tokens.next().map(shape_of))
            })
            .collect();

        let repeats = starts.windows(2).filter(|w| w[0] == w[1]).count();
        repeats as f64 / (starts.len() - 1) as f64
    }
}

impl Analyzer for PatternAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute(&self, doc: &SegmentedText) -> AnalyzerScore {
        let start_rate = self.sentence_start_rate(doc);

        let (token_rate, token_part) = match self.token_shape_rate(doc) {
            Some(rate) => (rate, rate.clamp(0.0, 1.0) * 100.0),
            // Too few tokens for even two windows: no shape evidence.
            None => (0.0, NEUTRAL_SCORE),
        };

        let score = self.cfg.token_shape_weight * token_part
            + self.cfg.sentence_start_weight * start_rate.clamp(0.0, 1.0) * 100.0;

        AnalyzerScore::new(NAME, score)
            .with_metric("tokenShapeRepeatRate", token_rate)
            .with_metric("sentenceStartRepeatRate", start_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> PatternAnalyzer {
        PatternAnalyzer::new(PatternConfig::default())
    }

    #[test]
    fn test_shape_equality_is_structural() {
        assert_eq!(shape_of("Window"), shape_of("Pattern"));
        assert_eq!(shape_of("done,"), shape_of("fine,"));
        assert_ne!(shape_of("Window"), shape_of("window"));
        assert_ne!(shape_of("done,"), shape_of("done"));
        assert_eq!(shape_of(":)").caps, CapsClass::Symbol);
        assert_eq!(shape_of("42").caps, CapsClass::Numeric);
    }

    #[test]
    fn test_uniform_sentences_score_high() {
        let doc = SegmentedText::new(
            "The system processes the data. The system analyzes the data. \
             The system reports the data. The system stores the data. \
             The system finishes the task.",
        );
        let result = analyzer().compute(&doc);
        assert!(result.score > 70.0, "score was {}", result.score);
        assert_eq!(result.metrics["sentenceStartRepeatRate"], 1.0);
    }

    #[test]
    fn test_varied_informal_text_scores_low() {
        let doc = SegmentedText::new(
            "I think, maybe, this works? Honestly not sure... \
             but I tried :) it kind of helped a little I guess.",
        );
        let result = analyzer().compute(&doc);
        assert!(result.score < 40.0, "score was {}", result.score);
    }

    #[test]
    fn test_repetition_score_is_non_decreasing() {
        let mut prev = 0.0;
        for n in 1..=5 {
            let text = "The system processes the data. ".repeat(n);
            let result = analyzer().compute(&SegmentedText::new(&text));
            assert!(
                result.score + 1e-9 >= prev,
                "score decreased at n={}: {} -> {}",
                n,
                prev,
                result.score
            );
            prev = result.score;
        }
    }

    #[test]
    fn test_single_word_is_defined() {
        let result = analyzer().compute(&SegmentedText::new("Word"));
        assert!(result.score.is_finite());
        assert!((0.0..=100.0).contains(&result.score));
    }
}
