// Transition Model Analyzer
// Builds a first-order transition table over the document's own tokens and
// scores how predictable adjacent-token transitions are. Unusually low
// in-document perplexity reads as AI-like phrasing regularity.
//
// A context token that appears only once makes its empirical transition
// probability vacuously 1.0, so the average runs over pairs whose context
// occurs at least twice; if none qualify the analyzer is neutral.

use super::{Analyzer, NEUTRAL_SCORE};
use crate::models::AnalyzerScore;
use crate::services::config_store::TransitionConfig;
use crate::services::text_processor::SegmentedText;
use std::collections::HashMap;

pub const NAME: &str = "transition";

pub struct TransitionAnalyzer {
    cfg: TransitionConfig,
}

impl TransitionAnalyzer {
    pub fn new(cfg: TransitionConfig) -> Self {
        Self { cfg }
    }
}

impl Analyzer for TransitionAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute(&self, doc: &SegmentedText) -> AnalyzerScore {
        let words = &doc.words;
        if words.len() < 2 {
            return AnalyzerScore::new(NAME, NEUTRAL_SCORE)
                .with_metric("tokenCount", words.len() as f64);
        }

        let mut pair_counts: HashMap<(&str, &str), usize> = HashMap::new();
        let mut context_totals: HashMap<&str, usize> = HashMap::new();
        for pair in words.windows(2) {
            *pair_counts
                .entry((pair[0].as_str(), pair[1].as_str()))
                .or_insert(0) += 1;
            *context_totals.entry(pair[0].as_str()).or_insert(0) += 1;
        }

        let mut log_sum = 0.0;
        let mut informative_pairs = 0usize;
        for pair in words.windows(2) {
            let context_total = context_totals[pair[0].as_str()];
            if context_total < 2 {
                continue;
            }
            let count = pair_counts[&(pair[0].as_str(), pair[1].as_str())];
            let p = (count as f64 / context_total as f64).max(self.cfg.probability_floor);
            log_sum += p.log2();
            informative_pairs += 1;
        }

        if informative_pairs == 0 {
            return AnalyzerScore::new(NAME, NEUTRAL_SCORE)
                .with_metric("tokenCount", words.len() as f64)
                .with_metric("informativePairs", 0.0);
        }

        let avg_log = log_sum / informative_pairs as f64;
        let perplexity = 2f64.powf(-avg_log);
        let score = self.cfg.perplexity.score_low_is_ai(perplexity);

        AnalyzerScore::new(NAME, score)
            .with_metric("perplexity", perplexity)
            .with_metric("tokenCount", words.len() as f64)
            .with_metric("informativePairs", informative_pairs as f64)
            .with_metric("distinctContexts", context_totals.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TransitionAnalyzer {
        TransitionAnalyzer::new(TransitionConfig::default())
    }

    #[test]
    fn test_fewer_than_two_tokens_is_neutral() {
        let result = analyzer().compute(&SegmentedText::new("Word"));
        assert_eq!(result.score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_all_unique_tokens_is_neutral() {
        // Every context occurs once; the table carries no information.
        let result = analyzer().compute(&SegmentedText::new("quick brown foxes jump over lazy dogs"));
        assert_eq!(result.score, NEUTRAL_SCORE);
        assert_eq!(result.metrics["informativePairs"], 0.0);
    }

    #[test]
    fn test_repeated_sentence_is_highly_predictable() {
        let text = "The system processes the data. ".repeat(5);
        let result = analyzer().compute(&SegmentedText::new(&text));
        assert!(result.score > 70.0, "score was {}", result.score);
        assert!(result.metrics["perplexity"] < 2.0);
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
    fn test_branching_contexts_raise_perplexity() {
        // "i" is followed by three different words, so P = 1/3 each.
        let doc = SegmentedText::new("I think it works and I tried it and I guess so");
        let result = analyzer().compute(&doc);
        assert!(result.metrics["perplexity"] > 1.5);
        assert!(result.score < 100.0);
    }
}
