// Lexical Statistics Analyzer
// Character/token frequency features: entropy, sentence-length variance,
// punctuation-density variance, lexical diversity, personal-marker density.
// Each raw metric maps through a configured human-typical band into an
// AI-likeness contribution; the sub-score is their mean.

use super::{population_variance, Analyzer, NEUTRAL_SCORE};
use crate::models::AnalyzerScore;
use crate::services::config_store::LexicalConfig;
use crate::services::text_processor::{sentence_word_count, SegmentedText};
use crate::services::wordlists::WordLists;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub const NAME: &str = "lexical";

pub struct LexicalAnalyzer {
    cfg: LexicalConfig,
    lists: Arc<WordLists>,
}

impl LexicalAnalyzer {
    pub fn new(cfg: LexicalConfig, lists: Arc<WordLists>) -> Self {
        Self { cfg, lists }
    }
}

impl Analyzer for LexicalAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute(&self, doc: &SegmentedText) -> AnalyzerScore {
        let entropy = char_entropy_bits(&doc.text);
        let entropy_score = self.cfg.entropy.score_low_is_ai(entropy);

        // Variance metrics are undefined for a single sentence.
        let sentence_lengths: Vec<f64> = doc
            .sentences
            .iter()
            .map(|s| sentence_word_count(s) as f64)
            .collect();
        let (length_variance, length_score) = if sentence_lengths.len() < 2 {
            (0.0, NEUTRAL_SCORE)
        } else {
            let v = population_variance(&sentence_lengths);
            (v, self.cfg.sentence_length_variance.score_low_is_ai(v))
        };

        let punct_counts: Vec<f64> = doc
            .sentences
            .iter()
            .map(|s| s.chars().filter(|c| matches!(c, ',' | ';' | ':')).count() as f64)
            .collect();
        let (punct_variance, punct_score) = if punct_counts.len() < 2 {
            (0.0, NEUTRAL_SCORE)
        } else {
            let v = population_variance(&punct_counts);
            (v, self.cfg.punctuation_variance.score_low_is_ai(v))
        };

        let (diversity, diversity_score) = if doc.words.is_empty() {
            (0.0, NEUTRAL_SCORE)
        } else {
            let distinct: HashSet<&str> = doc.words.iter().map(|w| w.as_str()).collect();
            let d = distinct.len() as f64 / doc.words.len() as f64;
            (d, self.cfg.diversity.score_low_is_ai(d))
        };

        let (marker_density, marker_score) = if doc.words.is_empty() {
            (0.0, NEUTRAL_SCORE)
        } else {
            let hits = self.lists.personal_marker_count(&doc.words, &doc.text);
            let density = hits as f64 / doc.words.len() as f64;
            (density, self.cfg.marker_density.score_low_is_ai(density))
        };

        let score =
            (entropy_score + length_score + punct_score + diversity_score + marker_score) / 5.0;

        AnalyzerScore::new(NAME, score)
            .with_metric("entropyBits", entropy)
            .with_metric("sentenceLengthVariance", length_variance)
            .with_metric("punctuationVariance", punct_variance)
            .with_metric("lexicalDiversity", diversity)
            .with_metric("markerDensity", marker_density)
    }
}

/// Shannon entropy in bits over the lowercased non-whitespace character
/// distribution. The frequency table is ordered so the floating-point
/// summation order, and with it the score, is identical across runs.
fn char_entropy_bits(text: &str) -> f64 {
    let mut freq: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        for lc in c.to_lowercase() {
            *freq.entry(lc).or_insert(0) += 1;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    -freq
        .values()
        .map(|&c| {
            let p = c as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}
