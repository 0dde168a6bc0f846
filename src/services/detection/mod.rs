// Detection Module
// Composite multi-signal scoring core, organized into one submodule per
// analyzer plus fusion and orchestration:
// - lexical: entropy / variance / diversity / marker statistics
// - transition: in-document bigram transition perplexity
// - pattern: token-shape and sentence-start shape regularity
// - concept_flow: two-pass concept introduction/development tracking
// - structural: paragraph-level shape regularity
// - fusion: weighted score fusion and distribution derivation
// - segments: per-sentence classification into confidence tiers
// - engine: analyzer fan-out, oracle coordination, report assembly

pub mod concept_flow;
pub mod engine;
pub mod fusion;
pub mod lexical;
pub mod pattern;
pub mod segments;
pub mod structural;
pub mod transition;

use crate::models::AnalyzerScore;
use crate::services::text_processor::SegmentedText;

pub use engine::DetectionEngine;
pub use fusion::{derive_distribution, fuse_scores, FusedScore};
pub use segments::classify_sentences;

/// Neutral sub-score used whenever a metric is undefined for the input
/// (single sentence, single token, empty frequency table).
pub const NEUTRAL_SCORE: f64 = 50.0;

/// One scoring signal over an immutable segmented document. Implementations
/// are pure and side-effect-free; the engine fans them out in parallel.
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;
    fn compute(&self, doc: &SegmentedText) -> AnalyzerScore;
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; 0.0 for fewer than two values (callers guard the
/// degenerate case themselves when a neutral score is required).
pub(crate) fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
