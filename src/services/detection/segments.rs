// Segment Classifier
// Re-applies the local analyzer set to each sentence in isolation and
// buckets it into an AI/Human classification with a confidence tier.
// The oracle is deliberately not consulted per segment; sentence-level
// classification stays local to bound latency and cost.

use super::fusion::fuse_scores;
use super::Analyzer;
use crate::models::{Classification, ConfidenceTier, SegmentResult};
use crate::services::config_store::{FusionConfig, SegmentConfig};
use crate::services::text_processor::SegmentedText;

/// Classify every sentence independently with the given analyzer set.
/// Pure over its inputs; repeated runs yield identical segments.
pub fn classify_sentences(
    doc: &SegmentedText,
    analyzers: &[Box<dyn Analyzer>],
    fusion: &FusionConfig,
    cfg: &SegmentConfig,
) -> Vec<SegmentResult> {
    doc.sentences
        .iter()
        .map(|sentence| classify_one(sentence, analyzers, fusion, cfg))
        .collect()
}

fn classify_one(
    sentence: &str,
    analyzers: &[Box<dyn Analyzer>],
    fusion: &FusionConfig,
    cfg: &SegmentConfig,
) -> SegmentResult {
    let sub = SegmentedText::new(sentence);
    let scores: Vec<_> = analyzers.iter().map(|a| a.compute(&sub)).collect();
    let fused = fuse_scores(&scores, None, fusion);
    let score = fused.local_score;

    let is_ai = score > cfg.ai_threshold;
    // Confidence reflects how decisively the winning side scored.
    let effective = if is_ai { score } else { 100.0 - score };
    let confidence = if effective > cfg.high_confidence {
        ConfidenceTier::High
    } else if effective > cfg.medium_confidence {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    };

    SegmentResult {
        text: sentence.to_string(),
        classification: if is_ai {
            Classification::Ai
        } else {
            Classification::Human
        },
        confidence,
        score,
    }
}
