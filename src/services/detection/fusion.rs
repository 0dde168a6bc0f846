// Score Fusion Engine
// Combines the local analyzers' sub-scores and the oracle verdict into one
// calibrated probability, and derives the presentation split of the
// remaining human share. When the oracle is absent the local weights are
// renormalized to carry the full probability.

use crate::models::{AnalyzerScore, Distribution};
use crate::services::config_store::FusionConfig;

#[derive(Debug, Clone, Copy)]
pub struct FusedScore {
    /// Final AI probability, integer in [0,100].
    pub ai_probability: i32,
    /// Weighted local-analyzer score before oracle blending, in [0,100].
    pub local_score: f64,
    /// True when an oracle verdict participated in the blend.
    pub oracle_used: bool,
}

/// Fuse local sub-scores with an optional oracle score.
///
/// The per-analyzer weights sum to 1.0 (validated at config load), so the
/// oracle-absent path is exactly the renormalized local-only fusion.
pub fn fuse_scores(
    scores: &[AnalyzerScore],
    oracle_score: Option<f64>,
    cfg: &FusionConfig,
) -> FusedScore {
    let local_score: f64 = scores
        .iter()
        .map(|s| cfg.analyzer_weights.get(&s.name) * s.score)
        .sum();
    let local_score = local_score.clamp(0.0, 100.0);

    let fused = match oracle_score {
        Some(oracle) => {
            cfg.local_share * local_score + cfg.oracle_share * oracle.clamp(0.0, 100.0)
        }
        None => local_score,
    };

    FusedScore {
        ai_probability: fused.round().clamp(0.0, 100.0) as i32,
        local_score,
        oracle_used: oracle_score.is_some(),
    }
}

/// Split the non-AI share into "human, AI-refined" and "purely human".
/// This is a presentation heuristic, not a separately modeled
/// classification; the three parts always sum to exactly 100.
pub fn derive_distribution(ai_probability: i32, refinement_ratio: f64) -> Distribution {
    let ai = ai_probability.clamp(0, 100);
    let human_share = 100 - ai;
    let human_ai_refined = (human_share as f64 * refinement_ratio).round() as i32;
    let human_pure = human_share - human_ai_refined;
    Distribution {
        ai_generated: ai,
        human_ai_refined,
        human_pure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, value: f64) -> AnalyzerScore {
        AnalyzerScore::new(name, value)
    }

    fn all_scores(value: f64) -> Vec<AnalyzerScore> {
        ["lexical", "transition", "pattern", "concept_flow", "structural"]
            .iter()
            .map(|n| score(n, value))
            .collect()
    }

    #[test]
    fn test_local_only_fusion_is_weighted_mean() {
        let scores = vec![
            score("lexical", 100.0),
            score("transition", 50.0),
            score("pattern", 0.0),
            score("concept_flow", 50.0),
            score("structural", 100.0),
        ];
        let fused = fuse_scores(&scores, None, &FusionConfig::default());
        assert_eq!(fused.ai_probability, 60);
        assert!(!fused.oracle_used);
    }

    #[test]
    fn test_oracle_blending_uses_configured_shares() {
        let fused = fuse_scores(&all_scores(80.0), Some(20.0), &FusionConfig::default());
        // 0.65 * 80 + 0.35 * 20 = 59
        assert_eq!(fused.ai_probability, 59);
        assert!(fused.oracle_used);
    }

    #[test]
    fn test_oracle_absent_renormalizes_to_local_only() {
        let with = fuse_scores(&all_scores(80.0), Some(80.0), &FusionConfig::default());
        let without = fuse_scores(&all_scores(80.0), None, &FusionConfig::default());
        // Identical signals agree regardless of the oracle's presence.
        assert_eq!(with.ai_probability, without.ai_probability);
        assert_eq!(without.ai_probability, 80);
    }

    #[test]
    fn test_probability_bounds() {
        for oracle in [None, Some(0.0), Some(100.0), Some(250.0)] {
            for local in [0.0, 50.0, 100.0] {
                let fused = fuse_scores(&all_scores(local), oracle, &FusionConfig::default());
                assert!((0..=100).contains(&fused.ai_probability));
            }
        }
    }

    #[test]
    fn test_distribution_identity_holds_for_every_probability() {
        for p in 0..=100 {
            let d = derive_distribution(p, 0.4);
            assert_eq!(d.human_ai_refined + d.human_pure, 100 - p);
            assert_eq!(d.ai_generated + d.human_ai_refined + d.human_pure, 100);
            assert!(d.human_ai_refined >= 0);
            assert!(d.human_pure >= 0);
        }
    }

    #[test]
    fn test_distribution_refinement_ratio() {
        let d = derive_distribution(60, 0.4);
        assert_eq!(d.ai_generated, 60);
        assert_eq!(d.human_ai_refined, 16);
        assert_eq!(d.human_pure, 24);

        let d = derive_distribution(60, 0.0);
        assert_eq!(d.human_ai_refined, 0);
        assert_eq!(d.human_pure, 40);
    }
}
