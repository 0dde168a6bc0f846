// Veritext Data Models
// Serializable types exchanged between the engine and its callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============ Analysis Request ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    /// Optional language hint forwarded to the oracle; the local analyzers
    /// are language-agnostic apart from the configured word lists.
    pub language: Option<String>,
}

// ============ Feature Vector ============

/// One analyzer's contribution: a sub-score in [0,100] (higher = more
/// AI-like) plus the raw metrics it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerScore {
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl AnalyzerScore {
    pub fn new(name: &str, score: f64) -> Self {
        Self {
            name: name.to_string(),
            score: score.clamp(0.0, 100.0),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, key: &str, value: f64) -> Self {
        self.metrics.insert(key.to_string(), value);
        self
    }
}

/// Ordered sequence of analyzer scores, in fixed analyzer order.
pub type FeatureVector = Vec<AnalyzerScore>;

// ============ Segments ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "AI")]
    Ai,
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    pub text: String,
    pub classification: Classification,
    pub confidence: ConfidenceTier,
    /// Local fused score for this sentence, in [0,100].
    pub score: f64,
}

// ============ Oracle Judgment ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OracleJudgment {
    /// AI probability in [0,100].
    pub probability: f64,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

// ============ Distribution ============

/// Presentation split of the non-AI share into "refined" and "pure" parts.
/// `ai_generated + human_ai_refined + human_pure == 100` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub ai_generated: i32,
    pub human_ai_refined: i32,
    pub human_pure: i32,
}

// ============ Analysis Report ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub request_id: String,
    pub generated_at: String,
    pub ai_probability: i32,
    pub word_count: i32,
    pub character_count: i32,
    pub segments: Vec<SegmentResult>,
    pub metrics: FeatureVector,
    pub distribution: Distribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle: Option<OracleJudgment>,
    /// True when an oracle was configured but could not be reached; the
    /// probability was then fused from local analyzers alone.
    #[serde(default)]
    pub oracle_degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_score_clamps() {
        let s = AnalyzerScore::new("lexical", 140.0);
        assert_eq!(s.score, 100.0);
        let s = AnalyzerScore::new("lexical", -3.0);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_report_roundtrip() {
        let report = AnalysisReport {
            request_id: "r-1".to_string(),
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            ai_probability: 62,
            word_count: 10,
            character_count: 55,
            segments: vec![SegmentResult {
                text: "Example sentence".to_string(),
                classification: Classification::Human,
                confidence: ConfidenceTier::Low,
                score: 41.0,
            }],
            metrics: vec![AnalyzerScore::new("lexical", 70.0).with_metric("entropyBits", 4.2)],
            distribution: Distribution {
                ai_generated: 62,
                human_ai_refined: 15,
                human_pure: 23,
            },
            oracle: None,
            oracle_degraded: true,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"aiProbability\":62"));
        assert!(json.contains("\"oracleDegraded\":true"));
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ai_probability, 62);
        assert_eq!(parsed.segments.len(), 1);
    }
}
