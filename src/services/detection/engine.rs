// Detection Engine
// Orchestrates one analysis call: segments the document once, fans the
// local analyzers out in parallel while the oracle request is in flight,
// fuses the results, and classifies each sentence. Oracle failures degrade
// to local-only fusion and are surfaced as a report flag, never an error.

use super::concept_flow::ConceptFlowAnalyzer;
use super::fusion::{derive_distribution, fuse_scores};
use super::lexical::LexicalAnalyzer;
use super::pattern::PatternAnalyzer;
use super::segments::classify_sentences;
use super::structural::StructuralAnalyzer;
use super::transition::TransitionAnalyzer;
use super::Analyzer;
use crate::models::{AnalysisReport, AnalyzeRequest, AnalyzerScore, OracleJudgment};
use crate::services::config_store::{ConfigError, EngineConfig};
use crate::services::oracle::OracleClient;
use crate::services::text_processor::{normalize_punctuation, SegmentedText};
use crate::services::wordlists::WordLists;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("input text is empty")]
    InvalidInput,
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// The fixed analyzer set, in feature-vector order.
pub fn build_analyzers(config: &EngineConfig, lists: Arc<WordLists>) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(LexicalAnalyzer::new(config.lexical.clone(), lists.clone())),
        Box::new(TransitionAnalyzer::new(config.transition.clone())),
        Box::new(PatternAnalyzer::new(config.pattern.clone())),
        Box::new(ConceptFlowAnalyzer::new(config.concept.clone(), lists.clone())),
        Box::new(StructuralAnalyzer::new(config.structural.clone(), lists)),
    ]
}

pub struct DetectionEngine {
    config: EngineConfig,
    lists: Arc<WordLists>,
    oracle: Option<OracleClient>,
}

impl DetectionEngine {
    /// Build an engine from a validated configuration; inconsistent weight
    /// vectors are rejected here, before any request is served.
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        Self::with_wordlists(config, WordLists::default())
    }

    pub fn with_wordlists(config: EngineConfig, lists: WordLists) -> Result<Self, AnalysisError> {
        config.validate()?;
        let oracle = config
            .oracle
            .enabled
            .then(|| OracleClient::from_config(&config.oracle));
        Ok(Self {
            config,
            lists: Arc::new(lists),
            oracle,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a document and produce the terminal report.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, AnalysisError> {
        if request.text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput);
        }

        let started = Instant::now();
        let normalized = normalize_punctuation(&request.text);
        let doc = Arc::new(SegmentedText::new(&normalized));
        info!(
            "[ENGINE] analyzing: {} chars, {} words, {} sentences, {} paragraphs",
            normalized.chars().count(),
            doc.word_count(),
            doc.sentences.len(),
            doc.paragraphs.len()
        );

        // Local analyzers and the oracle are independent; run them
        // concurrently and block only on what fusion actually needs.
        let local_fut = self.run_local_analyzers(doc.clone());
        let oracle_fut = self.run_oracle(&doc.text, request.language.as_deref());
        let (scores, (oracle_judgment, oracle_degraded)) = tokio::join!(local_fut, oracle_fut);

        let fused = fuse_scores(
            &scores,
            oracle_judgment.as_ref().map(|j| j.probability),
            &self.config.fusion,
        );
        let distribution =
            derive_distribution(fused.ai_probability, self.config.fusion.refinement_ratio);

        let analyzers = build_analyzers(&self.config, self.lists.clone());
        let segments =
            classify_sentences(&doc, &analyzers, &self.config.fusion, &self.config.segment);

        info!(
            "[ENGINE] done: probability={} oracle_used={} degraded={} elapsed_ms={}",
            fused.ai_probability,
            fused.oracle_used,
            oracle_degraded,
            started.elapsed().as_millis()
        );

        Ok(AnalysisReport {
            request_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            ai_probability: fused.ai_probability,
            word_count: doc.word_count() as i32,
            character_count: request.text.chars().count() as i32,
            segments,
            metrics: scores,
            distribution,
            oracle: oracle_judgment,
            oracle_degraded,
        })
    }

    /// Convenience wrapper for callers holding a plain string.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(&AnalyzeRequest {
            text: text.to_string(),
            language: None,
        })
        .await
    }

    async fn run_local_analyzers(&self, doc: Arc<SegmentedText>) -> Vec<AnalyzerScore> {
        let analyzers = build_analyzers(&self.config, self.lists.clone());
        let count = analyzers.len();

        let mut set = JoinSet::new();
        for (idx, analyzer) in analyzers.into_iter().enumerate() {
            let doc = doc.clone();
            set.spawn(async move { (idx, analyzer.compute(&doc)) });
        }

        let mut ordered: Vec<Option<AnalyzerScore>> = (0..count).map(|_| None).collect();
        while let Some(res) = set.join_next().await {
            match res {
                Ok((idx, score)) => ordered[idx] = Some(score),
                Err(e) => warn!("[ENGINE] analyzer task failed: {}", e),
            }
        }
        ordered.into_iter().flatten().collect()
    }

    /// Returns (judgment, degraded): degraded is set only when an oracle
    /// was configured and could not produce a verdict.
    async fn run_oracle(
        &self,
        text: &str,
        language: Option<&str>,
    ) -> (Option<OracleJudgment>, bool) {
        let Some(client) = &self.oracle else {
            return (None, false);
        };
        match client.judge(text, language).await {
            Ok(judgment) => (Some(judgment), false),
            Err(e) => {
                warn!("[ENGINE] oracle unavailable, degrading to local-only fusion: {}", e);
                (None, true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::config_store::OracleConfig;

    const REGULAR: &str = "The system processes the data. The system analyzes the data. \
                           The system reports the data. The system stores the data. \
                           The system finishes the task.";
    const INFORMAL: &str = "I think, maybe, this works? Honestly not sure... \
                            but I tried :) it kind of helped a little I guess.";

    fn engine() -> DetectionEngine {
        DetectionEngine::new(EngineConfig::default()).unwrap()
    }

    fn metric<'a>(report: &'a AnalysisReport, name: &str) -> &'a AnalyzerScore {
        report
            .metrics
            .iter()
            .find(|m| m.name == name)
            .unwrap_or_else(|| panic!("missing analyzer {name}"))
    }

    #[tokio::test]
    async fn test_empty_input_fails_fast() {
        let err = engine().analyze_text("   \n\t ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput));
    }

    #[tokio::test]
    async fn test_regular_text_reads_as_ai() {
        let report = engine().analyze_text(REGULAR).await.unwrap();
        assert!(
            report.ai_probability > 60,
            "probability was {}",
            report.ai_probability
        );
        assert!(metric(&report, "pattern").score > 70.0);
        assert!(metric(&report, "structural").score > 70.0);
        assert_eq!(report.segments.len(), 5);
        assert!(!report.oracle_degraded);
    }

    #[tokio::test]
    async fn test_informal_text_reads_as_human() {
        let report = engine().analyze_text(INFORMAL).await.unwrap();
        assert!(
            report.ai_probability < 40,
            "probability was {}",
            report.ai_probability
        );
        assert!(metric(&report, "lexical").score < 40.0);
    }

    #[tokio::test]
    async fn test_one_word_document_is_degenerate_safe() {
        let report = engine().analyze_text("Word.").await.unwrap();
        assert!((0..=100).contains(&report.ai_probability));
        assert_eq!(report.word_count, 1);
        assert_eq!(report.segments.len(), 1);
        for m in &report.metrics {
            assert!(m.score.is_finite(), "analyzer {} produced {}", m.name, m.score);
            for (key, value) in &m.metrics {
                assert!(value.is_finite(), "{}::{} was {}", m.name, key, value);
            }
        }
        let d = report.distribution;
        assert_eq!(d.ai_generated + d.human_ai_refined + d.human_pure, 100);
    }

    #[tokio::test]
    async fn test_pipeline_is_deterministic_without_oracle() {
        let engine = engine();
        let first = engine.analyze_text(REGULAR).await.unwrap();
        let second = engine.analyze_text(REGULAR).await.unwrap();
        assert_eq!(first.ai_probability, second.ai_probability);
        assert_eq!(first.segments.len(), second.segments.len());
        for (a, b) in first.segments.iter().zip(second.segments.iter()) {
            assert_eq!(a.score, b.score);
            assert_eq!(a.classification, b.classification);
        }
    }

    #[tokio::test]
    async fn test_unreachable_oracle_degrades_to_local() {
        let mut config = EngineConfig::default();
        config.oracle = OracleConfig {
            enabled: true,
            base_url: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 2,
            max_attempts: 1,
            ..OracleConfig::default()
        };
        let degraded = DetectionEngine::new(config)
            .unwrap()
            .analyze_text(REGULAR)
            .await
            .unwrap();
        assert!(degraded.oracle_degraded);
        assert!(degraded.oracle.is_none());

        // Degraded fusion equals the oracle-disabled local-only result.
        let local = engine().analyze_text(REGULAR).await.unwrap();
        assert_eq!(degraded.ai_probability, local.ai_probability);
    }

    #[tokio::test]
    async fn test_probability_bounds_across_inputs() {
        let engine = engine();
        for text in [
            "x",
            "One two three.",
            REGULAR,
            INFORMAL,
            "However, the approach works. Therefore, it scales.",
        ] {
            let report = engine.analyze_text(text).await.unwrap();
            assert!(
                (0..=100).contains(&report.ai_probability),
                "out of bounds for {text:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_word_and_character_counts_match_input() {
        let text = "Counting words here.";
        let report = engine().analyze_text(text).await.unwrap();
        assert_eq!(report.word_count, 3);
        assert_eq!(report.character_count, text.chars().count() as i32);
    }
}
