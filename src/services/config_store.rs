// Configuration Service
// Every numeric threshold and weight used by the analyzers lives here as a
// named, overridable field. Weight vectors are validated at load time and
// invalid configurations fail closed before any request is served.
//
// The clamp bands are placeholder defaults tuned for English prose; they
// are expected to be recalibrated per language/domain.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{context} weights must sum to 1.0 (got {sum})")]
    InvalidWeights { context: &'static str, sum: f64 },
    #[error("band for {0} must satisfy lo < hi")]
    InvalidBand(&'static str),
    #[error("{0}")]
    InvalidValue(String),
}

/// A human-typical range for a raw metric. Values are mapped linearly
/// through the band and saturate at 0 or 100 outside it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl Band {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// AI-likeness score for a metric where low values are AI-like.
    pub fn score_low_is_ai(&self, value: f64) -> f64 {
        (100.0 * (self.hi - value) / (self.hi - self.lo)).clamp(0.0, 100.0)
    }

    /// AI-likeness score for a metric where high values are AI-like.
    pub fn score_high_is_ai(&self, value: f64) -> f64 {
        (100.0 * (value - self.lo) / (self.hi - self.lo)).clamp(0.0, 100.0)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !(self.lo < self.hi) || !self.lo.is_finite() || !self.hi.is_finite() {
            return Err(ConfigError::InvalidBand(name));
        }
        Ok(())
    }
}

// ============ Analyzer Sections ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicalConfig {
    /// Character entropy in bits; low entropy reads as AI-like.
    #[serde(default = "default_entropy_band")]
    pub entropy: Band,
    /// Population variance of per-sentence word counts; low variance is AI-like.
    #[serde(default = "default_sentence_variance_band")]
    pub sentence_length_variance: Band,
    /// Population variance of per-sentence comma/semicolon/colon counts.
    #[serde(default = "default_punct_variance_band")]
    pub punctuation_variance: Band,
    /// Distinct/total lowercased tokens; low diversity is AI-like.
    #[serde(default = "default_diversity_band")]
    pub diversity: Band,
    /// Personal/informal markers per token; their absence is AI-like.
    #[serde(default = "default_marker_band")]
    pub marker_density: Band,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            entropy: default_entropy_band(),
            sentence_length_variance: default_sentence_variance_band(),
            punctuation_variance: default_punct_variance_band(),
            diversity: default_diversity_band(),
            marker_density: default_marker_band(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionConfig {
    /// In-document bigram perplexity; low perplexity is AI-like.
    #[serde(default = "default_perplexity_band")]
    pub perplexity: Band,
    #[serde(default = "default_probability_floor")]
    pub probability_floor: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            perplexity: default_perplexity_band(),
            probability_floor: default_probability_floor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternConfig {
    #[serde(default = "default_shape_window")]
    pub shape_window: usize,
    #[serde(default = "default_token_shape_weight")]
    pub token_shape_weight: f64,
    #[serde(default = "default_sentence_start_weight")]
    pub sentence_start_weight: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            shape_window: default_shape_window(),
            token_shape_weight: default_token_shape_weight(),
            sentence_start_weight: default_sentence_start_weight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptConfig {
    /// A concept stays active until this many sentences pass without it.
    #[serde(default = "default_active_window")]
    pub active_window: usize,
    #[serde(default = "default_min_term_len")]
    pub min_term_len: usize,
    /// Context-overlap ratio at or above which a re-occurrence counts as
    /// repetition rather than elaboration.
    #[serde(default = "default_repetition_overlap")]
    pub repetition_overlap: f64,
    #[serde(default = "default_introduction_weight")]
    pub introduction_weight: f64,
    #[serde(default = "default_development_weight")]
    pub development_weight: f64,
    #[serde(default = "default_relation_weight")]
    pub relation_weight: f64,
    #[serde(default = "default_consistency_weight")]
    pub consistency_weight: f64,
}

impl Default for ConceptConfig {
    fn default() -> Self {
        Self {
            active_window: default_active_window(),
            min_term_len: default_min_term_len(),
            repetition_overlap: default_repetition_overlap(),
            introduction_weight: default_introduction_weight(),
            development_weight: default_development_weight(),
            relation_weight: default_relation_weight(),
            consistency_weight: default_consistency_weight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralConfig {
    #[serde(default = "default_length_weight")]
    pub length_weight: f64,
    #[serde(default = "default_shape_weight")]
    pub shape_weight: f64,
    #[serde(default = "default_marker_weight")]
    pub marker_weight: f64,
    /// Max relative deviation under which lengths count as systematic.
    #[serde(default = "default_systematic_deviation")]
    pub systematic_deviation: f64,
    /// Deviation at which the length-regularity score bottoms out.
    #[serde(default = "default_deviation_ceiling")]
    pub deviation_ceiling: f64,
    /// Relative tolerance for the uniform-body shape alternative.
    #[serde(default = "default_uniform_tolerance")]
    pub uniform_tolerance: f64,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            length_weight: default_length_weight(),
            shape_weight: default_shape_weight(),
            marker_weight: default_marker_weight(),
            systematic_deviation: default_systematic_deviation(),
            deviation_ceiling: default_deviation_ceiling(),
            uniform_tolerance: default_uniform_tolerance(),
        }
    }
}

// ============ Fusion ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerWeights {
    #[serde(default = "default_fifth")]
    pub lexical: f64,
    #[serde(default = "default_fifth")]
    pub transition: f64,
    #[serde(default = "default_fifth")]
    pub pattern: f64,
    #[serde(default = "default_fifth")]
    pub concept_flow: f64,
    #[serde(default = "default_fifth")]
    pub structural: f64,
}

impl Default for AnalyzerWeights {
    fn default() -> Self {
        Self {
            lexical: default_fifth(),
            transition: default_fifth(),
            pattern: default_fifth(),
            concept_flow: default_fifth(),
            structural: default_fifth(),
        }
    }
}

impl AnalyzerWeights {
    pub fn get(&self, name: &str) -> f64 {
        match name {
            "lexical" => self.lexical,
            "transition" => self.transition,
            "pattern" => self.pattern,
            "concept_flow" => self.concept_flow,
            "structural" => self.structural,
            _ => 0.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.lexical + self.transition + self.pattern + self.concept_flow + self.structural
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionConfig {
    /// Share of the fused probability carried by the local analyzers.
    #[serde(default = "default_local_share")]
    pub local_share: f64,
    /// Share carried by the oracle when it responds.
    #[serde(default = "default_oracle_share")]
    pub oracle_share: f64,
    /// Per-analyzer weights within the local share; must sum to 1.0.
    #[serde(default)]
    pub analyzer_weights: AnalyzerWeights,
    /// Fraction of the non-AI share attributed to "human, AI-refined".
    #[serde(default = "default_refinement_ratio")]
    pub refinement_ratio: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            local_share: default_local_share(),
            oracle_share: default_oracle_share(),
            analyzer_weights: AnalyzerWeights::default(),
            refinement_ratio: default_refinement_ratio(),
        }
    }
}

impl FusionConfig {
    /// Named weight presets reproducing the historical score-combination
    /// variants as configuration rather than separate code paths.
    pub fn preset(name: &str) -> Option<Self> {
        let (local, oracle) = match name.trim().to_lowercase().as_str() {
            "balanced" => (0.65, 0.35),
            "local-heavy" => (0.7, 0.3),
            "oracle-heavy" => (0.6, 0.4),
            _ => return None,
        };
        Some(Self {
            local_share: local,
            oracle_share: oracle,
            ..Self::default()
        })
    }
}

// ============ Segment Classifier ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentConfig {
    /// Scores above this classify the sentence as AI.
    #[serde(default = "default_ai_threshold")]
    pub ai_threshold: f64,
    #[serde(default = "default_high_band")]
    pub high_confidence: f64,
    #[serde(default = "default_medium_band")]
    pub medium_confidence: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            ai_threshold: default_ai_threshold(),
            high_confidence: default_high_band(),
            medium_confidence: default_medium_band(),
        }
    }
}

// ============ Oracle ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_oracle_url")]
    pub base_url: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
    /// API key; falls back to the VERITEXT_ORACLE_API_KEY env var.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_oracle_attempts")]
    pub max_attempts: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_oracle_url(),
            model: default_oracle_model(),
            api_key: None,
            timeout_secs: default_oracle_timeout(),
            max_attempts: default_oracle_attempts(),
        }
    }
}

// ============ Engine Config ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub lexical: LexicalConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub pattern: PatternConfig,
    #[serde(default)]
    pub concept: ConceptConfig,
    #[serde(default)]
    pub structural: StructuralConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
}

fn check_sum(context: &'static str, sum: f64) -> Result<(), ConfigError> {
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(ConfigError::InvalidWeights { context, sum });
    }
    Ok(())
}

impl EngineConfig {
    /// Reject inconsistent weight vectors and malformed bands before any
    /// analysis runs (fail closed at configuration-load time).
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_sum("analyzer", self.fusion.analyzer_weights.sum())?;
        check_sum(
            "local/oracle share",
            self.fusion.local_share + self.fusion.oracle_share,
        )?;
        check_sum(
            "concept",
            self.concept.introduction_weight
                + self.concept.development_weight
                + self.concept.relation_weight
                + self.concept.consistency_weight,
        )?;
        check_sum(
            "pattern",
            self.pattern.token_shape_weight + self.pattern.sentence_start_weight,
        )?;
        check_sum(
            "structural",
            self.structural.length_weight
                + self.structural.shape_weight
                + self.structural.marker_weight,
        )?;

        if !(0.0..=1.0).contains(&self.fusion.refinement_ratio) {
            return Err(ConfigError::InvalidValue(format!(
                "refinement ratio must be in [0,1] (got {})",
                self.fusion.refinement_ratio
            )));
        }
        if self.segment.high_confidence < self.segment.medium_confidence {
            return Err(ConfigError::InvalidValue(
                "segment confidence bands must be ordered high >= medium".to_string(),
            ));
        }
        if self.pattern.shape_window < 2 {
            return Err(ConfigError::InvalidValue(
                "pattern shape window must be at least 2 tokens".to_string(),
            ));
        }

        self.lexical.entropy.validate("lexical.entropy")?;
        self.lexical
            .sentence_length_variance
            .validate("lexical.sentenceLengthVariance")?;
        self.lexical
            .punctuation_variance
            .validate("lexical.punctuationVariance")?;
        self.lexical.diversity.validate("lexical.diversity")?;
        self.lexical.marker_density.validate("lexical.markerDensity")?;
        self.transition.perplexity.validate("transition.perplexity")?;

        Ok(())
    }
}

// ============ Config Store ============

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self {
            config_dir,
            config_file,
        }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("veritext"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }

    /// Load and validate configuration; a missing file yields the defaults.
    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(EngineConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }
}

// ============ Default Value Functions ============

fn default_entropy_band() -> Band { Band::new(4.0, 5.0) }
fn default_sentence_variance_band() -> Band { Band::new(0.0, 15.0) }
fn default_punct_variance_band() -> Band { Band::new(0.0, 1.2) }
fn default_diversity_band() -> Band { Band::new(0.4, 0.8) }
fn default_marker_band() -> Band { Band::new(0.02, 0.12) }
fn default_perplexity_band() -> Band { Band::new(1.5, 5.0) }
fn default_probability_floor() -> f64 { 1e-10 }
fn default_shape_window() -> usize { 3 }
fn default_token_shape_weight() -> f64 { 0.6 }
fn default_sentence_start_weight() -> f64 { 0.4 }
fn default_active_window() -> usize { 3 }
fn default_min_term_len() -> usize { 4 }
fn default_repetition_overlap() -> f64 { 0.5 }
fn default_introduction_weight() -> f64 { 0.25 }
fn default_development_weight() -> f64 { 0.30 }
fn default_relation_weight() -> f64 { 0.25 }
fn default_consistency_weight() -> f64 { 0.20 }
fn default_length_weight() -> f64 { 0.45 }
fn default_shape_weight() -> f64 { 0.30 }
fn default_marker_weight() -> f64 { 0.25 }
fn default_systematic_deviation() -> f64 { 0.3 }
fn default_deviation_ceiling() -> f64 { 0.6 }
fn default_uniform_tolerance() -> f64 { 0.1 }
fn default_fifth() -> f64 { 0.2 }
fn default_local_share() -> f64 { 0.65 }
fn default_oracle_share() -> f64 { 0.35 }
fn default_refinement_ratio() -> f64 { 0.4 }
fn default_ai_threshold() -> f64 { 70.0 }
fn default_high_band() -> f64 { 85.0 }
fn default_medium_band() -> f64 { 70.0 }
fn default_oracle_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_oracle_model() -> String { "gpt-4o-mini".to_string() }
fn default_oracle_timeout() -> u64 { 30 }
fn default_oracle_attempts() -> usize { 2 }
