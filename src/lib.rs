//! Veritext estimates the probability that a piece of natural-language
//! text was produced by an AI generator rather than a human author.
//!
//! A pipeline of independent stylometric analyzers (lexical statistics,
//! transition-model perplexity, shape-pattern consistency, concept flow,
//! structural consistency) scores the document locally; an optional
//! external oracle verdict is fused in with configurable weights. The
//! result is a calibrated probability plus a per-sentence classification.

pub mod models;
pub mod services;

pub use models::{
    AnalysisReport, AnalyzeRequest, AnalyzerScore, Classification, ConfidenceTier, Distribution,
    OracleJudgment, SegmentResult,
};
pub use services::config_store::{ConfigError, ConfigStore, EngineConfig, FusionConfig};
pub use services::detection::engine::AnalysisError;
pub use services::detection::DetectionEngine;
pub use services::wordlists::WordLists;
