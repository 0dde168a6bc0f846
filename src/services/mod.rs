// Veritext Core Services

pub mod config_store;
pub mod detection;
pub mod oracle;
pub mod text_processor;
pub mod wordlists;

pub use config_store::{Band, ConfigError, ConfigStore, EngineConfig, FusionConfig};
pub use oracle::{OracleClient, OracleError};
pub use text_processor::{normalize_punctuation, SegmentedText};
pub use wordlists::WordLists;

// Re-export detection module surface
pub use detection::{
    classify_sentences,
    derive_distribution,
    fuse_scores,
    Analyzer,
    DetectionEngine,
    FusedScore,
};
pub use detection::engine::AnalysisError;
