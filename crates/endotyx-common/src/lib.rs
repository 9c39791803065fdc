//! endotyx-common — Shared types, errors, and configuration used across all endotyx crates.

pub mod error;
pub mod entities;
pub mod analysis_config;

// Re-export commonly used types
pub use analysis_config::{AnalysisConfig, GroupLabels, IngestConfig, StatisticsConfig};
pub use entities::{
    BaselineDataset, Classification, ExpressionMatrix, ExpressionSample, PredictionLabel,
    PredictionRecord,
};
pub use error::{EndotyxError, Result};
