use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndotyxError {
    #[error("No genes available for comparison")]
    NoGenesAvailable,

    #[error("Insufficient data for gene {gene}: neither group has values")]
    InsufficientData { gene: String },

    #[error("Baseline unavailable: {0}")]
    BaselineUnavailable(String),

    #[error("Gene index {index} out of range (gene count {count})")]
    GeneIndexOutOfRange { index: usize, count: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EndotyxError {
    /// True for failures that should shrink the visualization rather than abort it.
    pub fn is_degradation(&self) -> bool {
        matches!(
            self,
            EndotyxError::BaselineUnavailable(_) | EndotyxError::InsufficientData { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EndotyxError>;
