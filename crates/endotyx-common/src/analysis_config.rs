//! Analysis configuration.
//!
//! Read from `endotyx.toml` (or the path in `ENDOTYX_CONFIG`); YAML and JSON
//! files are accepted as well. Every section falls back to its defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EndotyxError, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "ENDOTYX_CONFIG";

/// Config file read when `ENDOTYX_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "endotyx.toml";

/// Complete analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Box-plot statistics
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Gene list selection
    #[serde(default)]
    pub genes: GeneSelectionConfig,

    /// Comparison group labels
    #[serde(default)]
    pub groups: GroupLabels,

    /// Upload parsing
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Input file locations
    #[serde(default)]
    pub data: DataPaths,
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// IQR multiplier for the outlier fences
    #[serde(default = "default_fence_multiplier")]
    pub fence_multiplier: f64,
}

fn default_fence_multiplier() -> f64 { 1.5 }

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            fence_multiplier: default_fence_multiplier(),
        }
    }
}

// ── Gene selection ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSelectionConfig {
    /// Number of top-variance genes to compare
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Explicit ordered gene list; overrides top-variance selection when non-empty
    #[serde(default)]
    pub explicit: Vec<String>,
}

fn default_top_n() -> usize { 10 }

impl Default for GeneSelectionConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            explicit: vec![],
        }
    }
}

// ── Group labels ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLabels {
    #[serde(default = "default_selected_label")]
    pub selected_label: String,

    #[serde(default = "default_baseline_label")]
    pub baseline_label: String,
}

fn default_selected_label() -> String { "Positive patients".to_string() }
fn default_baseline_label() -> String { "Baseline cohort".to_string() }

impl Default for GroupLabels {
    fn default() -> Self {
        Self {
            selected_label: default_selected_label(),
            baseline_label: default_baseline_label(),
        }
    }
}

// ── Ingest ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Fill missing cells with the column mean (0 for all-missing columns)
    #[serde(default = "default_true")]
    pub impute_missing: bool,

    /// Uploads larger than this are rejected
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
}

fn default_true() -> bool { true }
fn default_max_file_size() -> u64 { 10 * 1024 * 1024 }

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            impute_missing: true,
            max_file_size_bytes: default_max_file_size(),
        }
    }
}

// ── Data paths ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    pub expression_csv: Option<PathBuf>,
    pub predictions_json: Option<PathBuf>,
    /// Baseline cohort, `.json` or `.csv`
    pub baseline: Option<PathBuf>,
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl AnalysisConfig {
    /// Load from `ENDOTYX_CONFIG`, or `endotyx.toml` if present, or defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_path(Path::new(&path)),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    tracing::debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load by file extension (`.toml`, `.yaml`/`.yml`, `.json`).
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(path),
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            Some("json") => Self::from_json(path),
            _ => Err(EndotyxError::Config(format!(
                "Unsupported config format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let k = self.statistics.fence_multiplier;
        if !k.is_finite() || k < 0.0 {
            return Err(EndotyxError::Config(format!(
                "statistics.fence_multiplier must be a non-negative number, got {k}"
            )));
        }
        if self.genes.top_n == 0 {
            return Err(EndotyxError::Config("genes.top_n must be at least 1".to_string()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
