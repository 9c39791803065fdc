//! Baseline (reference cohort) files.
//!
//! JSON files map gene -> values. CSV files use the upload layout, and each
//! gene column becomes that gene's sequence; missing cells are dropped, never
//! imputed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use endotyx_common::{BaselineDataset, EndotyxError, IngestConfig, Result};
use endotyx_stats::baseline_provider::BaselineProvider;
use tracing::{info, warn};

use crate::expression::{check_file_size, parse_expression_csv};

pub fn parse_baseline_json(content: &str) -> Result<BaselineDataset> {
    let dataset: BaselineDataset = serde_json::from_str(content)?;
    Ok(dataset)
}

pub fn parse_baseline_csv(content: &str, cfg: &IngestConfig) -> Result<BaselineDataset> {
    let cfg = IngestConfig {
        impute_missing: false,
        ..cfg.clone()
    };
    let matrix = parse_expression_csv(content, &cfg)?;
    Ok(matrix
        .genes
        .iter()
        .enumerate()
        .map(|(col, gene)| (gene.clone(), matrix.column(col)))
        .collect())
}

/// Load a baseline file, dispatching on its extension.
pub async fn load_baseline(path: impl AsRef<Path>, cfg: &IngestConfig) -> Result<BaselineDataset> {
    let path = path.as_ref();
    check_file_size(path, cfg).await?;
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read baseline {:?}", path))?;

    let dataset = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_baseline_json(&content)?,
        Some("csv") => parse_baseline_csv(&content, cfg)?,
        _ => {
            return Err(EndotyxError::Validation(format!(
                "Baseline must be a .json or .csv file: {:?}",
                path
            )))
        }
    };

    info!("Loaded baseline for {} genes from {:?}", dataset.len(), path);
    Ok(dataset)
}

// ── File-backed provider ───────────────────────────────────────────────────

/// Baseline provider over a file resolved once at construction.
///
/// A load failure does not fail construction: it is kept and reported as
/// `BaselineUnavailable` on every lookup, so the engine keeps working with the
/// selected group only.
#[derive(Debug, Clone)]
pub struct FileBaselineProvider {
    path: PathBuf,
    dataset: std::result::Result<BaselineDataset, String>,
}

impl FileBaselineProvider {
    pub async fn open(path: impl Into<PathBuf>, cfg: &IngestConfig) -> Self {
        let path = path.into();
        let dataset = match load_baseline(&path, cfg).await {
            Ok(dataset) => Ok(dataset),
            Err(e) => {
                warn!("Baseline {:?} unavailable: {}", path, e);
                Err(e.to_string())
            }
        };
        Self { path, dataset }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_available(&self) -> bool {
        self.dataset.is_ok()
    }
}

impl BaselineProvider for FileBaselineProvider {
    fn baseline_for(&self, gene: &str) -> Result<Option<Vec<f64>>> {
        match &self.dataset {
            Ok(dataset) => Ok(dataset.values(gene).map(<[f64]>::to_vec)),
            Err(reason) => Err(EndotyxError::BaselineUnavailable(reason.clone())),
        }
    }
}
