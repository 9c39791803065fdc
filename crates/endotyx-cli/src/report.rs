//! JSON output shapes for the CLI.

use endotyx_common::EndotyxError;
use endotyx_stats::baseline_provider::BaselineProvider;
use endotyx_stats::prediction_provider::PredictionProvider;
use endotyx_stats::{GeneComparison, GeneComparisonEngine};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeneReport {
    Computed(GeneComparison),
    Insufficient { gene: String, status: &'static str },
}

#[derive(Debug, Serialize)]
pub struct NoGenesReport {
    pub status: &'static str,
}

impl NoGenesReport {
    pub fn new() -> Self {
        Self { status: "no_genes_available" }
    }
}

impl Default for NoGenesReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-gene report; insufficient data is a report, anything else an error.
pub fn gene_report(
    engine: &GeneComparisonEngine,
    gene: &str,
    predictions: &dyn PredictionProvider,
    baseline: &dyn BaselineProvider,
) -> Result<GeneReport, EndotyxError> {
    match engine.compute_for_gene(gene, predictions, baseline) {
        Ok(comparison) => Ok(GeneReport::Computed(comparison)),
        Err(EndotyxError::InsufficientData { gene }) => {
            tracing::info!(%gene, "insufficient data");
            Ok(GeneReport::Insufficient {
                gene,
                status: "insufficient_data",
            })
        }
        Err(e) => Err(e),
    }
}
