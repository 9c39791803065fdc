//! Per-gene comparison orchestration.
//!
//! `compute_for_gene` is a pure function of (predictions, baseline, gene); the
//! only state the engine keeps is the ordered gene list and the selection
//! cursor over it, which resets whenever the gene list is replaced.

use endotyx_common::{AnalysisConfig, EndotyxError, GroupLabels, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::baseline_provider::BaselineProvider;
use crate::comparison::{ComparisonRecord, GroupComparisonBuilder};
use crate::gene_list_provider::GeneListProvider;
use crate::overlay::{extract_overlays, OverlayMarker};
use crate::prediction_provider::PredictionProvider;
use crate::quantile::{QuantileSummary, DEFAULT_FENCE_MULTIPLIER};

/// Non-fatal conditions attached to a per-gene result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonWarning {
    BaselineUnavailable { gene: String, reason: String },
}

/// Everything the chart needs for one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneComparison {
    pub gene: String,
    pub comparison_records: Vec<ComparisonRecord>,
    pub overlays: Vec<OverlayMarker>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ComparisonWarning>,
}

// ── Selection cursor ────────────────────────────────────────────────────────

/// Index into a fixed-length gene list, bounded to `[0, count - 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneCursor {
    index: usize,
    count: usize,
}

impl GeneCursor {
    pub fn new(count: usize) -> Self {
        Self { index: 0, count }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Advance by one; stays on the last gene.
    pub fn next(&mut self) -> usize {
        if self.index + 1 < self.count {
            self.index += 1;
        }
        self.index
    }

    /// Step back by one; stays on the first gene.
    pub fn previous(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    pub fn select(&mut self, index: usize) -> Result<usize> {
        if index >= self.count {
            return Err(EndotyxError::GeneIndexOutOfRange {
                index,
                count: self.count,
            });
        }
        self.index = index;
        Ok(self.index)
    }
}

// ── Engine ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeneComparisonEngine {
    genes: Vec<String>,
    cursor: GeneCursor,
    labels: GroupLabels,
    fence_multiplier: f64,
}

impl GeneComparisonEngine {
    /// Engine over `genes` with default labels and 1.5 x IQR fences.
    pub fn new(genes: Vec<String>) -> Self {
        Self {
            cursor: GeneCursor::new(genes.len()),
            genes,
            labels: GroupLabels::default(),
            fence_multiplier: DEFAULT_FENCE_MULTIPLIER,
        }
    }

    pub fn from_provider(genes: &dyn GeneListProvider, config: &AnalysisConfig) -> Self {
        Self::new(genes.genes()).with_config(config)
    }

    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.labels = config.groups.clone();
        self.fence_multiplier = config.statistics.fence_multiplier;
        self
    }

    /// Replace the gene list (new dataset); the cursor returns to 0.
    pub fn reset_genes(&mut self, genes: &dyn GeneListProvider) {
        self.genes = genes.genes();
        self.cursor = GeneCursor::new(self.genes.len());
        debug!(gene_count = self.genes.len(), "gene list replaced, cursor reset");
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    pub fn active_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn active_gene(&self) -> Option<&str> {
        self.genes.get(self.cursor.index()).map(String::as_str)
    }

    pub fn next(&mut self) -> usize {
        self.cursor.next()
    }

    pub fn previous(&mut self) -> usize {
        self.cursor.previous()
    }

    pub fn select(&mut self, index: usize) -> Result<usize> {
        self.cursor.select(index)
    }

    /// Comparison for the gene under the cursor.
    pub fn compute_active(
        &self,
        predictions: &dyn PredictionProvider,
        baseline: &dyn BaselineProvider,
    ) -> Result<GeneComparison> {
        let gene = self.active_gene().ok_or(EndotyxError::NoGenesAvailable)?;
        self.compute_for_gene(gene, predictions, baseline)
    }

    /// Box-plot comparison and overlay markers for one gene.
    ///
    /// Fails with `NoGenesAvailable` when the gene list is empty and with
    /// `InsufficientData` when neither group has a value for `gene`. A baseline
    /// failure only drops the baseline box and adds a warning.
    pub fn compute_for_gene(
        &self,
        gene: &str,
        predictions: &dyn PredictionProvider,
        baseline: &dyn BaselineProvider,
    ) -> Result<GeneComparison> {
        if self.genes.is_empty() {
            return Err(EndotyxError::NoGenesAvailable);
        }

        let records = predictions.predictions();

        let mut selected_ids = Vec::new();
        let mut selected_values = Vec::new();
        for record in records.iter().filter(|r| r.is_positive()) {
            match record.value(gene) {
                Some(v) => {
                    selected_ids.push(record.patient_id().to_string());
                    selected_values.push(v);
                }
                None => debug!(gene, patient_id = record.patient_id(), "missing value skipped"),
            }
        }

        let mut warnings = Vec::new();
        let baseline_values = match baseline.baseline_for(gene) {
            Ok(values) => values.unwrap_or_default(),
            Err(e) => {
                let reason = match e {
                    EndotyxError::BaselineUnavailable(reason) => reason,
                    other => other.to_string(),
                };
                warn!(gene, %reason, "baseline unavailable, showing selected group only");
                warnings.push(ComparisonWarning::BaselineUnavailable {
                    gene: gene.to_string(),
                    reason,
                });
                vec![]
            }
        };

        let selected_summary =
            QuantileSummary::from_values_with_fence(&selected_values, self.fence_multiplier);
        let baseline_summary =
            QuantileSummary::from_values_with_fence(&baseline_values, self.fence_multiplier);
        if selected_summary.is_none() {
            debug!(gene, "selected group empty, box omitted");
        }
        if baseline_summary.is_none() {
            debug!(gene, "baseline group empty, box omitted");
        }

        let comparison_records = GroupComparisonBuilder::new(gene, &self.labels)
            .selected(selected_summary, selected_ids)
            .baseline(baseline_summary)
            .build();

        if comparison_records.is_empty() {
            return Err(EndotyxError::InsufficientData {
                gene: gene.to_string(),
            });
        }

        let overlays = extract_overlays(records, gene);

        Ok(GeneComparison {
            gene: gene.to_string(),
            comparison_records,
            overlays,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline_provider::{InMemoryBaseline, MockBaselineProvider, NoBaseline};
    use crate::comparison::GroupType;
    use crate::gene_list_provider::StaticGeneList;
    use crate::prediction_provider::InMemoryPredictions;
    use endotyx_common::Classification::{ClassA, ClassB};
    use endotyx_test_utils::{baseline_of, negative, positive};
    use pretty_assertions::assert_eq;

    fn engine() -> GeneComparisonEngine {
        GeneComparisonEngine::new(vec!["IL13".into(), "IL4".into(), "IL31".into()])
    }

    fn predictions() -> InMemoryPredictions {
        InMemoryPredictions::new(vec![
            positive("P1", ClassA, &[("IL13", 5.2), ("IL4", 1.0)]),
            positive("P2", ClassB, &[("IL13", 7.8)]),
            negative("P3", &[("IL13", 100.0)]),
            positive("P4", ClassA, &[("IL13", 9.1)]),
        ])
    }

    #[test]
    fn test_cursor_bounds() {
        let mut e = engine();
        assert_eq!(e.active_index(), 0);
        assert_eq!(e.previous(), 0);
        assert_eq!(e.next(), 1);
        assert_eq!(e.next(), 2);
        assert_eq!(e.next(), 2);
        assert_eq!(e.active_gene(), Some("IL31"));
        assert_eq!(e.select(0).unwrap(), 0);
        assert!(matches!(
            e.select(3),
            Err(EndotyxError::GeneIndexOutOfRange { index: 3, count: 3 })
        ));
        assert_eq!(e.active_index(), 0);
    }

    #[test]
    fn test_reset_genes_resets_cursor() {
        let mut e = engine();
        e.select(2).unwrap();
        e.reset_genes(&StaticGeneList::new(["TSLP", "IL22"]));
        assert_eq!(e.active_index(), 0);
        assert_eq!(e.active_gene(), Some("TSLP"));
        assert_eq!(e.gene_count(), 2);
    }

    #[test]
    fn test_empty_gene_list_refuses_computation() {
        let e = GeneComparisonEngine::new(vec![]);
        assert!(matches!(
            e.compute_for_gene("IL13", &predictions(), &NoBaseline),
            Err(EndotyxError::NoGenesAvailable)
        ));
        assert!(matches!(
            e.compute_active(&predictions(), &NoBaseline),
            Err(EndotyxError::NoGenesAvailable)
        ));
    }

    #[test]
    fn test_negative_patients_are_excluded() {
        let result = engine()
            .compute_for_gene("IL13", &predictions(), &NoBaseline)
            .unwrap();
        assert_eq!(result.comparison_records.len(), 1);
        let selected = &result.comparison_records[0];
        assert_eq!(selected.patient_ids, vec!["P1", "P2", "P4"]);
        assert_eq!(selected.summary.max, 9.1);
        assert!(result.overlays.iter().all(|m| m.patient_id != "P3"));
    }

    #[test]
    fn test_missing_values_shrink_the_group() {
        let result = engine()
            .compute_for_gene("IL4", &predictions(), &NoBaseline)
            .unwrap();
        assert_eq!(result.comparison_records[0].summary.count, 1);
        assert_eq!(result.overlays.len(), 1);
        assert_eq!(result.overlays[0].patient_id, "P1");
    }

    #[test]
    fn test_insufficient_data() {
        let err = engine()
            .compute_for_gene("IL31", &predictions(), &InMemoryBaseline::default())
            .unwrap_err();
        assert!(matches!(err, EndotyxError::InsufficientData { ref gene } if gene == "IL31"));
    }

    #[test]
    fn test_baseline_only_gene() {
        let baseline = InMemoryBaseline::new(baseline_of(&[("IL31", &[1.0, 2.0])]));
        let result = engine()
            .compute_for_gene("IL31", &predictions(), &baseline)
            .unwrap();
        assert_eq!(result.comparison_records.len(), 1);
        assert_eq!(result.comparison_records[0].group_type, GroupType::Baseline);
        assert!(result.overlays.is_empty());
    }

    #[test]
    fn test_baseline_failure_degrades_with_warning() {
        let baseline = MockBaselineProvider::new()
            .with("IL13", &[3.0, 3.5])
            .failing("reference cohort request timed out");
        let result = engine()
            .compute_for_gene("IL13", &predictions(), &baseline)
            .unwrap();
        assert_eq!(result.comparison_records.len(), 1);
        assert_eq!(result.comparison_records[0].group_type, GroupType::Selected);
        assert_eq!(
            result.warnings,
            vec![ComparisonWarning::BaselineUnavailable {
                gene: "IL13".into(),
                reason: "reference cohort request timed out".into(),
            }]
        );
    }

    #[test]
    fn test_config_labels_and_fences() {
        let mut config = AnalysisConfig::default();
        config.groups.selected_label = "Endotype carriers".into();
        config.statistics.fence_multiplier = 0.0;
        let e = GeneComparisonEngine::from_provider(&StaticGeneList::new(["IL13"]), &config);
        let result = e.compute_active(&predictions(), &NoBaseline).unwrap();
        let record = &result.comparison_records[0];
        assert_eq!(record.group_label, "Endotype carriers");
        // Zero-width fences: everything outside [q1, q3] is an outlier.
        assert_eq!(record.summary.outliers, vec![5.2, 9.1]);
    }

    #[test]
    fn test_computation_is_idempotent() {
        let e = engine();
        let baseline = InMemoryBaseline::new(baseline_of(&[("IL13", &[3.0, 3.2, 3.5])]));
        let first = e.compute_for_gene("IL13", &predictions(), &baseline).unwrap();
        let second = e.compute_for_gene("IL13", &predictions(), &baseline).unwrap();
        assert_eq!(first, second);
    }
}
