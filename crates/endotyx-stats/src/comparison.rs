//! Grouped comparison records for one gene.
//!
//! A record carries the box geometry as the bottom edge plus distances
//! (box height, whisker lengths), so offset or error-bar renderers can anchor
//! the whiskers to the box instead of to absolute coordinates.

use endotyx_common::GroupLabels;
use serde::{Deserialize, Serialize};

use crate::quantile::QuantileSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Selected,
    Baseline,
}

/// One box in the per-gene comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub gene: String,
    pub group_label: String,
    pub group_type: GroupType,
    pub summary: QuantileSummary,
    /// Patients whose values built this box (empty for the baseline cohort).
    pub patient_ids: Vec<String>,
    /// q1
    pub box_bottom: f64,
    /// q3 - q1
    pub box_height: f64,
    /// q1 - lower_whisker, >= 0
    pub whisker_lower: f64,
    /// upper_whisker - q3, >= 0
    pub whisker_upper: f64,
}

impl ComparisonRecord {
    pub fn new(
        gene: &str,
        group_label: &str,
        group_type: GroupType,
        summary: QuantileSummary,
        patient_ids: Vec<String>,
    ) -> Self {
        Self {
            gene: gene.to_string(),
            group_label: group_label.to_string(),
            group_type,
            box_bottom: summary.q1,
            box_height: summary.q3 - summary.q1,
            whisker_lower: summary.q1 - summary.lower_whisker,
            whisker_upper: summary.upper_whisker - summary.q3,
            summary,
            patient_ids,
        }
    }

    pub fn box_top(&self) -> f64 {
        self.box_bottom + self.box_height
    }
}

/// Merges the selected-group and baseline summaries of one gene.
///
/// Groups without data are omitted, never rendered as empty boxes; the
/// selected group always precedes the baseline.
#[derive(Debug)]
pub struct GroupComparisonBuilder<'a> {
    gene: &'a str,
    labels: &'a GroupLabels,
    selected: Option<(QuantileSummary, Vec<String>)>,
    baseline: Option<QuantileSummary>,
}

impl<'a> GroupComparisonBuilder<'a> {
    pub fn new(gene: &'a str, labels: &'a GroupLabels) -> Self {
        Self {
            gene,
            labels,
            selected: None,
            baseline: None,
        }
    }

    pub fn selected(mut self, summary: Option<QuantileSummary>, patient_ids: Vec<String>) -> Self {
        self.selected = summary.map(|s| (s, patient_ids));
        self
    }

    pub fn baseline(mut self, summary: Option<QuantileSummary>) -> Self {
        self.baseline = summary;
        self
    }

    pub fn build(self) -> Vec<ComparisonRecord> {
        let mut records = Vec::with_capacity(2);

        if let Some((summary, ids)) = self.selected {
            records.push(ComparisonRecord::new(
                self.gene,
                &self.labels.selected_label,
                GroupType::Selected,
                summary,
                ids,
            ));
        }

        if let Some(summary) = self.baseline {
            records.push(ComparisonRecord::new(
                self.gene,
                &self.labels.baseline_label,
                GroupType::Baseline,
                summary,
                vec![],
            ));
        }

        records
    }
}
