//! Per-patient overlay markers drawn on top of the group boxes.

use endotyx_common::{Classification, PredictionRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayMarker {
    pub patient_id: String,
    pub gene_value: f64,
    pub classification: Classification,
}

impl OverlayMarker {
    pub fn color(&self) -> MarkerColor {
        MarkerColor::for_classification(self.classification)
    }
}

/// Color slot for a marker: one per endotype plus a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    Primary,
    Secondary,
    Default,
}

impl MarkerColor {
    pub fn for_classification(classification: Classification) -> Self {
        match classification {
            Classification::ClassA => MarkerColor::Primary,
            Classification::ClassB => MarkerColor::Secondary,
            Classification::None   => MarkerColor::Default,
        }
    }
}

/// One marker per positive-label patient with a value for `gene`, in input order.
/// Negative-label patients and patients missing the value are skipped.
pub fn extract_overlays(records: &[PredictionRecord], gene: &str) -> Vec<OverlayMarker> {
    records
        .iter()
        .filter(|r| r.is_positive())
        .filter_map(|r| match r.value(gene) {
            Some(gene_value) => Some(OverlayMarker {
                patient_id: r.patient_id().to_string(),
                gene_value,
                classification: r.classification,
            }),
            None => {
                debug!(gene, patient_id = r.patient_id(), "no value, overlay skipped");
                None
            }
        })
        .collect()
}
