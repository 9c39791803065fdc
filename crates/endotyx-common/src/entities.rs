//! Core entity types shared by the ingest layer, the comparison engine and the CLI.
//! Everything here is read-only once constructed; the engine never mutates its inputs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Expression sample
// ---------------------------------------------------------------------------

/// One patient's expression vector, keyed by gene symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionSample {
    pub patient_id: String,
    #[serde(default)]
    pub values: HashMap<String, f64>,
}

impl ExpressionSample {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, gene: &str, value: f64) -> Self {
        self.values.insert(gene.to_string(), value);
        self
    }

    /// Value for `gene`, or None when absent or not a finite number.
    pub fn value(&self, gene: &str) -> Option<f64> {
        self.values.get(gene).copied().filter(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Expression matrix
// ---------------------------------------------------------------------------

/// Parsed upload: rows = patients, columns = genes. `None` marks a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionMatrix {
    pub patient_ids: Vec<String>,
    pub genes: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl ExpressionMatrix {
    pub fn patient_count(&self) -> usize {
        self.patient_ids.len()
    }

    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    pub fn gene_index(&self, gene: &str) -> Option<usize> {
        self.genes.iter().position(|g| g == gene)
    }

    /// Present values of one gene column, in row order.
    pub fn values_for(&self, gene: &str) -> Vec<f64> {
        match self.gene_index(gene) {
            Some(col) => self.column(col),
            None => vec![],
        }
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(col).copied().flatten())
            .filter(|v| v.is_finite())
            .collect()
    }

    /// One sample per row; missing cells are left out of the sample's map.
    pub fn to_samples(&self) -> Vec<ExpressionSample> {
        self.patient_ids
            .iter()
            .zip(&self.rows)
            .map(|(pid, row)| ExpressionSample {
                patient_id: pid.clone(),
                values: self
                    .genes
                    .iter()
                    .zip(row)
                    .filter_map(|(gene, cell)| cell.map(|v| (gene.clone(), v)))
                    .collect(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Prediction label / classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionLabel {
    #[serde(alias = "yes")]
    Positive,
    #[serde(alias = "no")]
    Negative,
}

/// Endotype assigned to a patient by the prediction service.
/// The service emits `endotype_1` / `endotype_2` / `negative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    #[serde(alias = "negative")]
    None,
    #[serde(alias = "endotype_1")]
    ClassA,
    #[serde(alias = "endotype_2")]
    ClassB,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::None   => "none",
            Classification::ClassA => "class_a",
            Classification::ClassB => "class_b",
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction record
// ---------------------------------------------------------------------------

/// An expression sample annotated by the upstream prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(flatten)]
    pub sample: ExpressionSample,
    pub prediction_label: PredictionLabel,
    #[serde(default)]
    pub classification: Classification,
    /// In [0, 1].
    pub confidence: f64,
}

impl PredictionRecord {
    pub fn new(
        sample: ExpressionSample,
        prediction_label: PredictionLabel,
        classification: Classification,
        confidence: f64,
    ) -> Self {
        Self {
            sample,
            prediction_label,
            classification,
            confidence,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.sample.patient_id
    }

    pub fn is_positive(&self) -> bool {
        self.prediction_label == PredictionLabel::Positive
    }

    pub fn value(&self, gene: &str) -> Option<f64> {
        self.sample.value(gene)
    }
}

// ---------------------------------------------------------------------------
// Baseline cohort
// ---------------------------------------------------------------------------

/// Reference cohort: gene symbol -> ordered expression values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineDataset {
    genes: HashMap<String, Vec<f64>>,
}

impl BaselineDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gene: &str, values: Vec<f64>) -> Self {
        self.insert(gene, values);
        self
    }

    pub fn insert(&mut self, gene: &str, values: Vec<f64>) {
        self.genes.insert(gene.to_string(), values);
    }

    pub fn values(&self, gene: &str) -> Option<&[f64]> {
        self.genes.get(gene).map(Vec::as_slice)
    }

    /// Gene symbols in sorted order.
    pub fn genes(&self) -> Vec<&str> {
        let mut genes: Vec<&str> = self.genes.keys().map(String::as_str).collect();
        genes.sort_unstable();
        genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl FromIterator<(String, Vec<f64>)> for BaselineDataset {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        Self {
            genes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_service_labels_deserialize() {
        let label: PredictionLabel = serde_json::from_str("\"yes\"").unwrap();
        assert_eq!(label, PredictionLabel::Positive);
        let label: PredictionLabel = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(label, PredictionLabel::Negative);

        let class: Classification = serde_json::from_str("\"endotype_2\"").unwrap();
        assert_eq!(class, Classification::ClassB);
        let class: Classification = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(class, Classification::None);
        assert_eq!(serde_json::to_string(&Classification::ClassA).unwrap(), "\"class_a\"");
    }

    #[test]
    fn test_non_finite_value_is_missing() {
        let sample = ExpressionSample::new("P1")
            .with("IL13", f64::NAN)
            .with("IL4", 0.0);
        assert_eq!(sample.value("IL13"), None);
        assert_eq!(sample.value("IL4"), Some(0.0));
        assert_eq!(sample.value("IL31"), None);
    }

    #[test]
    fn test_prediction_record_flattens_sample() {
        let json = r#"{
            "patient_id": "P7",
            "values": {"IL13": 4.5},
            "prediction_label": "positive",
            "classification": "class_a",
            "confidence": 0.82
        }"#;
        let record: PredictionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.patient_id(), "P7");
        assert!(record.is_positive());
        assert_eq!(record.value("IL13"), Some(4.5));
    }

    #[test]
    fn test_matrix_columns_and_samples() {
        let matrix = ExpressionMatrix {
            patient_ids: vec!["P1".into(), "P2".into()],
            genes: vec!["IL13".into(), "IL4".into()],
            rows: vec![vec![Some(1.0), None], vec![Some(3.0), Some(2.0)]],
        };
        assert_eq!(matrix.values_for("IL13"), vec![1.0, 3.0]);
        assert_eq!(matrix.values_for("IL4"), vec![2.0]);
        assert!(matrix.values_for("TSLP").is_empty());

        let samples = matrix.to_samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value("IL4"), None);
        assert_eq!(samples[1].value("IL4"), Some(2.0));
    }

    #[test]
    fn test_baseline_transparent_json() {
        let baseline: BaselineDataset =
            serde_json::from_str(r#"{"IL13": [1.0, 2.0], "IL4": []}"#).unwrap();
        assert_eq!(baseline.genes(), vec!["IL13", "IL4"]);
        assert_eq!(baseline.values("IL13"), Some(&[1.0, 2.0][..]));
        assert_eq!(baseline.values("TSLP"), None);
    }
}
