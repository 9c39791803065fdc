//! Prediction service responses.
//!
//! The service answers with one entry per uploaded patient; the entries carry
//! labels but no expression values, so they are joined back onto the uploaded
//! rows by patient id before the engine sees them.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use endotyx_common::{
    Classification, EndotyxError, ExpressionSample, PredictionLabel, PredictionRecord, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Body of a prediction service response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    pub model_type: Option<String>,
    pub patient_count: Option<usize>,
    #[serde(default)]
    pub predictions: Vec<PredictionEntry>,
    pub processing_time_ms: Option<f64>,
    /// Present when `success` is false
    pub error: Option<String>,
    pub error_type: Option<String>,
}

fn default_true() -> bool { true }

/// One patient's prediction, e.g.
/// `{"patient_id": "P1", "prediction": "yes", "endotype": "endotype_1", "confidence": 0.82}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub patient_id: String,
    pub prediction: PredictionLabel,
    #[serde(default)]
    pub endotype: Classification,
    pub confidence: f64,
}

impl PredictionResponse {
    /// Validated entries; a failed response becomes a `Validation` error.
    pub fn into_entries(self) -> Result<Vec<PredictionEntry>> {
        if !self.success {
            return Err(EndotyxError::Validation(format!(
                "Prediction service reported failure ({}): {}",
                self.error_type.as_deref().unwrap_or("unknown"),
                self.error.as_deref().unwrap_or("no message"),
            )));
        }

        if let Some(bad) = self
            .predictions
            .iter()
            .find(|e| !(0.0..=1.0).contains(&e.confidence))
        {
            return Err(EndotyxError::Validation(format!(
                "Confidence {} for patient {} is outside [0, 1]",
                bad.confidence, bad.patient_id
            )));
        }

        if let Some(count) = self.patient_count {
            if count != self.predictions.len() {
                warn!(
                    reported = count,
                    received = self.predictions.len(),
                    "patient_count does not match number of predictions"
                );
            }
        }

        Ok(self.predictions)
    }
}

pub fn parse_prediction_response(content: &str) -> Result<Vec<PredictionEntry>> {
    let response: PredictionResponse = serde_json::from_str(content)?;
    response.into_entries()
}

pub async fn load_predictions(path: impl AsRef<Path>) -> Result<Vec<PredictionEntry>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read predictions {:?}", path))?;
    let entries = parse_prediction_response(&content)?;
    info!("Loaded {} predictions from {:?}", entries.len(), path);
    Ok(entries)
}

/// Join predictions onto expression samples by patient id, in prediction order.
///
/// When an id occurs on several samples the last one wins.
/// An entry without a matching sample yields a record with no values, so the
/// engine skips it for every gene.
pub fn attach_predictions(
    samples: &[ExpressionSample],
    entries: &[PredictionEntry],
) -> Vec<PredictionRecord> {
    let mut by_id: HashMap<&str, &ExpressionSample> = HashMap::with_capacity(samples.len());
    for sample in samples {
        if by_id.insert(sample.patient_id.as_str(), sample).is_some() {
            warn!(patient_id = %sample.patient_id, "duplicate patient id, keeping the last row");
        }
    }

    entries
        .iter()
        .map(|entry| {
            let sample = match by_id.get(entry.patient_id.as_str()) {
                Some(sample) => (*sample).clone(),
                None => {
                    warn!(patient_id = %entry.patient_id, "prediction has no expression row");
                    ExpressionSample::new(entry.patient_id.clone())
                }
            };
            PredictionRecord::new(sample, entry.prediction, entry.endotype, entry.confidence)
        })
        .collect()
}
