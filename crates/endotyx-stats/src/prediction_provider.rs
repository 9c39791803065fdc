//! Trait for access to the current analysis batch's predictions.

use endotyx_common::PredictionRecord;

/// Ordered prediction records for one analysis batch.
pub trait PredictionProvider: Send + Sync {
    fn predictions(&self) -> &[PredictionRecord];
}

// ── In-memory Implementation ───────────────────────────────────────────────

/// Predictions already resolved by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPredictions {
    records: Vec<PredictionRecord>,
}

impl InMemoryPredictions {
    pub fn new(records: Vec<PredictionRecord>) -> Self {
        Self { records }
    }

    pub fn with(mut self, record: PredictionRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<PredictionRecord>> for InMemoryPredictions {
    fn from(records: Vec<PredictionRecord>) -> Self {
        Self::new(records)
    }
}

impl PredictionProvider for InMemoryPredictions {
    fn predictions(&self) -> &[PredictionRecord] {
        &self.records
    }
}
