//! Trait for reference-cohort (baseline) expression access.
//!
//! Baseline data is resolved by an external collaborator and may be
//! unavailable; the engine degrades to a selected-group-only view when a
//! provider returns an error.

use endotyx_common::{BaselineDataset, EndotyxError, Result};

/// Trait for accessing baseline cohort values.
pub trait BaselineProvider: Send + Sync {
    /// Baseline values for `gene`.
    ///
    /// Returns `Ok(None)` when the cohort has no such gene and `Err` when the
    /// baseline itself could not be obtained.
    fn baseline_for(&self, gene: &str) -> Result<Option<Vec<f64>>>;
}

// ── In-memory Implementation ───────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryBaseline {
    dataset: BaselineDataset,
}

impl InMemoryBaseline {
    pub fn new(dataset: BaselineDataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &BaselineDataset {
        &self.dataset
    }
}

impl BaselineProvider for InMemoryBaseline {
    fn baseline_for(&self, gene: &str) -> Result<Option<Vec<f64>>> {
        Ok(self.dataset.values(gene).map(<[f64]>::to_vec))
    }
}

/// Used when no baseline cohort is configured at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBaseline;

impl BaselineProvider for NoBaseline {
    fn baseline_for(&self, _gene: &str) -> Result<Option<Vec<f64>>> {
        Ok(None)
    }
}

// ── Mock Implementation for Testing ────────────────────────────────────────

/// Mock provider with hardcoded data and an optional injected failure.
#[derive(Debug, Clone, Default)]
pub struct MockBaselineProvider {
    dataset: BaselineDataset,
    failure: Option<String>,
}

impl MockBaselineProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gene: &str, values: &[f64]) -> Self {
        self.dataset.insert(gene, values.to_vec());
        self
    }

    /// Every lookup fails with `BaselineUnavailable(reason)`.
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

impl BaselineProvider for MockBaselineProvider {
    fn baseline_for(&self, gene: &str) -> Result<Option<Vec<f64>>> {
        if let Some(reason) = &self.failure {
            return Err(EndotyxError::BaselineUnavailable(reason.clone()));
        }
        Ok(self.dataset.values(gene).map(<[f64]>::to_vec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use endotyx_test_utils::baseline_of;

    #[test]
    fn test_in_memory_lookup() {
        let provider = InMemoryBaseline::new(baseline_of(&[("IL13", &[3.0, 3.2])]));
        assert_eq!(provider.baseline_for("IL13").unwrap(), Some(vec![3.0, 3.2]));
        assert_eq!(provider.baseline_for("IL4").unwrap(), None);
    }

    #[test]
    fn test_mock_failure() {
        let provider = MockBaselineProvider::new()
            .with("IL13", &[1.0])
            .failing("reference cohort request timed out");
        let err = provider.baseline_for("IL13").unwrap_err();
        assert!(matches!(err, EndotyxError::BaselineUnavailable(_)));
        assert_eq!(NoBaseline.baseline_for("IL13").unwrap(), None);
    }
}
