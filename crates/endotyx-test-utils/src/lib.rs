//! Fixture builders and numeric assertions shared by the endotyx test suites.

use endotyx_common::{
    BaselineDataset, Classification, ExpressionSample, PredictionLabel, PredictionRecord,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default tolerance for floating-point comparisons in tests.
pub const EPSILON: f64 = 1e-9;

/// Positive-label record with the given gene values.
pub fn positive(patient_id: &str, class: Classification, values: &[(&str, f64)]) -> PredictionRecord {
    record(patient_id, PredictionLabel::Positive, class, values)
}

/// Negative-label record with the given gene values.
pub fn negative(patient_id: &str, values: &[(&str, f64)]) -> PredictionRecord {
    record(patient_id, PredictionLabel::Negative, Classification::None, values)
}

pub fn record(
    patient_id: &str,
    label: PredictionLabel,
    class: Classification,
    values: &[(&str, f64)],
) -> PredictionRecord {
    let sample = values
        .iter()
        .fold(ExpressionSample::new(patient_id), |s, (gene, v)| s.with(gene, *v));
    PredictionRecord::new(sample, label, class, 0.9)
}

/// Baseline dataset from `(gene, values)` pairs.
pub fn baseline_of(genes: &[(&str, &[f64])]) -> BaselineDataset {
    genes
        .iter()
        .map(|(gene, values)| (gene.to_string(), values.to_vec()))
        .collect()
}

/// `n` seeded values drawn uniformly from `[lo, hi)`.
pub fn random_values(seed: u64, n: usize, lo: f64, hi: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(lo..hi)).collect()
}

/// Seeded sample with a few injected extreme values, for fence/whisker sweeps.
pub fn random_values_with_spikes(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..10.0)).collect();
    for v in values.iter_mut() {
        if rng.gen_bool(0.1) {
            *v *= 25.0;
        }
    }
    values
}

#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}
