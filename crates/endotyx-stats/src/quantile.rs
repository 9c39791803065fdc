//! Box-plot order statistics for one numeric sample.
//!
//! Quantiles use linear interpolation between adjacent order statistics
//! (index = (n - 1) * p), the same convention as numpy's default and R type 7.

use serde::{Deserialize, Serialize};

/// IQR multiplier for the Tukey fences.
pub const DEFAULT_FENCE_MULTIPLIER: f64 = 1.5;

/// Box-plot summary of one sample.
///
/// `min <= lower_whisker <= q1 <= median <= q3 <= upper_whisker <= max` and
/// `iqr = q3 - q1 >= 0` always hold. A summary is never built from an empty
/// sample, so no field is ever NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub mean: f64,
    /// Values strictly outside the fences, ascending.
    pub outliers: Vec<f64>,
    pub iqr: f64,
    /// Number of values summarised.
    pub count: usize,
}

impl QuantileSummary {
    /// Summarise `values` with the default 1.5 x IQR fences.
    /// Returns None when there is no finite value to summarise.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Self::from_values_with_fence(values, DEFAULT_FENCE_MULTIPLIER)
    }

    /// Summarise `values` with fences at `q1 - k*iqr` and `q3 + k*iqr`.
    /// Non-finite values are discarded first.
    pub fn from_values_with_fence(values: &[f64], fence_multiplier: f64) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        // Mean over the values in input order, before sorting.
        let mean = finite_mean(&finite)?;

        let mut sorted = finite;
        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;

        let lower_fence = q1 - fence_multiplier * iqr;
        let upper_fence = q3 + fence_multiplier * iqr;

        // Scan the one sorted copy from each end. The found/not-found case is
        // decided by the Option, so a whisker at exactly 0.0 is kept.
        let lower_whisker = match sorted.iter().copied().find(|&v| v >= lower_fence) {
            Some(v) => v,
            None => min,
        };
        let upper_whisker = match sorted.iter().rev().copied().find(|&v| v <= upper_fence) {
            Some(v) => v,
            None => max,
        };

        // With interpolated quartiles the nearest in-fence point can sit inside
        // the box (e.g. [0, 10, 10, 10]); the whisker then collapses onto it.
        let lower_whisker = lower_whisker.min(q1);
        let upper_whisker = upper_whisker.max(q3);

        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lower_fence || v > upper_fence)
            .collect();

        Some(Self {
            min,
            q1,
            median,
            q3,
            max,
            lower_whisker,
            upper_whisker,
            mean,
            outliers,
            iqr,
            count: sorted.len(),
        })
    }

    /// Fence values `(lower, upper)` for a given multiplier.
    pub fn fences(&self, fence_multiplier: f64) -> (f64, f64) {
        (
            self.q1 - fence_multiplier * self.iqr,
            self.q3 + fence_multiplier * self.iqr,
        )
    }
}

/// `p`-quantile of an ascending slice by linear interpolation.
/// None when the slice is empty or `p` is outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }

    let pos = (n - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let weight = pos - lo as f64;

    let (a, b) = (sorted[lo], sorted[hi]);
    let span = b - a;
    // `b - a` overflows when the neighbours have huge opposite signs.
    let value = if span.is_finite() {
        a + span * weight
    } else {
        a * (1.0 - weight) + b * weight
    };
    Some(value.clamp(a, b))
}

/// Arithmetic mean that stays finite for any finite input.
/// None for an empty slice.
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return Some(sum / values.len() as f64);
    }

    // The plain sum overflowed; fall back to an incremental mean.
    let mut mean = 0.0;
    for (i, v) in values.iter().enumerate() {
        let k = (i + 1) as f64;
        mean += v / k - mean / k;
    }
    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use endotyx_test_utils::{assert_close, random_values, random_values_with_spikes};
    use pretty_assertions::assert_eq;

    fn assert_ordered(s: &QuantileSummary) {
        assert!(s.min <= s.lower_whisker, "min {} > lower whisker {}", s.min, s.lower_whisker);
        assert!(s.lower_whisker <= s.q1, "lower whisker {} > q1 {}", s.lower_whisker, s.q1);
        assert!(s.q1 <= s.median);
        assert!(s.median <= s.q3);
        assert!(s.q3 <= s.upper_whisker, "q3 {} > upper whisker {}", s.q3, s.upper_whisker);
        assert!(s.upper_whisker <= s.max);
        assert!(s.iqr >= 0.0);
    }

    #[test]
    fn test_empty_sample_is_no_data() {
        assert_eq!(QuantileSummary::from_values(&[]), None);
        assert_eq!(QuantileSummary::from_values(&[f64::NAN, f64::INFINITY]), None);
    }

    #[test]
    fn test_single_value() {
        let s = QuantileSummary::from_values(&[4.2]).unwrap();
        assert_eq!(s.q1, 4.2);
        assert_eq!(s.median, 4.2);
        assert_eq!(s.q3, 4.2);
        assert_eq!(s.iqr, 0.0);
        assert_eq!(s.lower_whisker, 4.2);
        assert_eq!(s.upper_whisker, 4.2);
        assert_eq!(s.min, 4.2);
        assert_eq!(s.max, 4.2);
        assert!(s.outliers.is_empty());
        assert_eq!(s.count, 1);
    }

    #[test]
    fn test_repeated_values() {
        let s = QuantileSummary::from_values(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(s.q1, 5.0);
        assert_eq!(s.median, 5.0);
        assert_eq!(s.q3, 5.0);
        assert_eq!(s.iqr, 0.0);
        assert!(s.outliers.is_empty());
    }

    #[test]
    fn test_linear_interpolation_convention() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let s = QuantileSummary::from_values(&values).unwrap();
        assert_eq!(s.median, 5.5);
        assert_eq!(s.q1, 3.25);
        assert_eq!(s.q3, 7.75);
        assert_eq!(s.iqr, 4.5);
        assert_close(s.mean, 5.5);
        assert_eq!(s.lower_whisker, 1.0);
        assert_eq!(s.upper_whisker, 10.0);
    }

    #[test]
    fn test_high_outlier_excluded_from_whisker() {
        let s = QuantileSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(s.q1, 2.25);
        assert_eq!(s.q3, 4.75);
        assert_eq!(s.outliers, vec![100.0]);
        assert_eq!(s.upper_whisker, 5.0);
        assert_eq!(s.lower_whisker, 1.0);
        assert_eq!(s.max, 100.0);
        let (_, upper_fence) = s.fences(DEFAULT_FENCE_MULTIPLIER);
        assert!(100.0 > upper_fence);
    }

    #[test]
    fn test_zero_whisker_is_kept() {
        // A truthiness-style fallback would replace the 0.0 whisker with sorted[0].
        let s = QuantileSummary::from_values(&[-50.0, 0.0, 1.0, 1.0, 2.0, 2.0]).unwrap();
        assert_eq!(s.outliers, vec![-50.0]);
        assert_eq!(s.lower_whisker, 0.0);
        assert_eq!(s.min, -50.0);
    }

    #[test]
    fn test_whisker_collapses_onto_box_edge() {
        let s = QuantileSummary::from_values(&[0.0, 10.0, 10.0, 10.0]).unwrap();
        assert_eq!(s.q1, 7.5);
        assert_eq!(s.q3, 10.0);
        assert_eq!(s.outliers, vec![0.0]);
        assert_eq!(s.lower_whisker, 7.5);
        assert_ordered(&s);
    }

    #[test]
    fn test_extreme_finite_values_stay_finite() {
        let s = QuantileSummary::from_values(&[-f64::MAX, f64::MAX]).unwrap();
        assert_ordered(&s);
        assert!(!s.iqr.is_nan(), "iqr is NaN");
        assert!(s.q1.is_finite() && s.q3.is_finite());
        assert_eq!(s.median, 0.0);
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.upper_whisker, f64::MAX);
        assert_eq!(s.lower_whisker, -f64::MAX);

        let s = QuantileSummary::from_values(&[f64::MAX; 3]).unwrap();
        assert_ordered(&s);
        assert_eq!(s.mean, f64::MAX);
        assert_eq!(s.median, f64::MAX);
        assert_eq!(s.iqr, 0.0);
    }

    #[test]
    fn test_finite_mean() {
        assert_eq!(finite_mean(&[]), None);
        assert_close(finite_mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
        assert_eq!(finite_mean(&[f64::MAX, f64::MAX]), Some(f64::MAX));
        assert_eq!(finite_mean(&[-f64::MAX, -f64::MAX, 4.0]).map(f64::is_finite), Some(true));
    }

    #[test]
    fn test_mean_uses_unsorted_values() {
        let s = QuantileSummary::from_values(&[3.0, 1.0, 2.0]).unwrap();
        assert_close(s.mean, 2.0);
        assert_eq!(s.median, 2.0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let values = vec![9.0, 1.0, 5.0];
        let _ = QuantileSummary::from_values(&values);
        assert_eq!(values, vec![9.0, 1.0, 5.0]);
    }

    #[test]
    fn test_custom_fence_multiplier() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 8.0];
        let tukey = QuantileSummary::from_values(&values).unwrap();
        assert!(tukey.outliers.is_empty());
        let tight = QuantileSummary::from_values_with_fence(&values, 0.5).unwrap();
        assert_eq!(tight.outliers, vec![8.0]);
        assert_eq!(tight.upper_whisker, 5.0);
    }

    #[test]
    fn test_quantile_sorted_bounds() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[1.0, 2.0], 1.5), None);
        assert_eq!(quantile_sorted(&[1.0, 2.0], 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&[1.0, 2.0], 1.0), Some(2.0));
    }

    #[test]
    fn test_ordering_invariant_on_random_samples() {
        for seed in 0..200 {
            let n = 1 + (seed as usize % 40);
            let values = if seed % 2 == 0 {
                random_values(seed, n, -5.0, 5.0)
            } else {
                random_values_with_spikes(seed, n)
            };
            let s = QuantileSummary::from_values(&values).unwrap();
            assert_ordered(&s);
            assert_eq!(s.count, n);
            let (lo, hi) = s.fences(DEFAULT_FENCE_MULTIPLIER);
            assert!(s.outliers.iter().all(|&v| v < lo || v > hi));
            let inside = values.iter().filter(|&&v| v >= lo && v <= hi).count();
            assert_eq!(inside + s.outliers.len(), n);
        }
    }
}
