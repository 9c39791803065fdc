//! Descriptive per-gene statistics over an uploaded expression matrix,
//! and the top-variance gene selection that drives per-gene iteration.

use endotyx_common::ExpressionMatrix;
use serde::{Deserialize, Serialize};

use crate::quantile::{finite_mean, quantile_sorted};

/// Summary of one gene column over its present values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneStatistics {
    pub gene: String,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1); None below two values.
    pub std: Option<f64>,
    /// Sample variance (n - 1); None below two values.
    pub variance: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl GeneStatistics {
    /// None when `values` has no finite entry.
    pub fn from_values(gene: &str, values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        let count = sorted.len();
        let mean = finite_mean(&sorted)?;
        let variance = sample_variance(&sorted);
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            gene: gene.to_string(),
            mean,
            median: quantile_sorted(&sorted, 0.5)?,
            std: variance.map(f64::sqrt),
            variance,
            min: sorted[0],
            max: sorted[count - 1],
            count,
        })
    }
}

/// Unbiased (n - 1) variance; None below two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = finite_mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(ss / (n - 1) as f64)
}

/// Statistics for every gene column with at least one value, in column order.
pub fn gene_statistics(matrix: &ExpressionMatrix) -> Vec<GeneStatistics> {
    matrix
        .genes
        .iter()
        .enumerate()
        .filter_map(|(col, gene)| GeneStatistics::from_values(gene, &matrix.column(col)))
        .collect()
}

/// Up to `n` genes by descending sample variance. Ties keep column order;
/// genes with fewer than two values are never selected.
pub fn top_variance_genes(matrix: &ExpressionMatrix, n: usize) -> Vec<String> {
    let mut ranked: Vec<(&String, f64)> = matrix
        .genes
        .iter()
        .enumerate()
        .filter_map(|(col, gene)| sample_variance(&matrix.column(col)).map(|v| (gene, v)))
        .collect();

    // Stable sort keeps column order among equal variances.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked.into_iter().map(|(gene, _)| gene.clone()).collect()
}
