//! Trait for the ordered list of genes of interest.

use endotyx_common::ExpressionMatrix;

use crate::gene_stats::top_variance_genes;

/// Ordered genes that drive per-gene iteration.
pub trait GeneListProvider: Send + Sync {
    fn genes(&self) -> Vec<String>;
}

// ── Fixed list ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct StaticGeneList {
    genes: Vec<String>,
}

impl StaticGeneList {
    pub fn new<I, S>(genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            genes: genes.into_iter().map(Into::into).collect(),
        }
    }
}

impl GeneListProvider for StaticGeneList {
    fn genes(&self) -> Vec<String> {
        self.genes.clone()
    }
}

// ── Top-variance genes of an upload ────────────────────────────────────────

/// The `n` most variable genes of an expression matrix, computed once.
#[derive(Debug, Clone)]
pub struct TopVarianceGeneList {
    genes: Vec<String>,
}

impl TopVarianceGeneList {
    pub fn new(matrix: &ExpressionMatrix, n: usize) -> Self {
        let genes = top_variance_genes(matrix, n);
        tracing::debug!(requested = n, selected = genes.len(), "top-variance genes selected");
        Self { genes }
    }
}

impl GeneListProvider for TopVarianceGeneList {
    fn genes(&self) -> Vec<String> {
        self.genes.clone()
    }
}
