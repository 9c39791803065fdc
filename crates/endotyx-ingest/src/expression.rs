//! Expression CSV upload parsing.
//!
//! The first column holds patient ids unless every cell in it is numeric, in
//! which case ids are generated as `patient_1`, `patient_2`, ... Gene cells
//! that are blank or not numbers become missing and, when imputation is on,
//! are filled with the column mean (0 for a column with no values at all).

use std::path::Path;

use anyhow::Context;
use endotyx_common::{EndotyxError, ExpressionMatrix, IngestConfig, Result};
use tracing::{debug, info, warn};

/// Read and parse an expression CSV from disk.
pub async fn load_expression_csv(path: impl AsRef<Path>, cfg: &IngestConfig) -> Result<ExpressionMatrix> {
    let path = path.as_ref();
    check_file_size(path, cfg).await?;
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read expression CSV {:?}", path))?;
    let matrix = parse_expression_csv(&content, cfg)?;
    info!(
        "Loaded expression matrix from {:?}: {} patients, {} genes",
        path,
        matrix.patient_count(),
        matrix.gene_count()
    );
    Ok(matrix)
}

pub(crate) async fn check_file_size(path: &Path, cfg: &IngestConfig) -> Result<()> {
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to stat {:?}", path))?;
    if meta.len() > cfg.max_file_size_bytes {
        return Err(too_large(cfg));
    }
    Ok(())
}

const MIB: u64 = 1024 * 1024;

fn too_large(cfg: &IngestConfig) -> EndotyxError {
    let limit = cfg.max_file_size_bytes;
    let limit = if limit < MIB {
        format!("{limit} bytes")
    } else if limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else {
        format!("{:.1}MB", limit as f64 / MIB as f64)
    };
    EndotyxError::Validation(format!("File is too large. Maximum size is {limit}"))
}

/// Parse CSV text into an expression matrix.
pub fn parse_expression_csv(content: &str, cfg: &IngestConfig) -> Result<ExpressionMatrix> {
    if content.len() as u64 > cfg.max_file_size_bytes {
        return Err(too_large(cfg));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(EndotyxError::Validation("CSV file is empty".to_string()));
    }

    let mut cells: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        cells.push(record.iter().map(str::to_string).collect());
    }
    if cells.is_empty() {
        return Err(EndotyxError::Validation(
            "CSV must have at least 1 patient row".to_string(),
        ));
    }

    let has_patient_ids = !cells
        .iter()
        .filter_map(|row| row.first())
        .filter(|cell| !cell.is_empty())
        .all(|cell| cell.parse::<f64>().is_ok());

    let (patient_ids, first_gene_col) = if has_patient_ids {
        (cells.iter().map(|row| row[0].clone()).collect::<Vec<_>>(), 1)
    } else {
        debug!("No patient id column detected, generating ids");
        ((1..=cells.len()).map(|i| format!("patient_{i}")).collect(), 0)
    };

    let genes: Vec<String> = headers[first_gene_col..].to_vec();
    if genes.is_empty() {
        return Err(EndotyxError::Validation(
            "CSV must have at least 1 gene column".to_string(),
        ));
    }

    let mut rows: Vec<Vec<Option<f64>>> = cells
        .iter()
        .map(|row| {
            row[first_gene_col..]
                .iter()
                .map(|cell| cell.parse::<f64>().ok().filter(|v| v.is_finite()))
                .collect()
        })
        .collect();

    for (col, gene) in genes.iter().enumerate() {
        let coerced = cells
            .iter()
            .filter(|row| {
                let cell = &row[first_gene_col + col];
                !cell.is_empty() && cell.parse::<f64>().map_or(true, |v| !v.is_finite())
            })
            .count();
        if coerced > 0 {
            warn!(gene = %gene, cells = coerced, "non-numeric expression values treated as missing");
        }
    }

    if cfg.impute_missing {
        impute_column_means(&mut rows, genes.len());
    }

    Ok(ExpressionMatrix {
        patient_ids,
        genes,
        rows,
    })
}

/// Fill missing cells with the column mean; all-missing columns get 0.
fn impute_column_means(rows: &mut [Vec<Option<f64>>], gene_count: usize) {
    for col in 0..gene_count {
        let present: Vec<f64> = rows.iter().filter_map(|row| row[col]).collect();
        let fill = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
        let mut filled = 0usize;
        for row in rows.iter_mut() {
            if row[col].is_none() {
                row[col] = Some(fill);
                filled += 1;
            }
        }
        if filled > 0 {
            debug!(column = col, filled, fill, "imputed missing expression values");
        }
    }
}
