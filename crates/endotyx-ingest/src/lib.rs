//! endotyx-ingest — Parsing of the payloads the comparison engine consumes.
//!
//! - uploaded expression CSVs (rows = patients, columns = genes)
//! - prediction service responses, joined back onto the expression rows
//! - baseline cohort files (JSON or CSV)
//!
//! # Example
//!
//! ```rust,no_run
//! use endotyx_common::IngestConfig;
//! use endotyx_ingest::{attach_predictions, load_expression_csv, load_predictions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = IngestConfig::default();
//!     let matrix = load_expression_csv("upload.csv", &cfg).await?;
//!     let entries = load_predictions("predictions.json").await?;
//!     let records = attach_predictions(&matrix.to_samples(), &entries);
//!     println!("{} prediction records", records.len());
//!     Ok(())
//! }
//! ```

pub mod expression;
pub mod predictions;
pub mod baseline;

pub use baseline::{load_baseline, parse_baseline_csv, parse_baseline_json, FileBaselineProvider};
pub use expression::{load_expression_csv, parse_expression_csv};
pub use predictions::{
    attach_predictions, load_predictions, parse_prediction_response, PredictionEntry,
    PredictionResponse,
};
