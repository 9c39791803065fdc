//! endotyx-stats — Per-gene box-plot comparison engine.
//!
//! Turns positive-label patients and a baseline cohort into box-plot summaries,
//! grouped comparison records and per-patient overlay markers, one gene at a time.

pub mod quantile;
pub mod comparison;
pub mod overlay;
pub mod engine;
pub mod gene_stats;
pub mod prediction_provider;
pub mod baseline_provider;
pub mod gene_list_provider;

pub use comparison::{ComparisonRecord, GroupComparisonBuilder, GroupType};
pub use engine::{ComparisonWarning, GeneComparison, GeneComparisonEngine, GeneCursor};
pub use overlay::{extract_overlays, MarkerColor, OverlayMarker};
pub use quantile::QuantileSummary;
