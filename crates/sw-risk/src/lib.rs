//! Inventory risk classification for Stockwatch.
//!
//! Provides:
//! - Derived per-record metrics (stock value, sales value, cutoff aggregates)
//! - Dead Stock and Over Purchased risk flags
//! - Read-only category-filtered report views with summary statistics

pub mod classifier;
pub mod metrics;
pub mod report;

pub use classifier::{EnrichedRecord, RiskClassifier, RiskFlags};
pub use metrics::DerivedMetrics;
pub use report::{CategoryFilter, RiskKind, RiskReport, RiskSummary, RiskView};
