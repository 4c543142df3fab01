//! Presentation layer for Stockwatch.
//!
//! Loads the configured exports, classifies them and renders both risk views
//! as text or JSON, optionally exporting flagged rows as CSV.

pub mod export;
pub mod render;

pub use export::export_views;
pub use render::{format_amount, render_json, render_text};

use sw_data::InventoryLoader;
use sw_risk::{CategoryFilter, RiskClassifier, RiskReport};
use sw_types::{OutputFormat, ReportConfig, SwResult};

/// Run the whole pipeline for one configuration and return the rendered report.
pub fn generate_report(config: &ReportConfig) -> SwResult<String> {
    config.validate()?;

    let loader = InventoryLoader::new(config.window).with_strict_columns(config.strict_columns);
    let mut table = loader.load_sources(config.sources.as_slice())?;

    let classifier = RiskClassifier::new(config.window);
    let records = classifier.enrich_all(std::mem::take(&mut table.records));

    let filter = CategoryFilter::from_selection(config.categories.as_deref());
    let report = RiskReport::build(&records, filter, config.window);

    if let Some(dir) = &config.export_dir {
        let written = export_views(&report, dir)?;
        tracing::info!("Exported {} risk views to {}", written.len(), dir.display());
    }

    match config.output {
        OutputFormat::Text => render_text(&report, &table, &config.title),
        OutputFormat::Json => render_json(&report, &table),
    }
}
