//! CSV export of flagged rows.

use std::fs;
use std::path::{Path, PathBuf};

use sw_risk::report::display_columns;
use sw_risk::{RiskReport, RiskView};
use sw_types::{SalesWindow, SwResult};

/// Write every non-empty view of the report into `dir`, one file per risk kind.
///
/// Returns the paths written.
pub fn export_views(report: &RiskReport<'_>, dir: &Path) -> SwResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for view in report.views.iter().filter(|v| !v.is_empty()) {
        let path = dir.join(view.kind.export_file_name());
        write_view_csv(view, &report.window, &path)?;
        written.push(path);
    }
    Ok(written)
}

pub fn write_view_csv(view: &RiskView<'_>, window: &SalesWindow, path: &Path) -> SwResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(display_columns(window))?;
    for record in &view.rows {
        writer.write_record(record.display_row())?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} rows to {}", view.rows.len(), path.display());
    Ok(())
}
