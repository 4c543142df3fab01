//! Text and JSON rendering of a [`RiskReport`].

use std::fmt::{self, Write};

use rust_decimal::Decimal;
use serde::Serialize;
use sw_data::{LoadStats, LoadedTable};
use sw_risk::report::display_columns;
use sw_risk::{RiskKind, RiskReport, RiskView};
use sw_types::SwResult;

/// Whole-unit amount with thousands separators, e.g. `1,234,568`.
///
/// Halves round to even, matching the spreadsheet summaries.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp(0);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// JSON document: the report fields plus per-source loading statistics.
#[derive(Serialize)]
struct JsonReport<'r, 'a> {
    #[serde(flatten)]
    report: &'r RiskReport<'a>,
    sources: &'r [LoadStats],
    total_anomalies: usize,
}

pub fn render_json(report: &RiskReport<'_>, table: &LoadedTable) -> SwResult<String> {
    let document = JsonReport {
        report,
        sources: &table.stats,
        total_anomalies: table.total_anomalies(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Plain-text report: heading, source statistics, rule descriptions, then
/// one section per risk kind.
pub fn render_text(report: &RiskReport<'_>, table: &LoadedTable, title: &str) -> SwResult<String> {
    let mut out = String::new();
    write_text(&mut out, report, table, title)?;
    Ok(out)
}

fn write_text(
    out: &mut String,
    report: &RiskReport<'_>,
    table: &LoadedTable,
    title: &str,
) -> fmt::Result {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))?;
    writeln!(
        out,
        "Window: {} (cutoff month {})",
        report.window,
        report.window.cutoff_month()
    )?;
    writeln!(
        out,
        "Records: {}   Categories: {}",
        report.total_records,
        report.categories.join(", ")
    )?;
    for stats in &table.stats {
        writeln!(
            out,
            "Source {}: {} rows, {} malformed cells, {} blank rows",
            stats.source, stats.rows, stats.anomalies, stats.blank_rows
        )?;
    }
    if table.total_anomalies() > 0 {
        writeln!(
            out,
            "Malformed cells treated as empty: {}",
            table.total_anomalies()
        )?;
    }
    for kind in RiskKind::ALL {
        writeln!(out, "- {} -> {}", kind.title(), kind.description())?;
    }

    for view in &report.views {
        writeln!(out)?;
        write_view(out, view, report)?;
    }
    Ok(())
}

fn write_view(out: &mut String, view: &RiskView<'_>, report: &RiskReport<'_>) -> fmt::Result {
    let title = format!("{} Items", view.kind.title());
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.len()))?;

    if view.is_empty() {
        return writeln!(out, "{}", view.kind.empty_notice());
    }

    let header = display_columns(&report.window);
    let rows: Vec<Vec<String>> = view.rows.iter().map(|r| r.display_row()).collect();
    write_table(out, &header, &rows)?;

    writeln!(out)?;
    writeln!(out, "{}", view.kind.insights_title())?;
    writeln!(out, "- Total Items: {}", view.summary.item_count)?;
    writeln!(
        out,
        "- Total Stock Value: {}",
        format_total(view.summary.total_stock_value)
    )?;
    writeln!(
        out,
        "- Total Sales Value: {}",
        format_total(view.summary.total_sales_value)
    )
}

fn format_total(total: Option<Decimal>) -> String {
    total.map(format_amount).unwrap_or_else(|| "overflow".to_string())
}

fn write_table(out: &mut String, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(out, "{}", line.join(" | ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sw_risk::{CategoryFilter, RiskClassifier};
    use sw_types::{InventoryRecord, MonthlySales, SalesWindow};

    #[test]
    fn amounts_are_grouped_and_rounded() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(999.4)), "999");
        assert_eq!(format_amount(dec!(1234567.6)), "1,234,568");
        assert_eq!(format_amount(dec!(1000)), "1,000");
        assert_eq!(format_amount(dec!(2.5)), "2");
        assert_eq!(format_amount(dec!(3.5)), "4");
        assert_eq!(format_amount(dec!(-45210.2)), "-45,210");
        assert_eq!(format_amount(dec!(-0.4)), "0");
    }

    fn loaded(anomalies: usize) -> LoadedTable {
        LoadedTable {
            records: Vec::new(),
            stats: vec![LoadStats {
                source: "purchase_1.csv".to_string(),
                rows: 1,
                anomalies,
                blank_rows: 1,
                ignored_columns: Vec::new(),
            }],
        }
    }

    fn dead_item() -> InventoryRecord {
        InventoryRecord::new("6291001", "Oud Royal", "Perfume")
            .with_stock(dec!(1000), dec!(12.5))
            .with_sales(dec!(0), dec!(20))
            .with_monthly_sales(MonthlySales::from_quantities([dec!(0); 6]))
            .with_last_purchase(NaiveDate::from_ymd_opt(2025, 8, 1), dec!(10), "Al Noor")
    }

    #[test]
    fn text_report_has_table_and_notice() {
        let records = RiskClassifier::default().enrich_all(vec![dead_item()]);
        let report = RiskReport::build(&records, CategoryFilter::All, SalesWindow::default());
        let text = render_text(&report, &loaded(0), "Stock & Purchase Insights").unwrap();

        assert!(text.starts_with("Stock & Purchase Insights\n"));
        assert!(text.contains("Dead Stock Risk Items"));
        assert!(text.contains("6291001"));
        assert!(text.contains("- Total Items: 1"));
        assert!(text.contains("- Total Stock Value: 12,500"));
        assert!(text.contains("- Total Sales Value: 0"));
        assert!(text.contains("No items in Over Purchased Risk."));
        assert!(text.contains("Source purchase_1.csv: 1 rows, 0 malformed cells, 1 blank rows"));
        assert!(!text.contains("Malformed cells treated as empty"));
    }

    #[test]
    fn text_report_surfaces_anomalies() {
        let records = RiskClassifier::default().enrich_all(vec![dead_item()]);
        let report = RiskReport::build(&records, CategoryFilter::All, SalesWindow::default());
        let text = render_text(&report, &loaded(3), "Insights").unwrap();

        assert!(text.contains("Source purchase_1.csv: 1 rows, 3 malformed cells, 1 blank rows"));
        assert!(text.contains("Malformed cells treated as empty: 3"));
    }

    #[test]
    fn json_report_serializes_views() {
        let records = RiskClassifier::default().enrich_all(vec![dead_item()]);
        let report = RiskReport::build(&records, CategoryFilter::All, SalesWindow::default());

        let json: serde_json::Value =
            serde_json::from_str(&render_json(&report, &loaded(2)).unwrap()).unwrap();
        assert_eq!(json["total_records"], 1);
        assert_eq!(json["total_anomalies"], 2);
        assert_eq!(json["sources"][0]["source"], "purchase_1.csv");
        assert_eq!(json["sources"][0]["blank_rows"], 1);
        assert_eq!(json["views"][0]["kind"], "DeadStock");
        assert_eq!(json["views"][0]["summary"]["item_count"], 1);
        assert_eq!(json["views"][1]["rows"].as_array().unwrap().len(), 0);
    }
}
