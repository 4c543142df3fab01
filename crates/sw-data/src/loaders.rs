use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use sw_types::{DataError, InventoryRecord, MonthlySales, SalesWindow, SwResult, PERIODS};

use crate::schema::{Column, ColumnMap};

/// Per-source loading statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub source: String,
    pub rows: usize,
    /// Malformed cells normalized to empty values
    pub anomalies: usize,
    /// Fully blank rows that were dropped
    pub blank_rows: usize,
    pub ignored_columns: Vec<String>,
}

/// Records loaded from one or more sources, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTable {
    pub records: Vec<InventoryRecord>,
    pub stats: Vec<LoadStats>,
}

impl LoadedTable {
    /// Concatenate tables, preserving row order and keeping duplicates.
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = LoadedTable>,
    {
        let mut merged = LoadedTable::default();
        for table in tables {
            merged.records.extend(table.records);
            merged.stats.extend(table.stats);
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_anomalies(&self) -> usize {
        self.stats.iter().map(|s| s.anomalies).sum()
    }
}

/// Loader for inventory exports saved as CSV
#[derive(Debug, Clone)]
pub struct InventoryLoader {
    window: SalesWindow,
    strict_columns: bool,
}

impl InventoryLoader {
    pub fn new(window: SalesWindow) -> Self {
        Self {
            window,
            strict_columns: false,
        }
    }

    pub fn with_strict_columns(mut self, strict: bool) -> Self {
        self.strict_columns = strict;
        self
    }

    /// Load every source and concatenate them in the given order.
    pub fn load_sources<P: AsRef<Path>>(&self, paths: &[P]) -> SwResult<LoadedTable> {
        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            tables.push(self.load_csv_file(path)?);
        }
        let merged = LoadedTable::concat(tables);
        tracing::info!(
            "Merged {} records from {} sources",
            merged.len(),
            merged.stats.len()
        );
        Ok(merged)
    }

    /// Load one export from a CSV file
    pub fn load_csv_file<P: AsRef<Path>>(&self, file_path: P) -> SwResult<LoadedTable> {
        let path = file_path.as_ref();
        tracing::info!("Loading inventory export from: {}", path.display());

        if !path.exists() {
            return Err(DataError::SourceNotFound(path.display().to_string()).into());
        }

        let file = std::fs::File::open(path)?;
        let source_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        self.load_reader(file, &source_name)
    }

    /// Load one export from any CSV reader
    pub fn load_reader<R: Read>(&self, reader: R, source_name: &str) -> SwResult<LoadedTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .byte_headers()
            .map_err(|e| DataError::LoadingFailed {
                message: format!("Failed to read headers of {}: {}", source_name, e),
            })?
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        tracing::debug!("{} headers: {:?}", source_name, headers);

        let columns = ColumnMap::resolve(
            headers.iter().map(String::as_str),
            &self.window,
            self.strict_columns,
            source_name,
        )?;
        if !columns.ignored.is_empty() {
            tracing::warn!(
                "Ignoring columns outside the export contract in {}: {:?}",
                source_name,
                columns.ignored
            );
        }

        let mut stats = LoadStats {
            source: source_name.to_string(),
            ignored_columns: columns.ignored.clone(),
            ..LoadStats::default()
        };
        let mut records = Vec::new();

        for (line_num, result) in rdr.byte_records().enumerate() {
            let line = line_num + 2;
            let row = result.map_err(|e| DataError::LoadingFailed {
                message: format!("Failed to read {} record at line {}: {}", source_name, line, e),
            })?;

            // Legacy-encoded bytes become U+FFFD; each such cell is an anomaly.
            let cells: Vec<Cow<'_, str>> = row.iter().map(String::from_utf8_lossy).collect();
            if cells.iter().all(|cell| cell.trim().is_empty()) {
                stats.blank_rows += 1;
                continue;
            }

            let undecodable = cells.iter().filter(|c| matches!(c, Cow::Owned(_))).count();
            if undecodable > 0 {
                tracing::debug!("Line {}: {} cells are not valid UTF-8", line, undecodable);
            }

            let mut parser = RowParser {
                cells: &cells,
                columns: &columns,
                line,
                anomalies: undecodable,
            };
            records.push(parser.parse_record());
            stats.anomalies += parser.anomalies;
        }

        stats.rows = records.len();
        if stats.anomalies > 0 {
            tracing::warn!(
                "{}: {} malformed cells treated as empty",
                source_name,
                stats.anomalies
            );
        }
        tracing::info!("Loaded {} records from {}", stats.rows, source_name);

        Ok(LoadedTable {
            records,
            stats: vec![stats],
        })
    }
}

/// Reads one CSV row into an [`InventoryRecord`], counting malformed cells.
struct RowParser<'a> {
    cells: &'a [Cow<'a, str>],
    columns: &'a ColumnMap,
    line: usize,
    anomalies: usize,
}

impl RowParser<'_> {
    fn parse_record(&mut self) -> InventoryRecord {
        let mut monthly = [None; PERIODS];
        for (period, slot) in monthly.iter_mut().enumerate() {
            *slot = self.decimal(Column::Month(period));
        }

        InventoryRecord {
            item_code: self.text(Column::ItemCode),
            item_name: self.text(Column::ItemName),
            item_no: self.text(Column::ItemNo),
            category: self.text(Column::Category),
            stock: self.decimal(Column::Stock),
            cost: self.decimal(Column::Cost),
            selling: self.decimal(Column::Selling),
            monthly_sales: MonthlySales::new(monthly),
            total_sales: self.decimal(Column::TotalSales),
            lp_date: self.date(Column::LpDate),
            lp_qty: self.decimal(Column::LpQty),
            lp_supplier: self.text(Column::LpSupplier),
            margin_pct: self.decimal(Column::MarginPct),
            markup_pct: self.decimal(Column::MarkupPct),
        }
    }

    fn cell(&self, column: Column) -> &str {
        self.columns
            .index(column)
            .and_then(|i| self.cells.get(i))
            .map(|cell| &**cell)
            .unwrap_or("")
            .trim()
    }

    fn text(&self, column: Column) -> String {
        self.cell(column).to_string()
    }

    fn decimal(&mut self, column: Column) -> Option<Decimal> {
        let raw = self.cell(column);
        if raw.is_empty() {
            return None;
        }
        let value = parse_decimal(raw);
        if value.is_none() {
            tracing::debug!("Line {}: non-numeric value '{}' for {:?}", self.line, raw, column);
            self.anomalies += 1;
        }
        value
    }

    fn date(&mut self, column: Column) -> Option<NaiveDate> {
        let raw = self.cell(column);
        if raw.is_empty() {
            return None;
        }
        let value = parse_date(raw);
        if value.is_none() {
            tracing::debug!("Line {}: unparseable date '{}' for {:?}", self.line, raw, column);
            self.anomalies += 1;
        }
        value
    }
}

/// Parse a numeric cell. Thousands separators are accepted.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parse a date cell in any of the layouts spreadsheet exports produce.
///
/// Numeric layouts are read month-first; day-first is only a fallback for
/// values whose leading field cannot be a month, so `07/03/2025` is July 3.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S%.f", // 2025-08-14 00:00:00.000
        "%Y-%m-%dT%H:%M:%S%.f", // 2025-08-14T00:00:00
        "%m/%d/%Y %H:%M:%S",    // 08/14/2025 00:00:00
        "%d/%m/%Y %H:%M:%S",    // 14/08/2025 00:00:00
    ];
    for format in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    let date_formats = [
        "%Y-%m-%d", // 2025-08-14
        "%Y/%m/%d", // 2025/08/14
        "%m/%d/%Y", // 08/14/2025
        "%d/%m/%Y", // 14/08/2025
        "%m-%d-%Y", // 08-14-2025
        "%d-%m-%Y", // 14-08-2025
        "%d-%b-%y", // 14-Aug-25
        "%d-%b-%Y", // 14-Aug-2025
        "%d %b %Y", // 14 Aug 2025
    ];
    for format in &date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    None
}
