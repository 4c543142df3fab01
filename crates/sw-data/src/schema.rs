//! Column contract of the inventory exports.
//!
//! [`ColumnMap::resolve`] validates a header row once per source and records
//! where each contract column lives, so rows can be read into a typed
//! [`InventoryRecord`](sw_types::InventoryRecord) by position.

use std::collections::HashMap;

use sw_types::{DataError, SalesWindow, PERIODS};

/// A column of the input contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ItemCode,
    ItemName,
    ItemNo,
    Category,
    Stock,
    Cost,
    TotalSales,
    Selling,
    Month(usize),
    LpDate,
    LpQty,
    LpSupplier,
    MarginPct,
    MarkupPct,
}

impl Column {
    const FIXED: [Column; 13] = [
        Column::ItemCode,
        Column::ItemName,
        Column::ItemNo,
        Column::Category,
        Column::Stock,
        Column::Cost,
        Column::TotalSales,
        Column::Selling,
        Column::LpDate,
        Column::LpQty,
        Column::LpSupplier,
        Column::MarginPct,
        Column::MarkupPct,
    ];

    /// Header text as it appears in the export
    pub fn header(&self, window: &SalesWindow) -> String {
        match self {
            Column::ItemCode => "Item Bar Code".to_string(),
            Column::ItemName => "Item Name".to_string(),
            Column::ItemNo => "Item No".to_string(),
            Column::Category => "Category".to_string(),
            Column::Stock => "Stock".to_string(),
            Column::Cost => "Cost".to_string(),
            Column::TotalSales => "Total Sales".to_string(),
            Column::Selling => "Selling".to_string(),
            Column::Month(period) => window.label(*period),
            Column::LpDate => "LP Date".to_string(),
            Column::LpQty => "LP Qty".to_string(),
            Column::LpSupplier => "LP Supplier".to_string(),
            Column::MarginPct => "Margin%".to_string(),
            Column::MarkupPct => "Markup%".to_string(),
        }
    }

    /// Every contract column, in export order
    pub fn all() -> Vec<Column> {
        let mut columns = Vec::with_capacity(Self::FIXED.len() + PERIODS);
        columns.extend_from_slice(&Self::FIXED[..8]);
        columns.extend((0..PERIODS).map(Column::Month));
        columns.extend_from_slice(&Self::FIXED[8..]);
        columns
    }
}

/// Normalize a header for matching: trim, collapse inner whitespace, lowercase.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Resolved positions of every contract column in one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: HashMap<Column, usize>,
    /// Headers present in the source but outside the contract
    pub ignored: Vec<String>,
}

impl ColumnMap {
    pub fn resolve<'a, I>(
        headers: I,
        window: &SalesWindow,
        strict: bool,
        source_name: &str,
    ) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let expected: HashMap<String, Column> = Column::all()
            .into_iter()
            .map(|c| (normalize_header(&c.header(window)), c))
            .collect();

        let mut positions = HashMap::new();
        let mut ignored = Vec::new();

        for (i, header) in headers.into_iter().enumerate() {
            let key = normalize_header(header);
            match expected.get(&key) {
                Some(column) => {
                    if positions.insert(*column, i).is_some() {
                        return Err(DataError::DuplicateColumn {
                            source_name: source_name.to_string(),
                            column: column.header(window),
                        });
                    }
                }
                None if key.is_empty() => {}
                None => ignored.push(header.trim().to_string()),
            }
        }

        let missing: Vec<String> = Column::all()
            .into_iter()
            .filter(|c| !positions.contains_key(c))
            .map(|c| c.header(window))
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns {
                source_name: source_name.to_string(),
                columns: missing,
            });
        }

        if strict && !ignored.is_empty() {
            return Err(DataError::UnexpectedColumns {
                source_name: source_name.to_string(),
                columns: ignored,
            });
        }

        Ok(Self { positions, ignored })
    }

    /// Position of a contract column. Every column is present once resolved.
    pub fn index(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }
}
