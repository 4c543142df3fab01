//! Read-only report views over the enriched record set.
//!
//! A [`RiskView`] is the category-filtered subset of records flagged for one
//! [`RiskKind`], together with its [`RiskSummary`]. Views borrow the enriched
//! records; nothing here mutates or reorders them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use sw_types::{checked_sum, SalesWindow};

use crate::classifier::{EnrichedRecord, RiskFlags};

/// Category selection applied before building views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum CategoryFilter {
    /// Every category present in the data.
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl CategoryFilter {
    /// `None` selects every category.
    pub fn from_selection(selection: Option<&[String]>) -> Self {
        match selection {
            None => CategoryFilter::All,
            Some(categories) => CategoryFilter::Only(categories.iter().cloned().collect()),
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(set) => set.contains(category),
        }
    }

    /// Records whose category is selected, in their original order.
    pub fn apply<'a>(&self, records: &'a [EnrichedRecord]) -> Vec<&'a EnrichedRecord> {
        records.iter().filter(|r| self.matches(r.category())).collect()
    }
}

/// Distinct categories in first-appearance order.
pub fn distinct_categories(records: &[EnrichedRecord]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .map(EnrichedRecord::category)
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect()
}

/// The two kinds of inventory risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskKind {
    DeadStock,
    OverPurchased,
}

impl RiskKind {
    pub const ALL: [RiskKind; 2] = [RiskKind::DeadStock, RiskKind::OverPurchased];

    pub fn title(&self) -> &'static str {
        match self {
            RiskKind::DeadStock => "Dead Stock Risk",
            RiskKind::OverPurchased => "Over Purchased Risk",
        }
    }

    /// Short heading for the summary lines.
    pub fn insights_title(&self) -> &'static str {
        match self {
            RiskKind::DeadStock => "Dead Stock Insights",
            RiskKind::OverPurchased => "Over Purchased Insights",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskKind::DeadStock => {
                "Zero sales before cutoff, purchased after cutoff, still zero sales"
            }
            RiskKind::OverPurchased => {
                "Purchased quantity > avg sales, sales still low after cutoff"
            }
        }
    }

    /// Shown instead of an empty table.
    pub fn empty_notice(&self) -> String {
        format!("No items in {}.", self.title())
    }

    pub fn export_file_name(&self) -> &'static str {
        match self {
            RiskKind::DeadStock => "dead_stock_risk.csv",
            RiskKind::OverPurchased => "over_purchased_risk.csv",
        }
    }

    pub fn is_flagged(&self, flags: RiskFlags) -> bool {
        match self {
            RiskKind::DeadStock => flags.dead_stock,
            RiskKind::OverPurchased => flags.over_purchased,
        }
    }
}

/// Item count and value totals of a view. Undefined values are skipped;
/// a total is `None` only when it overflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    pub item_count: usize,
    pub total_stock_value: Option<Decimal>,
    pub total_sales_value: Option<Decimal>,
}

impl Default for RiskSummary {
    fn default() -> Self {
        Self {
            item_count: 0,
            total_stock_value: Some(Decimal::ZERO),
            total_sales_value: Some(Decimal::ZERO),
        }
    }
}

impl RiskSummary {
    pub fn from_records(records: &[&EnrichedRecord]) -> Self {
        Self {
            item_count: records.len(),
            total_stock_value: checked_sum(records.iter().filter_map(|r| r.metrics().stock_value)),
            total_sales_value: checked_sum(records.iter().filter_map(|r| r.metrics().sales_value)),
        }
    }
}

/// Filtered-and-flagged records for one risk kind.
#[derive(Debug, Clone, Serialize)]
pub struct RiskView<'a> {
    pub kind: RiskKind,
    pub rows: Vec<&'a EnrichedRecord>,
    pub summary: RiskSummary,
}

impl<'a> RiskView<'a> {
    pub fn build(records: &'a [EnrichedRecord], filter: &CategoryFilter, kind: RiskKind) -> Self {
        let rows: Vec<&EnrichedRecord> = filter
            .apply(records)
            .into_iter()
            .filter(|r| kind.is_flagged(r.flags()))
            .collect();
        let summary = RiskSummary::from_records(&rows);
        Self { kind, rows, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fixed display projection of a flagged row.
pub fn display_columns(window: &SalesWindow) -> Vec<String> {
    let mut columns: Vec<String> = [
        "Item Bar Code",
        "Item Name",
        "Item No",
        "Category",
        "Stock",
        "Stock Value",
        "Total Sales",
        "Sales Value",
        "Avg Sales Before Cutoff",
        "Sales After Cutoff",
        "LP Qty",
        "LP Date",
        "LP Supplier",
        "Margin%",
        "Markup%",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    columns.extend(window.labels());
    columns.push("Dead Stock Risk".to_string());
    columns.push("Over Purchased Risk".to_string());
    columns
}

impl EnrichedRecord {
    /// Cells in [`display_columns`] order.
    pub fn display_row(&self) -> Vec<String> {
        let record = self.record();
        let metrics = self.metrics();
        let flags = self.flags();

        let mut row = vec![
            record.item_code.clone(),
            record.item_name.clone(),
            record.item_no.clone(),
            record.category.clone(),
            format_quantity(record.stock),
            format_quantity(metrics.stock_value),
            format_quantity(record.total_sales),
            format_quantity(metrics.sales_value),
            format_quantity(metrics.avg_sales_before_cutoff.map(|v| v.round_dp(2))),
            format_quantity(metrics.sales_after_cutoff),
            format_quantity(record.lp_qty),
            record
                .lp_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            record.lp_supplier.clone(),
            format_quantity(record.margin_pct),
            format_quantity(record.markup_pct),
        ];
        row.extend(record.monthly_sales.iter().map(format_quantity));
        row.push(flags.dead_stock.to_string());
        row.push(flags.over_purchased.to_string());
        row
    }
}

fn format_quantity(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_default()
}

/// Both risk views over one enriched record set.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport<'a> {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub window: SalesWindow,
    pub total_records: usize,
    /// Distinct categories present, in first-appearance order.
    pub categories: Vec<String>,
    pub filter: CategoryFilter,
    pub views: Vec<RiskView<'a>>,
}

impl<'a> RiskReport<'a> {
    pub fn build(records: &'a [EnrichedRecord], filter: CategoryFilter, window: SalesWindow) -> Self {
        let categories = distinct_categories(records);

        if let CategoryFilter::Only(selected) = &filter {
            for unknown in selected.iter().filter(|c| !categories.contains(c)) {
                tracing::warn!("Selected category '{}' does not occur in the data", unknown);
            }
        }

        let views = RiskKind::ALL
            .iter()
            .map(|kind| RiskView::build(records, &filter, *kind))
            .collect();

        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            window,
            total_records: records.len(),
            categories,
            filter,
            views,
        }
    }

    pub fn view(&self, kind: RiskKind) -> Option<&RiskView<'a>> {
        self.views.iter().find(|v| v.kind == kind)
    }
}
