//! Derived per-record metrics.
//!
//! [`DerivedMetrics::compute`] is a pure function of the source record and the
//! sales window; nothing here is stored back on the record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sw_types::{InventoryRecord, SalesWindow};

/// Values derived from one inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// stock × cost
    pub stock_value: Option<Decimal>,
    /// total sales × selling price
    pub sales_value: Option<Decimal>,
    /// Mean of the before-cutoff months over the values present.
    pub avg_sales_before_cutoff: Option<Decimal>,
    /// Sum of the after-cutoff months, missing months as zero.
    pub sales_after_cutoff: Option<Decimal>,
    /// Sum of the before-cutoff months, missing months as zero.
    pub sales_before_cutoff: Option<Decimal>,
    /// Calendar month of the last purchase.
    pub lp_month: Option<u32>,
    /// Calendar month at which the after-cutoff period starts.
    pub cutoff_month: u32,
}

impl DerivedMetrics {
    pub fn compute(record: &InventoryRecord, window: &SalesWindow) -> Self {
        let sales = &record.monthly_sales;
        Self {
            stock_value: product(record.stock, record.cost),
            sales_value: product(record.total_sales, record.selling),
            avg_sales_before_cutoff: sales.mean_before_cutoff(),
            sales_after_cutoff: sales.sum_after_cutoff(),
            sales_before_cutoff: sales.sum_before_cutoff(),
            lp_month: record.lp_month(),
            cutoff_month: window.cutoff_month(),
        }
    }

    /// True when the last purchase falls in or after the cutoff month.
    pub fn purchased_after_cutoff(&self) -> bool {
        self.lp_month.is_some_and(|m| m >= self.cutoff_month)
    }
}

fn product(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    match (a, b) {
        (Some(a), Some(b)) => a.checked_mul(b),
        _ => None,
    }
}
