use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::window::{AFTER_CUTOFF, BEFORE_CUTOFF, PERIODS};

/// Monthly sales quantities aligned to a [`SalesWindow`](crate::SalesWindow).
///
/// A `None` entry is a blank or malformed cell in the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySales(pub [Option<Decimal>; PERIODS]);

impl MonthlySales {
    pub fn new(values: [Option<Decimal>; PERIODS]) -> Self {
        Self(values)
    }

    /// Convenience constructor for fully populated rows.
    pub fn from_quantities(values: [Decimal; PERIODS]) -> Self {
        Self(values.map(Some))
    }

    pub fn get(&self, period: usize) -> Option<Decimal> {
        self.0.get(period).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Decimal>> + '_ {
        self.0.iter().copied()
    }

    /// Sum of the before-cutoff periods, missing values counted as zero.
    /// `None` if the sum overflows.
    pub fn sum_before_cutoff(&self) -> Option<Decimal> {
        checked_sum(self.0[BEFORE_CUTOFF].iter().flatten().copied())
    }

    /// Mean of the before-cutoff periods over the values present.
    pub fn mean_before_cutoff(&self) -> Option<Decimal> {
        let present: Vec<Decimal> = self.0[BEFORE_CUTOFF].iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        let sum = checked_sum(present.iter().copied())?;
        sum.checked_div(Decimal::from(present.len()))
    }

    /// Sum of the after-cutoff periods, missing values counted as zero.
    /// `None` if the sum overflows.
    pub fn sum_after_cutoff(&self) -> Option<Decimal> {
        checked_sum(self.0[AFTER_CUTOFF].iter().flatten().copied())
    }
}

/// Sum that yields `None` on overflow instead of panicking. Empty input sums to zero.
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// One row of an inventory export, one per stock-keeping unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub item_code: String,
    pub item_name: String,
    pub item_no: String,
    pub category: String,
    pub stock: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub selling: Option<Decimal>,
    pub monthly_sales: MonthlySales,
    pub total_sales: Option<Decimal>,
    pub lp_date: Option<NaiveDate>,
    pub lp_qty: Option<Decimal>,
    pub lp_supplier: String,
    pub margin_pct: Option<Decimal>,
    pub markup_pct: Option<Decimal>,
}

impl InventoryRecord {
    /// Minimal record used by builders and tests; every numeric field is empty.
    pub fn new(item_code: &str, item_name: &str, category: &str) -> Self {
        Self {
            item_code: item_code.to_string(),
            item_name: item_name.to_string(),
            item_no: String::new(),
            category: category.to_string(),
            stock: None,
            cost: None,
            selling: None,
            monthly_sales: MonthlySales::default(),
            total_sales: None,
            lp_date: None,
            lp_qty: None,
            lp_supplier: String::new(),
            margin_pct: None,
            markup_pct: None,
        }
    }

    pub fn with_stock(mut self, stock: Decimal, cost: Decimal) -> Self {
        self.stock = Some(stock);
        self.cost = Some(cost);
        self
    }

    pub fn with_sales(mut self, total_sales: Decimal, selling: Decimal) -> Self {
        self.total_sales = Some(total_sales);
        self.selling = Some(selling);
        self
    }

    pub fn with_monthly_sales(mut self, monthly_sales: MonthlySales) -> Self {
        self.monthly_sales = monthly_sales;
        self
    }

    pub fn with_last_purchase(mut self, date: Option<NaiveDate>, qty: Decimal, supplier: &str) -> Self {
        self.lp_date = date;
        self.lp_qty = Some(qty);
        self.lp_supplier = supplier.to_string();
        self
    }

    /// Calendar month of the last purchase, if the date parsed.
    pub fn lp_month(&self) -> Option<u32> {
        self.lp_date.map(|d| d.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mean_ignores_missing_periods() {
        let sales = MonthlySales::new([Some(dec!(3)), None, Some(dec!(6)), None, None, None]);
        assert_eq!(sales.mean_before_cutoff(), Some(dec!(4.5)));
        assert_eq!(sales.sum_before_cutoff(), Some(dec!(9)));
    }

    #[test]
    fn mean_undefined_when_all_missing() {
        let sales = MonthlySales::new([None, None, None, Some(dec!(1)), None, Some(dec!(2))]);
        assert_eq!(sales.mean_before_cutoff(), None);
        assert_eq!(sales.sum_before_cutoff(), Some(Decimal::ZERO));
        assert_eq!(sales.sum_after_cutoff(), Some(dec!(3)));
    }

    #[test]
    fn overflowing_sums_are_undefined() {
        let sales = MonthlySales::new([
            Some(Decimal::MAX),
            Some(Decimal::MAX),
            None,
            Some(Decimal::MAX),
            Some(Decimal::MAX),
            Some(dec!(1)),
        ]);
        assert_eq!(sales.sum_before_cutoff(), None);
        assert_eq!(sales.mean_before_cutoff(), None);
        assert_eq!(sales.sum_after_cutoff(), None);
        assert_eq!(checked_sum(Vec::new()), Some(Decimal::ZERO));
    }

    #[test]
    fn lp_month_follows_date() {
        let record = InventoryRecord::new("1001", "Oud Oil", "Perfume")
            .with_last_purchase(NaiveDate::from_ymd_opt(2025, 8, 14), dec!(12), "Al Noor");
        assert_eq!(record.lp_month(), Some(8));

        let undated = InventoryRecord::new("1002", "Bakhoor", "Incense");
        assert_eq!(undated.lp_month(), None);
    }
}
