//! Risk classification.
//!
//! [`RiskClassifier`] is a stateless batch transform: it borrows or consumes
//! the merged record set and returns [`EnrichedRecord`]s in the same order,
//! each carrying its [`DerivedMetrics`] and two independent [`RiskFlags`].
//!
//! Zero checks use exact equality and the purchase/sales comparisons use
//! strict inequality. Quantities are decimals, so the sums feeding those
//! checks carry no rounding error.

use serde::{Deserialize, Serialize};
use tracing::info;

use sw_types::{InventoryRecord, SalesWindow};

use crate::metrics::DerivedMetrics;

/// The two risk flags of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlags {
    /// No sales before cutoff, restocked at or after cutoff, still no sales.
    pub dead_stock: bool,
    /// Restock larger than the pre-cutoff baseline while post-cutoff sales
    /// stayed below that baseline.
    pub over_purchased: bool,
}

/// A source record with its derived metrics and risk flags.
///
/// Fields are private so derived values cannot drift from their sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    record: InventoryRecord,
    #[serde(flatten)]
    metrics: DerivedMetrics,
    #[serde(flatten)]
    flags: RiskFlags,
}

impl EnrichedRecord {
    pub fn record(&self) -> &InventoryRecord {
        &self.record
    }

    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn flags(&self) -> RiskFlags {
        self.flags
    }

    pub fn category(&self) -> &str {
        &self.record.category
    }
}

/// Stateless classifier for the Dead Stock and Over Purchased rules.
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    window: SalesWindow,
}

impl RiskClassifier {
    pub fn new(window: SalesWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &SalesWindow {
        &self.window
    }

    /// Compute both flags for one record.
    pub fn classify(&self, record: &InventoryRecord) -> RiskFlags {
        let metrics = DerivedMetrics::compute(record, &self.window);
        Self::flags_for(record, &metrics)
    }

    /// Attach derived metrics and flags to one record.
    pub fn enrich(&self, record: InventoryRecord) -> EnrichedRecord {
        let metrics = DerivedMetrics::compute(&record, &self.window);
        let flags = Self::flags_for(&record, &metrics);
        EnrichedRecord {
            record,
            metrics,
            flags,
        }
    }

    /// Enrich the whole record set, preserving order.
    pub fn enrich_all(&self, records: Vec<InventoryRecord>) -> Vec<EnrichedRecord> {
        let enriched: Vec<EnrichedRecord> = records.into_iter().map(|r| self.enrich(r)).collect();

        let dead = enriched.iter().filter(|r| r.flags.dead_stock).count();
        let over = enriched.iter().filter(|r| r.flags.over_purchased).count();
        info!(
            "Classified {} records: {} dead stock, {} over purchased",
            enriched.len(),
            dead,
            over
        );

        enriched
    }

    fn flags_for(record: &InventoryRecord, metrics: &DerivedMetrics) -> RiskFlags {
        RiskFlags {
            dead_stock: Self::is_dead_stock(metrics),
            over_purchased: Self::is_over_purchased(record, metrics),
        }
    }

    fn is_dead_stock(metrics: &DerivedMetrics) -> bool {
        metrics.sales_before_cutoff.is_some_and(|s| s.is_zero())
            && metrics.purchased_after_cutoff()
            && metrics.sales_after_cutoff.is_some_and(|s| s.is_zero())
    }

    /// An undefined baseline, purchase quantity or post-cutoff sum fails the comparison.
    fn is_over_purchased(record: &InventoryRecord, metrics: &DerivedMetrics) -> bool {
        let (Some(baseline), Some(lp_qty), Some(after)) = (
            metrics.avg_sales_before_cutoff,
            record.lp_qty,
            metrics.sales_after_cutoff,
        ) else {
            return false;
        };

        metrics.purchased_after_cutoff() && lp_qty > baseline && after < baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sw_types::MonthlySales;

    fn date(month: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, month, 10)
    }

    fn item(sales: [Decimal; 6], lp_month: u32, lp_qty: Decimal) -> InventoryRecord {
        InventoryRecord::new("6291001", "Oud Royal", "Perfume")
            .with_stock(dec!(20), dec!(15))
            .with_sales(sales.iter().copied().sum(), dec!(30))
            .with_monthly_sales(MonthlySales::from_quantities(sales))
            .with_last_purchase(date(lp_month), lp_qty, "Al Noor")
    }

    #[test]
    fn all_zero_sales_restocked_in_august_is_dead_stock_only() {
        let classifier = RiskClassifier::default();
        let record = item([Decimal::ZERO; 6], 8, dec!(24));

        let flags = classifier.classify(&record);
        assert!(flags.dead_stock);
        // Baseline is 0 and post-cutoff sales of 0 are not below it.
        assert!(!flags.over_purchased);
    }

    #[test]
    fn purchase_before_cutoff_is_never_flagged() {
        let classifier = RiskClassifier::default();

        let quiet = item([Decimal::ZERO; 6], 5, dec!(24));
        assert_eq!(classifier.classify(&quiet), RiskFlags::default());

        let slow = item([dec!(5), dec!(5), dec!(5), dec!(0), dec!(1), dec!(0)], 5, dec!(50));
        assert_eq!(classifier.classify(&slow), RiskFlags::default());
    }

    #[test]
    fn over_purchase_against_baseline() {
        let classifier = RiskClassifier::default();
        let record = item([dec!(4), dec!(6), dec!(5), dec!(1), dec!(1), dec!(1)], 7, dec!(30));

        let flags = classifier.classify(&record);
        assert!(flags.over_purchased);
        assert!(!flags.dead_stock);
    }

    #[test]
    fn over_purchase_comparisons_are_strict() {
        let classifier = RiskClassifier::default();

        // LP Qty equal to the baseline of 5.
        let equal_qty = item([dec!(5), dec!(5), dec!(5), dec!(0), dec!(0), dec!(1)], 9, dec!(5));
        assert!(!classifier.classify(&equal_qty).over_purchased);

        // Post-cutoff sales equal to the baseline of 5.
        let equal_sales = item([dec!(5), dec!(5), dec!(5), dec!(2), dec!(2), dec!(1)], 9, dec!(40));
        assert!(!classifier.classify(&equal_sales).over_purchased);
    }

    #[test]
    fn missing_pre_cutoff_history_blocks_over_purchase() {
        let classifier = RiskClassifier::default();
        let mut record = item([Decimal::ZERO; 6], 8, dec!(10));
        record.monthly_sales = MonthlySales::new([None, None, None, Some(dec!(0)), None, None]);

        let flags = classifier.classify(&record);
        assert!(!flags.over_purchased);
        // Missing months count as zero for the dead stock sums.
        assert!(flags.dead_stock);
    }

    #[test]
    fn partial_history_uses_present_months() {
        let classifier = RiskClassifier::default();
        let mut record = item([Decimal::ZERO; 6], 8, dec!(10));
        record.monthly_sales = MonthlySales::new([Some(dec!(6)), None, None, Some(dec!(1)), None, None]);

        // Baseline is 6 (not 2): LP 10 > 6 and after-cutoff 1 < 6.
        assert!(classifier.classify(&record).over_purchased);
    }

    #[test]
    fn unparseable_date_is_never_flagged() {
        let classifier = RiskClassifier::default();
        let mut record = item([Decimal::ZERO; 6], 8, dec!(10));
        record.lp_date = None;

        assert_eq!(classifier.classify(&record), RiskFlags::default());
    }

    #[test]
    fn fractional_quantities_compare_exactly() {
        let classifier = RiskClassifier::default();
        let record = item(
            [dec!(0.1), dec!(0.2), dec!(-0.3), dec!(0.1), dec!(0.2), dec!(-0.3)],
            8,
            dec!(1),
        );

        let metrics = DerivedMetrics::compute(&record, classifier.window());
        assert_eq!(metrics.sales_before_cutoff, Some(Decimal::ZERO));
        assert_eq!(metrics.sales_after_cutoff, Some(Decimal::ZERO));
        assert!(classifier.classify(&record).dead_stock);
    }

    #[test]
    fn overflowing_sales_are_not_flagged() {
        let classifier = RiskClassifier::default();
        let mut record = item([Decimal::ZERO; 6], 8, dec!(10));
        record.monthly_sales = MonthlySales::new([
            Some(Decimal::MAX),
            Some(Decimal::MAX),
            Some(dec!(0)),
            Some(Decimal::MAX),
            Some(Decimal::MAX),
            Some(dec!(0)),
        ]);
        record.stock = Some(Decimal::MAX);

        let enriched = classifier.enrich_all(vec![record.clone(), record]);
        assert_eq!(enriched[0].metrics().sales_before_cutoff, None);
        assert_eq!(enriched[0].metrics().avg_sales_before_cutoff, None);
        assert_eq!(enriched[0].flags(), RiskFlags::default());
    }

    #[test]
    fn enrichment_is_idempotent_and_ordered() {
        let classifier = RiskClassifier::default();
        let records = vec![
            item([Decimal::ZERO; 6], 8, dec!(24)),
            item([dec!(4), dec!(6), dec!(5), dec!(1), dec!(1), dec!(1)], 7, dec!(30)),
            item([dec!(1); 6], 3, dec!(2)),
        ];

        let first = classifier.enrich_all(records.clone());
        let second = classifier.enrich_all(records.clone());
        assert_eq!(first, second);

        let flags: Vec<RiskFlags> = first.iter().map(|r| r.flags()).collect();
        assert_eq!(
            flags,
            vec![
                RiskFlags { dead_stock: true, over_purchased: false },
                RiskFlags { dead_stock: false, over_purchased: true },
                RiskFlags::default(),
            ]
        );

        let back: Vec<&InventoryRecord> = first.iter().map(EnrichedRecord::record).collect();
        assert_eq!(back, records.iter().collect::<Vec<_>>());
    }

    #[test]
    fn enriched_record_serializes_flat() {
        let classifier = RiskClassifier::default();
        let enriched = classifier.enrich(item([Decimal::ZERO; 6], 8, dec!(24)));

        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(json["category"], "Perfume");
        assert_eq!(json["dead_stock"], true);
        assert_eq!(json["lp_month"], 8);
    }
}
