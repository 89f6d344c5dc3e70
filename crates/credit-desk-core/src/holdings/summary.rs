use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::metrics::{EnrichedRecord, Recommendation};
use crate::display::format_currency;
use crate::types::Money;

/// Totals for a filtered holdings view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSummary {
    /// Rows (account positions) left to evaluate
    pub total_positions: usize,
    /// Distinct asset names among those rows
    pub unique_assets: usize,
    /// Sum of defined `Valor Total Mercado`
    pub total_market_value: Money,
    pub total_market_value_display: String,
    /// The volume sum left decimal range; the totals above are zero
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub volume_overflow: bool,
    pub sell: usize,
    pub consider_sell: usize,
    pub consider_reallocate: usize,
    pub no_suggestion: usize,
}

pub fn summarize(records: &[EnrichedRecord]) -> HoldingsSummary {
    let unique_assets: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.asset.asset.as_deref())
        .collect();
    let volume = records
        .iter()
        .filter_map(|r| r.asset.total_market_value)
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v));
    let total_market_value = volume.unwrap_or(Decimal::ZERO);
    let count = |rec: Recommendation| records.iter().filter(|r| r.recommendation == rec).count();

    HoldingsSummary {
        total_positions: records.len(),
        unique_assets: unique_assets.len(),
        total_market_value,
        total_market_value_display: format_currency(total_market_value),
        volume_overflow: volume.is_none(),
        sell: count(Recommendation::Sell),
        consider_sell: count(Recommendation::ConsiderSell),
        consider_reallocate: count(Recommendation::ConsiderReallocate),
        no_suggestion: count(Recommendation::None),
    }
}

impl Default for HoldingsSummary {
    fn default() -> Self {
        summarize(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::record::{AssetRecord, AssetType};
    use rust_decimal_macros::dec;

    fn position(asset: &str, value: Option<Decimal>, rec: Recommendation) -> EnrichedRecord {
        let mut a = AssetRecord::empty(AssetType::Cri);
        a.asset = Some(asset.to_string());
        a.total_market_value = value;
        EnrichedRecord {
            asset: a,
            business_days_elapsed: None,
            annualized_return: None,
            recommendation: rec,
        }
    }

    #[test]
    fn test_summary_counts_and_volume() {
        let records = vec![
            position("CRI-A", Some(dec!(150000.50)), Recommendation::Sell),
            position("CRI-A", Some(dec!(49999.50)), Recommendation::Sell),
            position("CRI-B", None, Recommendation::ConsiderSell),
            position("CRI-C", Some(dec!(1000000)), Recommendation::None),
        ];
        let s = summarize(&records);
        assert_eq!(s.total_positions, 4);
        assert_eq!(s.unique_assets, 3);
        assert_eq!(s.total_market_value, dec!(1200000));
        assert_eq!(s.total_market_value_display, "R$ 1.200.000,00");
        assert_eq!(s.sell, 2);
        assert_eq!(s.consider_sell, 1);
        assert_eq!(s.consider_reallocate, 0);
        assert_eq!(s.no_suggestion, 1);
    }

    #[test]
    fn test_volume_overflow_is_flagged_not_fatal() {
        let records = vec![
            position("CRI-A", Some(Decimal::MAX), Recommendation::Sell),
            position("CRI-B", Some(Decimal::MAX), Recommendation::None),
        ];
        let s = summarize(&records);
        assert!(s.volume_overflow);
        assert_eq!(s.total_market_value, Decimal::ZERO);
        assert_eq!(s.total_positions, 2);
        assert_eq!(s.sell, 1);
    }

    #[test]
    fn test_empty_summary() {
        let s = HoldingsSummary::default();
        assert_eq!(s.total_positions, 0);
        assert_eq!(s.total_market_value, Decimal::ZERO);
        assert_eq!(s.total_market_value_display, "R$ 0,00");
        assert!(!s.volume_overflow);
    }
}
