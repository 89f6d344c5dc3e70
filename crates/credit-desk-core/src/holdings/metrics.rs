//! Metric engine: elapsed business days, annualized return and the
//! sell / hold / reallocate recommendation for each holding.

use chrono::NaiveDate;
use rust_decimal::MathematicalOps;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::record::AssetRecord;
use crate::calendar::{business_days_between, BusinessDayConvention};
use crate::types::Rate;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Nominal business days per year used to annualize returns.
pub const ANNUALIZATION_BASE: Decimal = dec!(252);

const REALIZED_RETURN_SELL_THRESHOLD: Rate = dec!(0.8);
const SHORT_DURATION_YEARS: Decimal = dec!(2);
const LOW_CARRY_THRESHOLD: Rate = dec!(0.7);
const HIGH_CARRY_THRESHOLD: Rate = dec!(1);

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Recommendation {
    Sell,
    ConsiderSell,
    ConsiderReallocate,
    #[default]
    None,
}

impl Recommendation {
    /// Label written to the `Sugestão` column. `None` renders empty.
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Sell => "Vender",
            Recommendation::ConsiderSell => "Avaliar Venda",
            Recommendation::ConsiderReallocate => "Avaliar Realocação",
            Recommendation::None => "",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the ordered decision list.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    pub name: &'static str,
    pub condition: fn(&AssetRecord) -> bool,
    pub outcome: Recommendation,
}

/// Evaluated top-down; the first rule whose condition holds decides.
/// An undefined field never satisfies a condition.
pub const RECOMMENDATION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        name: "premium_over_curve",
        condition: trades_at_premium,
        outcome: Recommendation::Sell,
    },
    RecommendationRule {
        name: "realized_return_above_80pct",
        condition: realized_most_of_return,
        outcome: Recommendation::Sell,
    },
    RecommendationRule {
        name: "duration_up_to_2y",
        condition: short_duration,
        outcome: Recommendation::ConsiderSell,
    },
    RecommendationRule {
        name: "carry_below_70pct_cdi",
        condition: low_carry,
        outcome: Recommendation::ConsiderSell,
    },
    RecommendationRule {
        name: "carry_above_100pct_cdi",
        condition: high_carry,
        outcome: Recommendation::ConsiderReallocate,
    },
];

fn trades_at_premium(r: &AssetRecord) -> bool {
    matches!(r.premium_discount_pct, Some(v) if v > Decimal::ZERO)
}

fn realized_most_of_return(r: &AssetRecord) -> bool {
    matches!(r.realized_return_pct, Some(v) if v > REALIZED_RETURN_SELL_THRESHOLD)
}

fn short_duration(r: &AssetRecord) -> bool {
    matches!(r.duration, Some(v) if v <= SHORT_DURATION_YEARS)
}

fn low_carry(r: &AssetRecord) -> bool {
    matches!(r.carry_over_cdi, Some(v) if v < LOW_CARRY_THRESHOLD)
}

fn high_carry(r: &AssetRecord) -> bool {
    matches!(r.carry_over_cdi, Some(v) if v > HIGH_CARRY_THRESHOLD)
}

/// The first rule that fires for `record`, if any.
pub fn matching_rule(record: &AssetRecord) -> Option<&'static RecommendationRule> {
    RECOMMENDATION_RULES
        .iter()
        .find(|rule| (rule.condition)(record))
}

pub fn recommend(record: &AssetRecord) -> Recommendation {
    matching_rule(record)
        .map(|rule| rule.outcome)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

/// `(1 + r)^(252 / d) − 1`, defined only for `d > 0` and `1 + r > 0`.
///
/// A power that overflows decimal range is reported as undefined.
pub fn annualized_return(realized_return_pct: Option<Rate>, business_days: Option<u32>) -> Option<Rate> {
    let r = realized_return_pct?;
    let d = business_days.filter(|d| *d > 0)?;
    let base = Decimal::ONE.checked_add(r)?;
    if base <= Decimal::ZERO {
        return None;
    }
    let exponent = ANNUALIZATION_BASE / Decimal::from(d);
    match base.checked_powd(exponent) {
        Some(grown) => Some(grown - Decimal::ONE),
        None => {
            warn!(%r, d, "annualized return out of decimal range");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// A normalized holding plus its derived metrics. The source record is
/// copied, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub asset: AssetRecord,
    pub business_days_elapsed: Option<u32>,
    pub annualized_return: Option<Rate>,
    pub recommendation: Recommendation,
}

pub fn enrich(
    record: &AssetRecord,
    evaluation_date: NaiveDate,
    convention: BusinessDayConvention,
) -> EnrichedRecord {
    let business_days_elapsed = record
        .acquisition_date
        .map(|acquired| business_days_between(acquired, evaluation_date, convention));
    // a holding bought on the evaluation date has no elapsed period to annualize
    let annualized = match record.acquisition_date {
        Some(acquired) if acquired < evaluation_date => {
            annualized_return(record.realized_return_pct, business_days_elapsed)
        }
        _ => None,
    };
    EnrichedRecord {
        asset: record.clone(),
        business_days_elapsed,
        annualized_return: annualized,
        recommendation: recommend(record),
    }
}

pub fn enrich_all(
    records: &[AssetRecord],
    evaluation_date: NaiveDate,
    convention: BusinessDayConvention,
) -> Vec<EnrichedRecord> {
    records
        .iter()
        .map(|r| enrich(r, evaluation_date, convention))
        .collect()
}
