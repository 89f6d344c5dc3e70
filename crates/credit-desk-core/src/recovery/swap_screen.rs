//! Swap screen: the recovery horizon of every discounted holding if it were
//! swapped into a single candidate asset.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::RecoveryTime;
use crate::error::CreditDeskError;
use crate::holdings::record::{AssetRecord, IndexType};
use crate::types::{with_metadata, ComputationOutput, Money, PercentRate, Rate, Years};
use crate::CreditDeskResult;

/// Notional the yearly rate pick-up is measured on.
const NOTIONAL: Money = dec!(1000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapCandidate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::holdings::filter::deserialize_index_filter"
    )]
    pub index_type: Option<IndexType>,
    /// Gross annual rate of the candidate, in percent
    pub gross_rate_pct: PercentRate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<Years>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapScreenInput {
    pub holdings: Vec<AssetRecord>,
    pub candidate: SwapCandidate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapScreenRow {
    pub asset: Option<String>,
    pub index: Option<String>,
    pub current_rate: Option<Rate>,
    pub curve_price: Money,
    pub market_price: Money,
    pub discount: Money,
    /// Candidate rate minus purchase rate, in percentage points
    pub rate_delta_pct: Option<PercentRate>,
    pub recovery_years: Option<RecoveryTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapScreenOutput {
    pub rows: Vec<SwapScreenRow>,
    pub holdings_screened: usize,
    pub holdings_at_discount: usize,
}

/// Screen holdings trading below curve against `candidate`.
pub fn screen_swaps(input: &SwapScreenInput) -> CreditDeskResult<ComputationOutput<SwapScreenOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.candidate.gross_rate_pct < Decimal::ZERO {
        return Err(CreditDeskError::InvalidInput {
            field: "gross_rate_pct".into(),
            reason: "Candidate rate cannot be negative".into(),
        });
    }

    let rows: Vec<SwapScreenRow> = input
        .holdings
        .iter()
        .filter_map(|h| screen_holding(h, input.candidate.gross_rate_pct))
        .collect();

    let unrecoverable = rows.iter().filter(|r| r.recovery_years.is_none()).count();
    if unrecoverable > 0 {
        warnings.push(format!(
            "{unrecoverable} discounted holding(s) already yield at least the candidate rate"
        ));
    }

    let output = SwapScreenOutput {
        holdings_screened: input.holdings.len(),
        holdings_at_discount: rows.len(),
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Swap screen: discount / ((candidate rate - purchase rate) x 1000)",
        &input.candidate,
        warnings,
        elapsed,
        output,
    ))
}

fn screen_holding(holding: &AssetRecord, candidate_rate_pct: PercentRate) -> Option<SwapScreenRow> {
    let discount = holding.unit_discount()?;
    if discount <= Decimal::ZERO {
        return None;
    }

    let rate_delta_pct = holding
        .purchase_rate
        .and_then(|r| r.checked_mul(dec!(100)))
        .and_then(|r| candidate_rate_pct.checked_sub(r));
    // discount / (delta / 100 × notional), divided in an order that cannot
    // overflow before the final quotient
    let per_point = discount / NOTIONAL * dec!(100);
    let recovery_years = rate_delta_pct.and_then(|delta| {
        if delta > Decimal::ZERO {
            Some(
                per_point
                    .checked_div(delta)
                    .map_or(RecoveryTime::Infinite, |y| RecoveryTime::Years(y.round_dp(2))),
            )
        } else if delta.is_zero() {
            Some(RecoveryTime::Infinite)
        } else {
            None
        }
    });

    Some(SwapScreenRow {
        asset: holding.asset.clone(),
        index: holding.index.clone(),
        current_rate: holding.purchase_rate,
        curve_price: holding.curve_unit_price?,
        market_price: holding.market_unit_price?,
        discount,
        rate_delta_pct,
        recovery_years,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::record::AssetType;

    fn holding(asset: &str, rate: Option<Decimal>, curve: Decimal, market: Decimal) -> AssetRecord {
        let mut h = AssetRecord::empty(AssetType::Debenture);
        h.asset = Some(asset.into());
        h.purchase_rate = rate;
        h.curve_unit_price = Some(curve);
        h.market_unit_price = Some(market);
        h
    }

    fn candidate(rate: Decimal) -> SwapCandidate {
        SwapCandidate {
            index_type: Some(IndexType::IpcaPlus),
            gross_rate_pct: rate,
            duration_years: Some(dec!(4)),
        }
    }

    #[test]
    fn test_only_discounted_holdings_are_screened() {
        let input = SwapScreenInput {
            holdings: vec![
                holding("A", Some(dec!(0.095)), dec!(1000), dec!(980)),
                holding("B", Some(dec!(0.08)), dec!(1000), dec!(1010)),
                holding("C", Some(dec!(0.08)), dec!(1000), dec!(1000)),
            ],
            candidate: candidate(dec!(11)),
        };
        let out = screen_swaps(&input).unwrap();
        assert_eq!(out.result.holdings_screened, 3);
        assert_eq!(out.result.holdings_at_discount, 1);
        let row = &out.result.rows[0];
        assert_eq!(row.asset.as_deref(), Some("A"));
        assert_eq!(row.discount, dec!(20));
        assert_eq!(row.rate_delta_pct, Some(dec!(1.5)));
        // 20 / 15 = 1.33
        assert_eq!(row.recovery_years, Some(RecoveryTime::Years(dec!(1.33))));
    }

    #[test]
    fn test_candidate_not_better_leaves_time_undefined() {
        let input = SwapScreenInput {
            holdings: vec![holding("A", Some(dec!(0.12)), dec!(1000), dec!(950))],
            candidate: candidate(dec!(11)),
        };
        let out = screen_swaps(&input).unwrap();
        assert_eq!(out.result.rows[0].recovery_years, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_equal_rate_is_infinite() {
        let input = SwapScreenInput {
            holdings: vec![holding("A", Some(dec!(0.11)), dec!(1000), dec!(950))],
            candidate: candidate(dec!(11)),
        };
        let out = screen_swaps(&input).unwrap();
        assert_eq!(out.result.rows[0].recovery_years, Some(RecoveryTime::Infinite));
    }

    #[test]
    fn test_extreme_magnitudes_do_not_abort_the_screen() {
        let huge_discount = holding(
            "A",
            Some(dec!(0.1099999999)),
            dec!(70000000000000000000000000000),
            Decimal::ZERO,
        );
        let huge_rate = holding(
            "B",
            Some(dec!(1000000000000000000000000000)),
            dec!(1000),
            dec!(950),
        );
        let mut crossed = holding(
            "C",
            Some(dec!(0.09)),
            dec!(70000000000000000000000000000),
            Decimal::ZERO,
        );
        crossed.market_unit_price = Some(dec!(-70000000000000000000000000000));
        let input = SwapScreenInput {
            holdings: vec![huge_discount, huge_rate, crossed],
            candidate: candidate(dec!(11)),
        };
        let out = screen_swaps(&input).unwrap();
        assert_eq!(out.result.holdings_at_discount, 2);
        assert_eq!(out.result.rows[0].recovery_years, Some(RecoveryTime::Infinite));
        assert_eq!(out.result.rows[1].rate_delta_pct, None);
        assert_eq!(out.result.rows[1].recovery_years, None);
    }

    #[test]
    fn test_missing_prices_are_skipped() {
        let mut h = holding("A", Some(dec!(0.09)), dec!(1000), dec!(950));
        h.market_unit_price = None;
        let input = SwapScreenInput {
            holdings: vec![h],
            candidate: candidate(dec!(11)),
        };
        assert!(screen_swaps(&input).unwrap().result.rows.is_empty());
    }

    #[test]
    fn test_negative_candidate_rate_rejected() {
        let input = SwapScreenInput {
            holdings: vec![],
            candidate: candidate(dec!(-1)),
        };
        assert!(screen_swaps(&input).is_err());
    }
}
