//! Simple annualized gain: the rate pick-up earned each year on the sale
//! proceeds, with no compounding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{RecoveryEstimate, RecoveryInput, RecoveryModel, RecoveryPolicy, RecoveryTime};
use crate::error::CreditDeskError;
use crate::CreditDeskResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnualizedGain;

impl RecoveryModel for AnnualizedGain {
    fn name(&self) -> &'static str {
        "annualized_gain"
    }

    fn methodology(&self) -> &'static str {
        "Discount recovery — discount / (rate pick-up × sale proceeds), simple annual gain"
    }

    fn estimate(
        &self,
        input: &RecoveryInput,
        _policy: &RecoveryPolicy,
    ) -> CreditDeskResult<RecoveryEstimate> {
        let annual_gain = (input.rate_delta_pct() / dec!(100))
            .checked_mul(input.market_price)
            .ok_or_else(|| CreditDeskError::InvalidInput {
                field: "market_price".into(),
                reason: "Annual gain overflows decimal range".into(),
            })?;
        // quotient past decimal range: unbounded horizon
        let years = if annual_gain > Decimal::ZERO {
            input
                .discount()
                .checked_div(annual_gain)
                .map_or(RecoveryTime::Infinite, RecoveryTime::Years)
        } else {
            RecoveryTime::Infinite
        };
        Ok(RecoveryEstimate {
            annual_gain: Some(annual_gain),
            ..RecoveryEstimate::years(years)
        })
    }
}
