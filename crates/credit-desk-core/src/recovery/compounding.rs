//! Compounding with periodic coupons.
//!
//! Capital starts at the sale proceeds and compounds monthly at the
//! replacement's rate. On each coupon month the coupon is approximated as
//! `capital × monthly_rate × months_per_coupon` and added to the recovered
//! amount. The loop stops once the discount is covered or the policy's
//! month ceiling is reached.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use tracing::warn;

use super::{
    CouponFrequency, RecoveryEstimate, RecoveryInput, RecoveryModel, RecoveryPolicy,
    RecoveryStep, RecoveryTime,
};
use crate::error::CreditDeskError;
use crate::types::Rate;
use crate::CreditDeskResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundingCoupons {
    pub frequency: CouponFrequency,
}

impl CompoundingCoupons {
    pub fn new(frequency: CouponFrequency) -> Self {
        Self { frequency }
    }
}

/// Monthly equivalent of an annual percentage rate: `(1 + r/100)^(1/12) − 1`.
pub fn monthly_rate(annual_rate_pct: Decimal) -> CreditDeskResult<Rate> {
    let base = Decimal::ONE + annual_rate_pct / dec!(100);
    base.checked_powd(Decimal::ONE / dec!(12))
        .map(|m| m - Decimal::ONE)
        .ok_or_else(|| CreditDeskError::InvalidInput {
            field: "new_rate_pct".into(),
            reason: format!("Cannot derive a monthly rate from {annual_rate_pct}%"),
        })
}

impl RecoveryModel for CompoundingCoupons {
    fn name(&self) -> &'static str {
        "compounding_coupons"
    }

    fn methodology(&self) -> &'static str {
        "Discount recovery — monthly compounding at the new rate, coupons of capital × monthly rate × period"
    }

    fn estimate(
        &self,
        input: &RecoveryInput,
        policy: &RecoveryPolicy,
    ) -> CreditDeskResult<RecoveryEstimate> {
        let discount = input.discount();
        let rate = monthly_rate(input.new_rate_pct)?;
        let growth = Decimal::ONE + rate;
        let period = self.frequency.months();
        let coupon_factor = rate * Decimal::from(period);

        let mut capital = input.market_price;
        let mut recovered = Decimal::ZERO;
        let mut month: u32 = 0;
        let mut next_coupon = period;
        let mut schedule = Vec::new();

        while recovered < discount {
            if month >= policy.max_simulation_months {
                warn!(month, %recovered, %discount, "recovery simulation hit its ceiling");
                return Ok(exhausted(month, schedule));
            }
            month += 1;
            capital = match capital.checked_mul(growth) {
                Some(c) => c,
                None => return Ok(exhausted(month, schedule)),
            };
            if month == next_coupon {
                let coupon = match capital.checked_mul(coupon_factor) {
                    Some(c) => c,
                    None => return Ok(exhausted(month, schedule)),
                };
                recovered = match recovered.checked_add(coupon) {
                    Some(r) => r,
                    None => return Ok(exhausted(month, schedule)),
                };
                next_coupon += period;
                schedule.push(RecoveryStep {
                    month,
                    capital,
                    coupon,
                    cumulative_recovered: recovered,
                });
            }
        }

        let years = (Decimal::from(month) / dec!(12)).round_dp(2);
        Ok(RecoveryEstimate {
            months: Some(month),
            num_coupons: Some(schedule.len() as u32),
            schedule,
            ..RecoveryEstimate::years(RecoveryTime::Years(years))
        })
    }
}

fn exhausted(month: u32, schedule: Vec<RecoveryStep>) -> RecoveryEstimate {
    RecoveryEstimate {
        months: Some(month),
        num_coupons: Some(schedule.len() as u32),
        schedule,
        exhausted: true,
        ..RecoveryEstimate::years(RecoveryTime::Infinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::{simulate_recovery, Advisory, DEFAULT_MAX_SIMULATION_MONTHS};

    fn input(market: Decimal, curve: Decimal, current: Decimal, new: Decimal) -> RecoveryInput {
        RecoveryInput {
            market_price: market,
            curve_price: curve,
            current_rate_pct: current,
            new_rate_pct: new,
        }
    }

    #[test]
    fn test_monthly_rate_of_12_68pct_is_about_1pct() {
        // 1.01^12 = 1.126825...
        let m = monthly_rate(dec!(12.6825030132)).unwrap();
        assert!((m - dec!(0.01)).abs() < dec!(0.000001), "got {m}");
    }

    #[test]
    fn test_reference_swap_monthly() {
        // 980 at 11% a.a.: ~8.5 per month, 20 recovered in the third month
        let i = input(dec!(980), dec!(1000), dec!(9.5), dec!(11.0));
        let model = CompoundingCoupons::new(CouponFrequency::Monthly);
        let out = simulate_recovery(&model, &i, &Default::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.recovery_time_months, Some(3));
        assert_eq!(r.recovery_time_years, Some(RecoveryTime::Years(dec!(0.25))));
        assert_eq!(r.num_coupons, Some(3));
        assert_eq!(r.schedule.len(), 3);
        assert!(r.schedule[2].cumulative_recovered >= dec!(20));
        assert!(r.schedule[1].cumulative_recovered < dec!(20));
        assert_eq!(r.advisory, Advisory::Advantageous);
    }

    #[test]
    fn test_coupons_only_on_frequency_months() {
        let i = input(dec!(980), dec!(1000), dec!(9.5), dec!(11.0));
        let model = CompoundingCoupons::new(CouponFrequency::Semiannual);
        let out = simulate_recovery(&model, &i, &Default::default()).unwrap();
        let r = &out.result;
        // one semiannual coupon of ~51 covers the 20 discount
        assert_eq!(r.recovery_time_months, Some(6));
        assert_eq!(r.schedule.len(), 1);
        assert_eq!(r.schedule[0].month, 6);
        assert!(r.recovery_time_months.unwrap() % 6 == 0);
    }

    #[test]
    fn test_cumulative_recovered_is_non_decreasing() {
        let i = input(dec!(900), dec!(1000), dec!(9.5), dec!(10.0));
        let model = CompoundingCoupons::new(CouponFrequency::Quarterly);
        let out = simulate_recovery(&model, &i, &Default::default()).unwrap();
        let schedule = &out.result.schedule;
        assert!(!schedule.is_empty());
        for pair in schedule.windows(2) {
            assert!(pair[1].cumulative_recovered >= pair[0].cumulative_recovered);
            assert_eq!(pair[1].month - pair[0].month, 3);
        }
    }

    #[test]
    fn test_large_discount_small_rate_terminates_within_ceiling() {
        // 10,000 discount on a 1,000 base at 1% a.a. (0.1 pt pick-up)
        let i = input(dec!(1000), dec!(11000), dec!(0.9), dec!(1.0));
        let model = CompoundingCoupons::new(CouponFrequency::Annual);
        let out = simulate_recovery(&model, &i, &Default::default()).unwrap();
        let r = &out.result;
        assert_ne!(r.advisory, Advisory::NoRecoveryHorizon);
        assert_eq!(r.advisory, Advisory::Caution);
        let months = r.recovery_time_months.unwrap();
        assert!(months < DEFAULT_MAX_SIMULATION_MONTHS, "took {months} months");
    }

    #[test]
    fn test_ceiling_reports_no_recovery_horizon() {
        let i = input(dec!(1000), dec!(11000), dec!(0.9), dec!(1.0));
        let model = CompoundingCoupons::new(CouponFrequency::Monthly);
        let policy = RecoveryPolicy {
            max_simulation_months: 24,
            ..Default::default()
        };
        let out = simulate_recovery(&model, &i, &policy).unwrap();
        let r = &out.result;
        assert_eq!(r.advisory, Advisory::NoRecoveryHorizon);
        assert_eq!(r.recovery_time_years, None);
        assert_eq!(r.recovery_time_months, Some(24));
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_capital_past_decimal_range_stops_without_panic() {
        let i = input(
            dec!(70000000000000000000000000000),
            dec!(79000000000000000000000000000),
            Decimal::ZERO,
            dec!(1000),
        );
        let model = CompoundingCoupons::new(CouponFrequency::Monthly);
        let out = simulate_recovery(&model, &i, &Default::default()).unwrap();
        assert_eq!(out.result.advisory, Advisory::NoRecoveryHorizon);
        assert_eq!(out.result.recovery_time_months, Some(1));
    }

    #[test]
    fn test_zero_proceeds_never_recover_but_stop() {
        let i = input(Decimal::ZERO, dec!(1000), dec!(9.5), dec!(11.0));
        let model = CompoundingCoupons::new(CouponFrequency::Monthly);
        let out = simulate_recovery(&model, &i, &Default::default()).unwrap();
        assert_eq!(out.result.advisory, Advisory::NoRecoveryHorizon);
    }
}
