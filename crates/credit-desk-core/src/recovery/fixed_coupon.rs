//! Fixed coupon amortization: the discount is paid down by a constant coupon
//! amount every period. Closed form, no iteration.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{
    CouponFrequency, RecoveryEstimate, RecoveryInput, RecoveryModel, RecoveryPolicy, RecoveryTime,
};
use crate::error::CreditDeskError;
use crate::types::Money;
use crate::CreditDeskResult;

#[derive(Debug, Clone, Copy)]
pub struct FixedCoupon {
    pub coupon_amount: Money,
    pub frequency: CouponFrequency,
}

impl FixedCoupon {
    pub fn new(coupon_amount: Money, frequency: CouponFrequency) -> Self {
        Self {
            coupon_amount,
            frequency,
        }
    }
}

impl RecoveryModel for FixedCoupon {
    fn name(&self) -> &'static str {
        "fixed_coupon"
    }

    fn methodology(&self) -> &'static str {
        "Discount recovery — ceil(discount / coupon) fixed coupons at the given frequency"
    }

    fn validate(&self) -> CreditDeskResult<()> {
        if self.coupon_amount <= Decimal::ZERO {
            return Err(CreditDeskError::InvalidInput {
                field: "coupon_amount".into(),
                reason: "Coupon amount must be positive".into(),
            });
        }
        Ok(())
    }

    fn estimate(
        &self,
        input: &RecoveryInput,
        _policy: &RecoveryPolicy,
    ) -> CreditDeskResult<RecoveryEstimate> {
        let coupons = input
            .discount()
            .checked_div(self.coupon_amount)
            .ok_or_else(|| CreditDeskError::InvalidInput {
                field: "coupon_amount".into(),
                reason: "Coupon count overflows decimal range".into(),
            })?
            .ceil();
        let num_coupons = coupons.to_u32().ok_or_else(|| CreditDeskError::InvalidInput {
            field: "coupon_amount".into(),
            reason: format!("{coupons} coupons exceed any representable horizon"),
        })?;
        let months = num_coupons
            .checked_mul(self.frequency.months())
            .ok_or_else(|| CreditDeskError::InvalidInput {
                field: "coupon_amount".into(),
                reason: "Recovery horizon in months overflows".into(),
            })?;
        let years = (Decimal::from(months) / dec!(12)).round_dp(2);

        Ok(RecoveryEstimate {
            months: Some(months),
            num_coupons: Some(num_coupons),
            ..RecoveryEstimate::years(RecoveryTime::Years(years))
        })
    }
}
