//! Discount-recovery simulators.
//!
//! Selling a holding below its curve value realizes a discount (deságio).
//! Each model estimates how long reinvesting the sale proceeds in a
//! higher-yielding replacement takes to earn that discount back. The three
//! models share [`RecoveryInput`], the advantage screen and the advisory
//! thresholds; only the accrual arithmetic differs.

pub mod annualized;
pub mod compounding;
pub mod fixed_coupon;
pub mod swap_screen;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::CreditDeskError;
use crate::types::{with_metadata, ComputationOutput, Money, PercentRate, Years};
use crate::CreditDeskResult;

pub use annualized::AnnualizedGain;
pub use compounding::CompoundingCoupons;
pub use fixed_coupon::FixedCoupon;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Horizons above this many years are flagged for caution.
pub const DEFAULT_CAUTION_THRESHOLD_YEARS: Years = dec!(5);

/// Month-by-month simulations stop here (1000 years).
pub const DEFAULT_MAX_SIMULATION_MONTHS: u32 = 12_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Scalar inputs shared by every recovery model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryInput {
    /// Sale price received for the current asset (PU Mercado)
    #[serde(alias = "pu_mercado")]
    pub market_price: Money,
    /// Curve / par value of the current asset (PU Curva)
    #[serde(alias = "pu_curva")]
    pub curve_price: Money,
    /// Gross annual rate of the current asset, in percent
    #[serde(alias = "taxa_atual")]
    pub current_rate_pct: PercentRate,
    /// Gross annual rate of the replacement asset, in percent
    #[serde(alias = "taxa_nova")]
    pub new_rate_pct: PercentRate,
}

impl RecoveryInput {
    /// Realized discount; zero or negative when sold at or above curve.
    pub fn discount(&self) -> Money {
        self.curve_price - self.market_price
    }

    /// Rate pick-up of the replacement, in percentage points.
    pub fn rate_delta_pct(&self) -> PercentRate {
        self.new_rate_pct - self.current_rate_pct
    }
}

/// Coupon period of the replacement asset, in months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponFrequency {
    #[default]
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl CouponFrequency {
    pub fn months(&self) -> u32 {
        match self {
            CouponFrequency::Monthly => 1,
            CouponFrequency::Quarterly => 3,
            CouponFrequency::Semiannual => 6,
            CouponFrequency::Annual => 12,
        }
    }
}

impl std::str::FromStr for CouponFrequency {
    type Err = CreditDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensal" | "1" => Ok(CouponFrequency::Monthly),
            "quarterly" | "trimestral" | "3" => Ok(CouponFrequency::Quarterly),
            "semiannual" | "semi-annual" | "semestral" | "6" => Ok(CouponFrequency::Semiannual),
            "annual" | "annually" | "anual" | "12" => Ok(CouponFrequency::Annual),
            other => Err(CreditDeskError::InvalidInput {
                field: "frequency".into(),
                reason: format!(
                    "Unknown coupon frequency '{other}'. Use: monthly, quarterly, semiannual, annual"
                ),
            }),
        }
    }
}

/// Estimated time to recover the discount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTime {
    Years(Years),
    Infinite,
}

impl RecoveryTime {
    pub fn exceeds(&self, threshold: Years) -> bool {
        match self {
            RecoveryTime::Years(y) => *y > threshold,
            RecoveryTime::Infinite => true,
        }
    }
}

impl fmt::Display for RecoveryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryTime::Years(y) => write!(f, "{:.2}", y),
            RecoveryTime::Infinite => f.write_str("∞"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// Recovers within the caution threshold
    Advantageous,
    /// Recovers, but beyond the caution threshold
    Caution,
    /// Replacement does not yield more than the current asset
    NotAdvantageous,
    /// Sold at or above curve value
    NothingToRecover,
    /// Simulation hit its iteration ceiling before recovering
    NoRecoveryHorizon,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::Advantageous => "The swap may be advantageous; recovery time is reasonable.",
            Advisory::Caution => "Recovering the discount may take more than the caution threshold. Evaluate with caution.",
            Advisory::NotAdvantageous => "The new asset's rate is equal to or lower than the current one. The swap does not pay off.",
            Advisory::NothingToRecover => "The asset was sold at or above its curve value; there is no discount to recover.",
            Advisory::NoRecoveryHorizon => "The discount is not recovered within any reasonable horizon.",
        }
    }
}

/// One coupon event of a simulated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryStep {
    pub month: u32,
    pub capital: Money,
    pub coupon: Money,
    pub cumulative_recovered: Money,
}

/// Model-specific result before the advisory is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryEstimate {
    pub years: RecoveryTime,
    pub months: Option<u32>,
    pub annual_gain: Option<Money>,
    pub num_coupons: Option<u32>,
    pub schedule: Vec<RecoveryStep>,
    /// The model stopped at its ceiling without recovering
    pub exhausted: bool,
}

impl RecoveryEstimate {
    pub fn years(years: RecoveryTime) -> Self {
        Self {
            years,
            months: None,
            annual_gain: None,
            num_coupons: None,
            schedule: Vec::new(),
            exhausted: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryOutput {
    pub model: String,
    pub discount: Money,
    pub rate_delta_pct: PercentRate,
    pub advisory: Advisory,
    pub message: String,
    pub recovery_time_years: Option<RecoveryTime>,
    pub recovery_time_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_gain: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_coupons: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub schedule: Vec<RecoveryStep>,
}

/// Advisory thresholds and iteration bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryPolicy {
    pub caution_threshold_years: Years,
    pub max_simulation_months: u32,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            caution_threshold_years: DEFAULT_CAUTION_THRESHOLD_YEARS,
            max_simulation_months: DEFAULT_MAX_SIMULATION_MONTHS,
        }
    }
}

/// A recovery model. Implementations only see inputs that passed the shared
/// screen: a positive rate pick-up and a positive discount.
pub trait RecoveryModel {
    fn name(&self) -> &'static str;

    fn methodology(&self) -> &'static str;

    /// Model-specific input checks, run before the shared screen.
    fn validate(&self) -> CreditDeskResult<()> {
        Ok(())
    }

    fn estimate(
        &self,
        input: &RecoveryInput,
        policy: &RecoveryPolicy,
    ) -> CreditDeskResult<RecoveryEstimate>;
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run `model` on `input`, screening out swaps that cannot recover anything.
pub fn simulate_recovery(
    model: &dyn RecoveryModel,
    input: &RecoveryInput,
    policy: &RecoveryPolicy,
) -> CreditDeskResult<ComputationOutput<RecoveryOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    validate_policy(policy)?;
    model.validate()?;

    let discount = input.discount();
    let rate_delta_pct = input.rate_delta_pct();

    let screened = if rate_delta_pct <= Decimal::ZERO {
        Some(Advisory::NotAdvantageous)
    } else if discount <= Decimal::ZERO {
        Some(Advisory::NothingToRecover)
    } else {
        None
    };

    let output = match screened {
        Some(advisory) => {
            warnings.push(advisory.message().to_string());
            RecoveryOutput {
                model: model.name().to_string(),
                discount,
                rate_delta_pct,
                advisory,
                message: advisory.message().to_string(),
                recovery_time_years: None,
                recovery_time_months: None,
                annual_gain: None,
                num_coupons: None,
                schedule: Vec::new(),
            }
        }
        None => {
            let estimate = model.estimate(input, policy)?;
            let advisory = if estimate.exhausted {
                Advisory::NoRecoveryHorizon
            } else if estimate.years.exceeds(policy.caution_threshold_years) {
                Advisory::Caution
            } else {
                Advisory::Advantageous
            };
            if advisory != Advisory::Advantageous {
                warnings.push(advisory.message().to_string());
            }
            RecoveryOutput {
                model: model.name().to_string(),
                discount,
                rate_delta_pct,
                advisory,
                message: advisory.message().to_string(),
                recovery_time_years: (!estimate.exhausted).then_some(estimate.years),
                recovery_time_months: estimate.months,
                annual_gain: estimate.annual_gain,
                num_coupons: estimate.num_coupons,
                schedule: estimate.schedule,
            }
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        model.methodology(),
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// A model choice as it arrives in a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RecoveryModelSpec {
    AnnualizedGain,
    CompoundingCoupons {
        #[serde(default)]
        frequency: CouponFrequency,
    },
    FixedCoupon {
        coupon_amount: Money,
        #[serde(default)]
        frequency: CouponFrequency,
    },
}

impl RecoveryModelSpec {
    pub fn build(&self) -> Box<dyn RecoveryModel> {
        match self {
            RecoveryModelSpec::AnnualizedGain => Box::new(AnnualizedGain),
            RecoveryModelSpec::CompoundingCoupons { frequency } => {
                Box::new(CompoundingCoupons::new(*frequency))
            }
            RecoveryModelSpec::FixedCoupon {
                coupon_amount,
                frequency,
            } => Box::new(FixedCoupon::new(*coupon_amount, *frequency)),
        }
    }
}

/// Self-describing recovery request: inputs, model and optional policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryRequest {
    #[serde(flatten)]
    pub input: RecoveryInput,
    #[serde(flatten)]
    pub model: RecoveryModelSpec,
    #[serde(default)]
    pub policy: RecoveryPolicy,
}

pub fn run_recovery_request(
    request: &RecoveryRequest,
) -> CreditDeskResult<ComputationOutput<RecoveryOutput>> {
    let model = request.model.build();
    simulate_recovery(model.as_ref(), &request.input, &request.policy)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &RecoveryInput) -> CreditDeskResult<()> {
    if input.market_price < Decimal::ZERO {
        return Err(CreditDeskError::InvalidInput {
            field: "market_price".into(),
            reason: "Market price cannot be negative".into(),
        });
    }
    if input.curve_price < Decimal::ZERO {
        return Err(CreditDeskError::InvalidInput {
            field: "curve_price".into(),
            reason: "Curve price cannot be negative".into(),
        });
    }
    if input.current_rate_pct < Decimal::ZERO {
        return Err(CreditDeskError::InvalidInput {
            field: "current_rate_pct".into(),
            reason: "Current rate cannot be negative".into(),
        });
    }
    if input.new_rate_pct < Decimal::ZERO {
        return Err(CreditDeskError::InvalidInput {
            field: "new_rate_pct".into(),
            reason: "New rate cannot be negative".into(),
        });
    }
    Ok(())
}

fn validate_policy(policy: &RecoveryPolicy) -> CreditDeskResult<()> {
    if policy.caution_threshold_years < Decimal::ZERO {
        return Err(CreditDeskError::InvalidInput {
            field: "caution_threshold_years".into(),
            reason: "Caution threshold cannot be negative".into(),
        });
    }
    if policy.max_simulation_months == 0 {
        return Err(CreditDeskError::InvalidInput {
            field: "max_simulation_months".into(),
            reason: "Simulation ceiling must be at least one month".into(),
        });
    }
    Ok(())
}
