use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use credit_desk_core::config::DeskConfig;
use credit_desk_core::recovery::{
    run_recovery_request, simulate_recovery, AnnualizedGain, CompoundingCoupons, CouponFrequency,
    FixedCoupon, RecoveryInput, RecoveryModel, RecoveryRequest,
};

use crate::input;

/// Prices and rates shared by every recovery model
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SwapPricesArgs {
    /// Sale price of the current asset (PU Mercado)
    #[arg(long, alias = "market-price")]
    pub pu_mercado: Decimal,

    /// Curve value of the current asset (PU Curva)
    #[arg(long, alias = "curve-price")]
    pub pu_curva: Decimal,

    /// Gross annual rate of the current asset, in percent
    #[arg(long, alias = "current-rate")]
    pub taxa_atual: Decimal,

    /// Gross annual rate of the replacement asset, in percent
    #[arg(long, alias = "new-rate")]
    pub taxa_nova: Decimal,
}

impl SwapPricesArgs {
    fn to_input(&self) -> RecoveryInput {
        RecoveryInput {
            market_price: self.pu_mercado,
            curve_price: self.pu_curva,
            current_rate_pct: self.taxa_atual,
            new_rate_pct: self.taxa_nova,
        }
    }
}

/// Arguments for the simple annualized-gain model
#[derive(Args)]
pub struct SimpleRecoveryArgs {
    #[command(flatten)]
    pub prices: SwapPricesArgs,
}

/// Arguments for the compounding-coupon model
#[derive(Args)]
pub struct CompoundingArgs {
    #[command(flatten)]
    pub prices: SwapPricesArgs,

    /// Coupon frequency: monthly, quarterly, semiannual, annual
    #[arg(long, default_value = "monthly")]
    pub frequency: CouponFrequency,
}

/// Arguments for the fixed-coupon model
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FixedCouponArgs {
    #[command(flatten)]
    pub prices: SwapPricesArgs,

    /// Coupon amount received each period
    #[arg(long)]
    pub coupon: Decimal,

    /// Coupon frequency: monthly, quarterly, semiannual, annual
    #[arg(long, default_value = "monthly")]
    pub frequency: CouponFrequency,
}

/// Arguments for a JSON-described recovery request
#[derive(Args)]
pub struct RecoveryFileArgs {
    /// Path to JSON input file (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_simple(args: SimpleRecoveryArgs, desk: &DeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    run_model(&AnnualizedGain, &args.prices, desk)
}

pub fn run_compounding(args: CompoundingArgs, desk: &DeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    run_model(&CompoundingCoupons::new(args.frequency), &args.prices, desk)
}

pub fn run_fixed_coupon(args: FixedCouponArgs, desk: &DeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    run_model(&FixedCoupon::new(args.coupon, args.frequency), &args.prices, desk)
}

pub fn run_from_file(args: RecoveryFileArgs, desk: &DeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let mut document: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> is required (or pipe JSON on stdin)".into());
    };

    // Documents without their own policy inherit the desk's
    if let Value::Object(ref mut map) = document {
        if !map.contains_key("policy") {
            map.insert("policy".into(), serde_json::to_value(desk.recovery_policy())?);
        }
    }

    let request: RecoveryRequest = serde_json::from_value(document)?;
    let result = run_recovery_request(&request)?;
    Ok(serde_json::to_value(result)?)
}

fn run_model(
    model: &dyn RecoveryModel,
    prices: &SwapPricesArgs,
    desk: &DeskConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let result = simulate_recovery(model, &prices.to_input(), &desk.recovery_policy())?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn reference_prices() -> SwapPricesArgs {
        SwapPricesArgs {
            pu_mercado: dec!(980),
            pu_curva: dec!(1000),
            taxa_atual: dec!(9.5),
            taxa_nova: dec!(11),
        }
    }

    #[test]
    fn test_simple_model_output() {
        let args = SimpleRecoveryArgs {
            prices: reference_prices(),
        };
        let value = run_simple(args, &DeskConfig::default()).unwrap();
        assert_eq!(value["result"]["model"], "annualized_gain");
        assert_eq!(value["result"]["advisory"], "Advantageous");
    }

    #[test]
    fn test_desk_threshold_reaches_the_model() {
        let desk = DeskConfig {
            caution_threshold_years: dec!(1),
            ..Default::default()
        };
        let args = SimpleRecoveryArgs {
            prices: reference_prices(),
        };
        let value = run_simple(args, &desk).unwrap();
        assert_eq!(value["result"]["advisory"], "Caution");
    }

    #[test]
    fn test_fixed_coupon_rejects_zero_coupon() {
        let args = FixedCouponArgs {
            prices: reference_prices(),
            coupon: Decimal::ZERO,
            frequency: CouponFrequency::Monthly,
        };
        assert!(run_fixed_coupon(args, &DeskConfig::default()).is_err());
    }

    #[test]
    fn test_request_file_inherits_desk_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"model": "annualized_gain", "pu_mercado": 980, "pu_curva": 1000,
                "taxa_atual": 9.5, "taxa_nova": 11}}"#
        )
        .unwrap();
        let desk = DeskConfig {
            caution_threshold_years: dec!(1),
            ..Default::default()
        };
        let args = RecoveryFileArgs {
            input: Some(file.path().to_str().unwrap().to_string()),
        };
        let value = run_from_file(args, &desk).unwrap();
        assert_eq!(value["result"]["advisory"], "Caution");
    }
}
