//! Presentation helpers for the Brazilian locale used by the holdings export.
//!
//! Money renders with `.` as thousands separator and `,` as decimal separator;
//! rates render as percentage points with two decimals and no `%` suffix.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

/// Render a monetary amount as `1.234.567,89`.
pub fn format_money(value: Money) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}{},{}", sign, group_thousands(int_part), frac_part)
}

/// Render a monetary amount as `R$ 1.234.567,89`.
pub fn format_currency(value: Money) -> String {
    format!("R$ {}", format_money(value))
}

/// Render a decimal rate (0.1234) as percentage points (`12,34`).
///
/// A rate whose percentage is out of decimal range renders empty.
pub fn format_rate(value: Rate) -> String {
    value
        .checked_mul(dec!(100))
        .map(|pct| format_plain(pct, 2))
        .unwrap_or_default()
}

/// Render a number with `dp` decimals, `,` as decimal separator and no grouping.
pub fn format_plain(value: Decimal, dp: u32) -> String {
    format!("{:.*}", dp as usize, value.round_dp(dp)).replace('.', ",")
}

/// Render a date as `dd/mm/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
