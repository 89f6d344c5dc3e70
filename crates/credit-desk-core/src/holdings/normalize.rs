//! Record normalizer: keeps eligible credit rows and coerces their cells.
//!
//! Coercion never fails a batch. A cell that cannot be read as the column's
//! semantic type becomes `None` on the typed record and is reported as a
//! [`CoercionFailure`]; only the `Tipo` filter drops rows.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::record::{columns, AssetRecord, AssetType, RawCell, RawRecord};

/// Largest serial Excel can represent (31/12/9999).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A cell that held a value which could not be coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionFailure {
    /// Zero-based position of the row in the input record set
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Output of [`normalize_records`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub records: Vec<AssetRecord>,
    pub rows_read: usize,
    /// Rows whose `Tipo` is not Debênture, CRA or CRI
    pub rows_excluded: usize,
    pub coercion_failures: Vec<CoercionFailure>,
}

/// Filter a raw record set to eligible credit assets and coerce every field.
pub fn normalize_records(raw: &[RawRecord]) -> NormalizedBatch {
    let mut records = Vec::with_capacity(raw.len());
    let mut failures = Vec::new();
    let mut excluded = 0;

    for (row, cells) in raw.iter().enumerate() {
        let asset_type = match parse_text(cells.get(columns::ASSET_TYPE))
            .as_deref()
            .and_then(AssetType::from_label)
        {
            Some(t) => t,
            None => {
                excluded += 1;
                continue;
            }
        };

        let mut c = RowCoercer {
            cells,
            row,
            failures: &mut failures,
        };
        records.push(AssetRecord {
            account: c.text(columns::ACCOUNT),
            asset_type,
            issuer: c.text(columns::ISSUER),
            asset: c.text(columns::ASSET),
            index: c.text(columns::INDEX),
            purchase_rate: c.decimal(columns::PURCHASE_RATE),
            acquisition_date: c.date(columns::ACQUISITION_DATE),
            market_unit_price: c.decimal(columns::MARKET_UNIT_PRICE),
            cost_unit_price: c.decimal(columns::COST_UNIT_PRICE),
            curve_unit_price: c.decimal(columns::CURVE_UNIT_PRICE),
            premium_discount: c.decimal(columns::PREMIUM_DISCOUNT),
            premium_discount_pct: c.decimal(columns::PREMIUM_DISCOUNT_PCT),
            accumulated_proceeds: c.decimal(columns::ACCUMULATED_PROCEEDS),
            duration: c.decimal(columns::DURATION),
            realized_return: c.decimal(columns::REALIZED_RETURN),
            realized_return_pct: c.decimal(columns::REALIZED_RETURN_PCT),
            carry_over_cdi: c.decimal(columns::CARRY_OVER_CDI),
            total_market_value: c.decimal(columns::TOTAL_MARKET_VALUE),
        });
    }

    info!(
        rows_read = raw.len(),
        eligible = records.len(),
        excluded,
        coercion_failures = failures.len(),
        "normalized holdings"
    );

    NormalizedBatch {
        records,
        rows_read: raw.len(),
        rows_excluded: excluded,
        coercion_failures: failures,
    }
}

struct RowCoercer<'a> {
    cells: &'a RawRecord,
    row: usize,
    failures: &'a mut Vec<CoercionFailure>,
}

impl RowCoercer<'_> {
    fn text(&self, column: &str) -> Option<String> {
        parse_text(self.cells.get(column))
    }

    fn decimal(&mut self, column: &str) -> Option<Decimal> {
        let cell = self.cells.get(column);
        let parsed = parse_decimal(cell);
        if parsed.is_none() {
            self.record_failure(column, cell);
        }
        parsed
    }

    fn date(&mut self, column: &str) -> Option<NaiveDate> {
        let cell = self.cells.get(column);
        let parsed = parse_date(cell);
        if parsed.is_none() {
            self.record_failure(column, cell);
        }
        parsed
    }

    fn record_failure(&mut self, column: &str, cell: &RawCell) {
        if cell.is_empty() {
            return;
        }
        let value = describe(cell);
        debug!(row = self.row, column, %value, "could not coerce cell");
        self.failures.push(CoercionFailure {
            row: self.row,
            column: column.to_string(),
            value,
        });
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Trimmed, non-empty text. Whole numbers render without a fraction so that
/// numeric account ids read back as `"123456"`.
pub fn parse_text(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Empty => None,
        RawCell::Text(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        RawCell::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
            Some(format!("{}", *n as i64))
        }
        RawCell::Number(n) if n.is_finite() => Some(n.to_string()),
        RawCell::Number(_) => None,
        RawCell::Bool(b) => Some(b.to_string()),
        RawCell::Date(d) => Some(d.format("%d/%m/%Y").to_string()),
    }
}

/// Read a numeric cell.
///
/// Text accepts plain decimals (`1234.56`, `1e-3`), the Brazilian locale
/// (`R$ 1.234,56`) and percent strings (`12,5%` → `0.125`).
pub fn parse_decimal(cell: &RawCell) -> Option<Decimal> {
    match cell {
        RawCell::Number(n) if n.is_finite() => Decimal::try_from(*n).ok(),
        RawCell::Text(s) => parse_decimal_text(s),
        _ => None,
    }
}

fn parse_decimal_text(s: &str) -> Option<Decimal> {
    let mut cleaned: String = s
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let percent = cleaned.ends_with('%');
    if percent {
        cleaned.pop();
    }
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    let value = cleaned
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
        .or_else(|| {
            // Brazilian layout only when `,` is the decimal mark (last separator)
            match cleaned.rfind([',', '.']) {
                Some(i) if cleaned[i..].starts_with(',') => {
                    cleaned.replace('.', "").replace(',', ".").parse::<Decimal>().ok()
                }
                _ => None,
            }
        })?;

    Some(if percent { value / dec!(100) } else { value })
}

/// Read a date cell: native dates, common text layouts, or Excel serials.
pub fn parse_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date(d) => Some(*d),
        RawCell::Text(s) => parse_date_text(s.trim()),
        RawCell::Number(n) if n.is_finite() && *n >= 1.0 && *n <= EXCEL_MAX_SERIAL => {
            excel_serial_to_date(*n)
        }
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Excel's 1900 date system, with day zero at 30/12/1899.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn describe(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Bool(b) => b.to_string(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Date(d) => d.to_string(),
        RawCell::Text(s) => s.clone(),
    }
}
