//! Display rows for the filtered view, one string per export column.

use serde::{Deserialize, Serialize};

use super::metrics::EnrichedRecord;
use crate::display::{format_date, format_money, format_plain, format_rate};
use crate::types::{Money, Rate};

/// Column order of the exported sheet.
pub const DISPLAY_COLUMNS: [&str; 20] = [
    "Conta",
    "Tipo",
    "Emissor",
    "Ativo",
    "Indexador",
    "Taxa Compra",
    "Data Aquisição",
    "Valor PU Mercado",
    "Valor PU Custo",
    "Valor PU Curva",
    "Ágio ou Deságio",
    "Percentual Ágio ou Deságio",
    "Valor Acumulado Proventos",
    "Duration",
    "Rentabilidade",
    "Percentual Rentabilidade",
    "Percentual Carrego CDI",
    "Valor Total Mercado",
    "ROI Anualizado",
    "Sugestão",
];

/// A holding rendered for presentation. Undefined values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    #[serde(rename = "Conta")]
    pub account: String,
    #[serde(rename = "Tipo")]
    pub asset_type: String,
    #[serde(rename = "Emissor")]
    pub issuer: String,
    #[serde(rename = "Ativo")]
    pub asset: String,
    #[serde(rename = "Indexador")]
    pub index: String,
    #[serde(rename = "Taxa Compra")]
    pub purchase_rate: String,
    #[serde(rename = "Data Aquisição")]
    pub acquisition_date: String,
    #[serde(rename = "Valor PU Mercado")]
    pub market_unit_price: String,
    #[serde(rename = "Valor PU Custo")]
    pub cost_unit_price: String,
    #[serde(rename = "Valor PU Curva")]
    pub curve_unit_price: String,
    #[serde(rename = "Ágio ou Deságio")]
    pub premium_discount: String,
    #[serde(rename = "Percentual Ágio ou Deságio")]
    pub premium_discount_pct: String,
    #[serde(rename = "Valor Acumulado Proventos")]
    pub accumulated_proceeds: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Rentabilidade")]
    pub realized_return: String,
    #[serde(rename = "Percentual Rentabilidade")]
    pub realized_return_pct: String,
    #[serde(rename = "Percentual Carrego CDI")]
    pub carry_over_cdi: String,
    #[serde(rename = "Valor Total Mercado")]
    pub total_market_value: String,
    #[serde(rename = "ROI Anualizado")]
    pub annualized_return: String,
    #[serde(rename = "Sugestão")]
    pub recommendation: String,
}

fn money(v: Option<Money>) -> String {
    v.map(format_money).unwrap_or_default()
}

fn rate(v: Option<Rate>) -> String {
    v.map(format_rate).unwrap_or_default()
}

impl From<&EnrichedRecord> for DisplayRow {
    fn from(r: &EnrichedRecord) -> Self {
        let a = &r.asset;
        DisplayRow {
            account: a.account.clone().unwrap_or_default(),
            asset_type: a.asset_type.label().to_string(),
            issuer: a.issuer.clone().unwrap_or_default(),
            asset: a.asset.clone().unwrap_or_default(),
            index: a.index.clone().unwrap_or_default(),
            purchase_rate: rate(a.purchase_rate),
            acquisition_date: a.acquisition_date.map(format_date).unwrap_or_default(),
            market_unit_price: money(a.market_unit_price),
            cost_unit_price: money(a.cost_unit_price),
            curve_unit_price: money(a.curve_unit_price),
            premium_discount: money(a.premium_discount),
            premium_discount_pct: rate(a.premium_discount_pct),
            accumulated_proceeds: money(a.accumulated_proceeds),
            duration: a.duration.map(|d| format_plain(d, 2)).unwrap_or_default(),
            realized_return: money(a.realized_return),
            realized_return_pct: rate(a.realized_return_pct),
            carry_over_cdi: rate(a.carry_over_cdi),
            total_market_value: money(a.total_market_value),
            annualized_return: rate(r.annualized_return),
            recommendation: r.recommendation.label().to_string(),
        }
    }
}

pub fn display_rows(records: &[EnrichedRecord]) -> Vec<DisplayRow> {
    records.iter().map(DisplayRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::metrics::Recommendation;
    use crate::holdings::record::{AssetRecord, AssetType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_row_formats_each_column() {
        let mut a = AssetRecord::empty(AssetType::Debenture);
        a.account = Some("998877".into());
        a.asset = Some("ENGIA1".into());
        a.purchase_rate = Some(dec!(0.0675));
        a.acquisition_date = NaiveDate::from_ymd_opt(2023, 1, 9);
        a.total_market_value = Some(dec!(1234567.8));
        a.duration = Some(dec!(3.456));
        let row = DisplayRow::from(&EnrichedRecord {
            asset: a,
            business_days_elapsed: Some(400),
            annualized_return: Some(dec!(0.11111)),
            recommendation: Recommendation::ConsiderReallocate,
        });
        assert_eq!(row.account, "998877");
        assert_eq!(row.asset_type, "Debênture");
        assert_eq!(row.purchase_rate, "6,75");
        assert_eq!(row.acquisition_date, "09/01/2023");
        assert_eq!(row.total_market_value, "1.234.567,80");
        assert_eq!(row.duration, "3,46");
        assert_eq!(row.annualized_return, "11,11");
        assert_eq!(row.recommendation, "Avaliar Realocação");
    }

    #[test]
    fn test_undefined_values_render_empty() {
        let row = DisplayRow::from(&EnrichedRecord {
            asset: AssetRecord::empty(AssetType::Cra),
            business_days_elapsed: None,
            annualized_return: None,
            recommendation: Recommendation::None,
        });
        assert_eq!(row.annualized_return, "");
        assert_eq!(row.market_unit_price, "");
        assert_eq!(row.recommendation, "");
        assert_eq!(row.asset_type, "CRA");
    }

    #[test]
    fn test_serialized_keys_match_display_columns() {
        let value = serde_json::to_value(DisplayRow::default()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        let mut expected: Vec<&str> = DISPLAY_COLUMNS.to_vec();
        keys.sort();
        expected.sort();
        assert_eq!(keys, expected);
    }
}
