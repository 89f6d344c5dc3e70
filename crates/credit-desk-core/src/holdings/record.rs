//! Raw spreadsheet rows and the typed credit-asset record built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CreditDeskError;
use crate::CreditDeskResult;
use crate::types::{Money, Rate, Years};

// ---------------------------------------------------------------------------
// Column names of the "Export" sheet
// ---------------------------------------------------------------------------

pub mod columns {
    pub const ACCOUNT: &str = "Conta";
    pub const ASSET_TYPE: &str = "Tipo";
    pub const ISSUER: &str = "Emissor";
    pub const ASSET: &str = "Ativo";
    pub const INDEX: &str = "Indexador";
    pub const PURCHASE_RATE: &str = "Taxa Compra";
    pub const ACQUISITION_DATE: &str = "Data Aquisição";
    pub const MARKET_UNIT_PRICE: &str = "Valor PU Mercado";
    pub const COST_UNIT_PRICE: &str = "Valor PU Custo";
    pub const CURVE_UNIT_PRICE: &str = "Valor PU Curva";
    pub const PREMIUM_DISCOUNT: &str = "Ágio ou Deságio";
    pub const PREMIUM_DISCOUNT_PCT: &str = "Percentual Ágio ou Deságio";
    pub const ACCUMULATED_PROCEEDS: &str = "Valor Acumulado Proventos";
    pub const DURATION: &str = "Duration";
    pub const REALIZED_RETURN: &str = "Rentabilidade";
    pub const REALIZED_RETURN_PCT: &str = "Percentual Rentabilidade";
    pub const CARRY_OVER_CDI: &str = "Percentual Carrego CDI";
    pub const TOTAL_MARKET_VALUE: &str = "Valor Total Mercado";
    pub const ANNUALIZED_RETURN: &str = "ROI Anualizado";
    pub const RECOMMENDATION: &str = "Sugestão";
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A single untyped cell as delivered by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

impl From<NaiveDate> for RawCell {
    fn from(d: NaiveDate) -> Self {
        RawCell::Date(d)
    }
}

static EMPTY_CELL: RawCell = RawCell::Empty;

/// One spreadsheet row keyed by column header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    cells: BTreeMap<String, RawCell>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; header whitespace is trimmed.
    pub fn with(mut self, column: &str, cell: impl Into<RawCell>) -> Self {
        self.insert(column, cell.into());
        self
    }

    pub fn insert(&mut self, column: &str, cell: RawCell) {
        self.cells.insert(column.trim().to_string(), cell);
    }

    /// Look up a column, tolerating stray whitespace in the stored header.
    pub fn get(&self, column: &str) -> &RawCell {
        self.cells
            .get(column)
            .or_else(|| {
                self.cells
                    .iter()
                    .find(|(k, _)| k.trim() == column)
                    .map(|(_, v)| v)
            })
            .unwrap_or(&EMPTY_CELL)
    }

    /// True when every cell is empty (trailing spreadsheet rows).
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(RawCell::is_empty)
    }
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Credit instruments the desk evaluates. Every other `Tipo` is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "Debênture")]
    Debenture,
    #[serde(rename = "CRA")]
    Cra,
    #[serde(rename = "CRI")]
    Cri,
}

impl AssetType {
    pub const ELIGIBLE: [AssetType; 3] = [AssetType::Debenture, AssetType::Cra, AssetType::Cri];

    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Debenture => "Debênture",
            AssetType::Cra => "CRA",
            AssetType::Cri => "CRI",
        }
    }

    /// Exact match on the spreadsheet label, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ELIGIBLE.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rate benchmark of a credit asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "CDI+", alias = "cdi+", alias = "CDI")]
    CdiPlus,
    #[serde(rename = "IPCA+", alias = "ipca+", alias = "IPCA")]
    IpcaPlus,
    #[serde(rename = "PRE", alias = "pre", alias = "PRÉ")]
    Pre,
}

impl IndexType {
    pub fn label(&self) -> &'static str {
        match self {
            IndexType::CdiPlus => "CDI+",
            IndexType::IpcaPlus => "IPCA+",
            IndexType::Pre => "PRE",
        }
    }

    /// Parse a filter choice, where `Todos` (or `all`) means no constraint.
    pub fn parse_filter(s: &str) -> CreditDeskResult<Option<Self>> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("todos") || s.eq_ignore_ascii_case("all") {
            Ok(None)
        } else {
            s.parse().map(Some)
        }
    }

    /// Case-insensitive containment of the benchmark label in a free-text
    /// `Indexador` cell (e.g. `"IPCA+ 6,5%"` matches `IpcaPlus`).
    pub fn matches(&self, indexador: &str) -> bool {
        indexador
            .to_lowercase()
            .contains(&self.label().to_lowercase())
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IndexType {
    type Err = CreditDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cdi+" | "cdi" => Ok(IndexType::CdiPlus),
            "ipca+" | "ipca" => Ok(IndexType::IpcaPlus),
            "pre" | "pré" => Ok(IndexType::Pre),
            other => Err(CreditDeskError::InvalidInput {
                field: "index_type".into(),
                reason: format!("Unknown index '{other}'. Use: CDI+, IPCA+, PRE, Todos"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed record
// ---------------------------------------------------------------------------

/// A normalized credit holding. Fields that failed coercion are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub account: Option<String>,
    pub asset_type: AssetType,
    pub issuer: Option<String>,
    pub asset: Option<String>,
    pub index: Option<String>,
    /// Purchase rate as a decimal fraction
    pub purchase_rate: Option<Rate>,
    pub acquisition_date: Option<NaiveDate>,
    pub market_unit_price: Option<Money>,
    pub cost_unit_price: Option<Money>,
    pub curve_unit_price: Option<Money>,
    pub premium_discount: Option<Money>,
    pub premium_discount_pct: Option<Rate>,
    pub accumulated_proceeds: Option<Money>,
    pub duration: Option<Years>,
    pub realized_return: Option<Money>,
    pub realized_return_pct: Option<Rate>,
    pub carry_over_cdi: Option<Rate>,
    pub total_market_value: Option<Money>,
}

impl AssetRecord {
    /// A record of the given type with every other field undefined.
    pub fn empty(asset_type: AssetType) -> Self {
        Self {
            account: None,
            asset_type,
            issuer: None,
            asset: None,
            index: None,
            purchase_rate: None,
            acquisition_date: None,
            market_unit_price: None,
            cost_unit_price: None,
            curve_unit_price: None,
            premium_discount: None,
            premium_discount_pct: None,
            accumulated_proceeds: None,
            duration: None,
            realized_return: None,
            realized_return_pct: None,
            carry_over_cdi: None,
            total_market_value: None,
        }
    }

    /// Curve value minus market value; positive when the asset trades at a discount.
    pub fn unit_discount(&self) -> Option<Money> {
        self.curve_unit_price?.checked_sub(self.market_unit_price?)
    }
}
