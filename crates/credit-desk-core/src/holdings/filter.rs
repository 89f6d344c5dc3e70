//! Filter engine: a conjunction of optional predicates over enriched holdings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Instant;

use super::metrics::EnrichedRecord;
use super::record::IndexType;
use crate::error::CreditDeskError;
use crate::types::{with_metadata, ComputationOutput, PercentRate, Years};
use crate::CreditDeskResult;

/// Filter parameters. Every field is optional; an absent field imposes no
/// constraint. Thresholds given in percent are compared against fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Keep holdings with duration at or below this many years
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<Years>,
    /// Minimum annualized return, in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_annualized_return: Option<PercentRate>,
    /// Minimum realized return, in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_realized_return: Option<PercentRate>,
    /// `Todos` deserializes to `None`
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_index_filter"
    )]
    pub index_type: Option<IndexType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_contains: Option<String>,
}

impl FilterParams {
    pub fn is_empty(&self) -> bool {
        *self == FilterParams::default()
    }

    /// Apply the form convention where zero thresholds and blank text mean
    /// "not supplied".
    pub fn normalized(self) -> Self {
        FilterParams {
            max_duration: self.max_duration.filter(|v| !v.is_zero()),
            min_annualized_return: self.min_annualized_return.filter(|v| !v.is_zero()),
            min_realized_return: self.min_realized_return.filter(|v| !v.is_zero()),
            index_type: self.index_type,
            issuer_contains: non_blank(self.issuer_contains),
            asset_contains: non_blank(self.asset_contains),
        }
    }

    /// Fields set on `self` win; unset fields fall back to `base`.
    pub fn or(self, base: &FilterParams) -> Self {
        FilterParams {
            max_duration: self.max_duration.or(base.max_duration),
            min_annualized_return: self.min_annualized_return.or(base.min_annualized_return),
            min_realized_return: self.min_realized_return.or(base.min_realized_return),
            index_type: self.index_type.or(base.index_type),
            issuer_contains: self.issuer_contains.or_else(|| base.issuer_contains.clone()),
            asset_contains: self.asset_contains.or_else(|| base.asset_contains.clone()),
        }
    }

    pub fn validate(&self) -> CreditDeskResult<()> {
        if let Some(max) = self.max_duration {
            if max < Decimal::ZERO {
                return Err(CreditDeskError::InvalidInput {
                    field: "max_duration".into(),
                    reason: "Maximum duration cannot be negative".into(),
                });
            }
        }
        Ok(())
    }

    /// True when `record` satisfies every supplied predicate.
    ///
    /// A holding whose compared field is undefined fails that predicate.
    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        let asset = &record.asset;

        if let Some(max) = self.max_duration {
            if !matches!(asset.duration, Some(d) if d <= max) {
                return false;
            }
        }
        if let Some(min_pct) = self.min_annualized_return {
            let min = min_pct / dec!(100);
            if !matches!(record.annualized_return, Some(r) if r >= min) {
                return false;
            }
        }
        if let Some(min_pct) = self.min_realized_return {
            let min = min_pct / dec!(100);
            if !matches!(asset.realized_return_pct, Some(r) if r >= min) {
                return false;
            }
        }
        if let Some(index) = self.index_type {
            if !asset.index.as_deref().is_some_and(|i| index.matches(i)) {
                return false;
            }
        }
        if let Some(ref needle) = self.issuer_contains {
            if !contains_ignore_case(asset.issuer.as_deref(), needle) {
                return false;
            }
        }
        if let Some(ref needle) = self.asset_contains {
            if !contains_ignore_case(asset.asset.as_deref(), needle) {
                return false;
            }
        }
        true
    }
}

/// Deserialize an index choice where `Todos`, `all` or blank mean no constraint.
pub fn deserialize_index_filter<'de, D>(deserializer: D) -> Result<Option<IndexType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => IndexType::parse_filter(&s).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// Return the subset of `records` matching `params`. The input is not
/// modified; matching records are copied into a new view.
pub fn filter_records(records: &[EnrichedRecord], params: &FilterParams) -> Vec<EnrichedRecord> {
    records
        .iter()
        .filter(|r| params.matches(r))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Standalone entry point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterInput {
    pub records: Vec<EnrichedRecord>,
    #[serde(default)]
    pub filters: FilterParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOutput {
    pub records: Vec<EnrichedRecord>,
    pub matched: usize,
    pub rejected: usize,
}

/// Filter an already enriched record set.
pub fn apply_filters(input: &FilterInput) -> CreditDeskResult<ComputationOutput<FilterOutput>> {
    let start = Instant::now();
    let filters = input.filters.clone().normalized();
    filters.validate()?;

    let records = filter_records(&input.records, &filters);
    let output = FilterOutput {
        matched: records.len(),
        rejected: input.records.len() - records.len(),
        records,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Holdings filter — conjunction of supplied predicates",
        &filters,
        Vec::new(),
        elapsed,
        output,
    ))
}
