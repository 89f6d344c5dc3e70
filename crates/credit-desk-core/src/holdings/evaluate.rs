//! End-to-end holdings evaluation: normalize, enrich, filter, summarize.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use super::filter::{filter_records, FilterParams};
use super::metrics::{enrich_all, EnrichedRecord, ANNUALIZATION_BASE};
use super::normalize::{normalize_records, CoercionFailure};
use super::record::RawRecord;
use super::report::{display_rows, DisplayRow};
use super::summary::{summarize, HoldingsSummary};
use crate::calendar::BusinessDayConvention;
use crate::types::{with_metadata, ComputationOutput};
use crate::CreditDeskResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub records: Vec<RawRecord>,
    /// Snapshot date the elapsed business days are counted to
    pub evaluation_date: NaiveDate,
    #[serde(default)]
    pub filters: FilterParams,
    #[serde(default)]
    pub business_days: BusinessDayConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOutput {
    pub summary: HoldingsSummary,
    pub rows_read: usize,
    pub rows_eligible: usize,
    pub rows_excluded: usize,
    pub rows_matched: usize,
    pub coercion_failures: Vec<CoercionFailure>,
    pub records: Vec<EnrichedRecord>,
    pub rows: Vec<DisplayRow>,
}

#[derive(Serialize)]
struct EvaluationAssumptions<'a> {
    evaluation_date: NaiveDate,
    business_days: BusinessDayConvention,
    annualization_base: Decimal,
    filters: &'a FilterParams,
}

/// Evaluate a raw holdings sheet and return the filtered, enriched view.
pub fn evaluate_holdings(
    input: &EvaluationInput,
) -> CreditDeskResult<ComputationOutput<EvaluationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let filters = input.filters.clone().normalized();
    filters.validate()?;

    let batch = normalize_records(&input.records);
    if !batch.coercion_failures.is_empty() {
        warnings.push(format!(
            "{} cell(s) could not be read and were left undefined",
            batch.coercion_failures.len()
        ));
    }

    let enriched = enrich_all(&batch.records, input.evaluation_date, input.business_days);
    let undated = enriched
        .iter()
        .filter(|r| r.business_days_elapsed.is_none())
        .count();
    if undated > 0 {
        warnings.push(format!(
            "{undated} holding(s) without acquisition date; annualized return left empty"
        ));
    }

    let matched = filter_records(&enriched, &filters);
    info!(
        eligible = enriched.len(),
        matched = matched.len(),
        "evaluated holdings"
    );

    let summary = summarize(&matched);
    if summary.volume_overflow {
        warnings.push("Market volume exceeds decimal range; total left at zero".into());
    }

    let output = EvaluationOutput {
        summary,
        rows_read: batch.rows_read,
        rows_eligible: batch.records.len(),
        rows_excluded: batch.rows_excluded,
        rows_matched: matched.len(),
        coercion_failures: batch.coercion_failures,
        rows: display_rows(&matched),
        records: matched,
    };

    let assumptions = EvaluationAssumptions {
        evaluation_date: input.evaluation_date,
        business_days: input.business_days,
        annualization_base: ANNUALIZATION_BASE,
        filters: &filters,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Credit holdings evaluation: (1 + r)^(252/d) - 1 annualization, ordered recommendation rules",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
