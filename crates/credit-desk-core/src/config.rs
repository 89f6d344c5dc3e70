//! Desk-wide defaults. Every key is optional; a missing key keeps the
//! built-in value.

use serde::{Deserialize, Serialize};

use crate::calendar::BusinessDayConvention;
use crate::holdings::filter::FilterParams;
use crate::recovery::{RecoveryPolicy, DEFAULT_CAUTION_THRESHOLD_YEARS, DEFAULT_MAX_SIMULATION_MONTHS};
use crate::types::Years;

/// Worksheet name used by the custody export.
pub const DEFAULT_SHEET_NAME: &str = "Export";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub sheet_name: String,
    pub business_days: BusinessDayConvention,
    pub caution_threshold_years: Years,
    pub max_simulation_months: u32,
    /// Filters applied when a run supplies none of its own
    pub filters: FilterParams,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            business_days: BusinessDayConvention::default(),
            caution_threshold_years: DEFAULT_CAUTION_THRESHOLD_YEARS,
            max_simulation_months: DEFAULT_MAX_SIMULATION_MONTHS,
            filters: FilterParams::default(),
        }
    }
}

impl DeskConfig {
    pub fn recovery_policy(&self) -> RecoveryPolicy {
        RecoveryPolicy {
            caution_threshold_years: self.caution_threshold_years,
            max_simulation_months: self.max_simulation_months,
        }
    }
}
