//! Business-day counting without a holiday calendar (Monday to Friday).

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How the endpoints of an acquisition → evaluation range are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessDayConvention {
    /// Weekdays in `[start, end]`, both endpoints counted.
    #[default]
    Inclusive,
    /// Weekdays in `[start, end)`: a same-day range counts zero.
    HalfOpen,
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count weekdays between `start` and `end` under `convention`.
///
/// Returns zero when `start` is after `end`.
pub fn business_days_between(
    start: NaiveDate,
    end: NaiveDate,
    convention: BusinessDayConvention,
) -> u32 {
    if start > end {
        return 0;
    }
    let half_open = weekdays_before(start, end);
    match convention {
        BusinessDayConvention::HalfOpen => half_open,
        BusinessDayConvention::Inclusive => half_open + u32::from(is_business_day(end)),
    }
}

/// Weekdays in `[start, end)`.
fn weekdays_before(start: NaiveDate, end: NaiveDate) -> u32 {
    let span = (end - start).num_days();
    if span <= 0 {
        return 0;
    }
    let full_weeks = span / 7;
    let mut count = full_weeks * 5;
    let mut date = start + Duration::days(full_weeks * 7);
    while date < end {
        if is_business_day(date) {
            count += 1;
        }
        date += Duration::days(1);
    }
    count as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_same_day_half_open_is_zero() {
        let monday = d(2024, 6, 3);
        assert_eq!(
            business_days_between(monday, monday, BusinessDayConvention::HalfOpen),
            0
        );
    }

    #[test]
    fn test_same_day_inclusive_counts_weekday() {
        let monday = d(2024, 6, 3);
        let saturday = d(2024, 6, 8);
        assert_eq!(
            business_days_between(monday, monday, BusinessDayConvention::Inclusive),
            1
        );
        assert_eq!(
            business_days_between(saturday, saturday, BusinessDayConvention::Inclusive),
            0
        );
    }

    #[test]
    fn test_one_full_week() {
        // Mon 3 Jun -> Mon 10 Jun: Mon..Fri = 5 half-open, 6 inclusive
        let start = d(2024, 6, 3);
        let end = d(2024, 6, 10);
        assert_eq!(business_days_between(start, end, BusinessDayConvention::HalfOpen), 5);
        assert_eq!(business_days_between(start, end, BusinessDayConvention::Inclusive), 6);
    }

    #[test]
    fn test_weekend_start() {
        // Sat 8 Jun -> Wed 12 Jun: Mon, Tue = 2
        let start = d(2024, 6, 8);
        let end = d(2024, 6, 12);
        assert_eq!(business_days_between(start, end, BusinessDayConvention::HalfOpen), 2);
    }

    #[test]
    fn test_full_year_2024() {
        // 2024 has 262 weekdays
        let start = d(2024, 1, 1);
        let end = d(2025, 1, 1);
        assert_eq!(business_days_between(start, end, BusinessDayConvention::HalfOpen), 262);
    }

    #[test]
    fn test_future_start_is_zero() {
        let start = d(2025, 1, 10);
        let end = d(2025, 1, 1);
        assert_eq!(business_days_between(start, end, BusinessDayConvention::Inclusive), 0);
    }

    #[test]
    fn test_default_counts_both_endpoints() {
        // Mon 3 Jun -> Mon 10 Jun, counted the way a bdate_range length is
        let start = d(2024, 6, 3);
        let end = d(2024, 6, 10);
        let convention = BusinessDayConvention::default();
        assert_eq!(convention, BusinessDayConvention::Inclusive);
        assert_eq!(business_days_between(start, end, convention), 6);
        assert_eq!(business_days_between(start, start, convention), 1);
    }
}
