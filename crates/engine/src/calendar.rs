//! Calendar-aware date stepping.
//!
//! Installment plans, subscription expansions and billing advancement all
//! step dates by whole months. A day-of-month that does not exist in the
//! target month is clamped to that month's last day, so Jan 31 + 1 month is
//! Feb 28 (or 29), never Mar 3.

use chrono::{Datelike, Days, NaiveDate};

use crate::{EngineError, ResultEngine};

/// Returns the date `months` calendar months after `start`, clamped to the
/// last day of the target month.
pub fn add_months(start: NaiveDate, months: u32) -> ResultEngine<NaiveDate> {
    let zero_based = i64::from(start.month0()) + i64::from(months);
    let year = i64::from(start.year()) + zero_based.div_euclid(12);
    let month = u32::try_from(zero_based.rem_euclid(12)).map_err(|_| out_of_range(start))? + 1;
    let year = i32::try_from(year).map_err(|_| out_of_range(start))?;

    let last_day = last_day_of_month(year, month).ok_or_else(|| out_of_range(start))?;
    NaiveDate::from_ymd_opt(year, month, start.day().min(last_day))
        .ok_or_else(|| out_of_range(start))
}

/// Returns the date `days` days after `start`.
pub fn add_days(start: NaiveDate, days: u64) -> ResultEngine<NaiveDate> {
    start
        .checked_add_days(Days::new(days))
        .ok_or_else(|| out_of_range(start))
}

/// Last day (28..=31) of the given month, or `None` for an invalid month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

/// Date of period `index` (0-based) of a monthly series starting on `start`.
///
/// Each period is computed from `start` rather than from the previous
/// period, so a clamped February does not drag later months to the 28th.
pub fn monthly_series(start: NaiveDate, periods: u32) -> ResultEngine<Vec<NaiveDate>> {
    (0..periods).map(|i| add_months(start, i)).collect()
}

fn out_of_range(date: NaiveDate) -> EngineError {
    EngineError::InvalidArgument(format!("date out of range when stepping from {date}"))
}
