//! Resolves a budget period to concrete dates and classifies spending against it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error,
    calendar::{month_bounds, start_of_week, year_bounds},
    db::sql_text_enum,
};

/// How often a budget resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "WEEKLY",
            BudgetPeriod::Monthly => "MONTHLY",
            BudgetPeriod::Yearly => "YEARLY",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    /// Parse a period name, failing on anything unknown instead of picking a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEEKLY" => Ok(BudgetPeriod::Weekly),
            "MONTHLY" => Ok(BudgetPeriod::Monthly),
            "YEARLY" => Ok(BudgetPeriod::Yearly),
            other => Err(Error::InvalidPeriod(other.to_owned())),
        }
    }
}

sql_text_enum!(BudgetPeriod);

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: Date,
    pub end: Date,
}

/// How much of a budget has been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    /// Less than 75% used.
    OnTrack,
    /// At least 75% but less than 100% used.
    Warning,
    /// 100% or more used.
    OverBudget,
}

const WARNING_PERCENT: i64 = 75;
const OVER_BUDGET_PERCENT: i64 = 100;

/// Get the dates of the budget period that contains `today`.
///
/// Weeks run Monday to Sunday, months and years are calendar months and years.
/// The window is always relative to `today`, but if the budget started part
/// way through the window, the window starts on `start_date` instead so that
/// spending from before the budget existed is not counted. A budget that
/// starts after the window ends yields a range where `start > end`, which
/// contains no dates.
pub fn get_current_period_dates(
    period: BudgetPeriod,
    start_date: Date,
    today: Date,
) -> PeriodRange {
    let (start, end) = match period {
        BudgetPeriod::Weekly => {
            let start = start_of_week(today);
            (start, start + Duration::days(6))
        }
        BudgetPeriod::Monthly => month_bounds(today),
        BudgetPeriod::Yearly => year_bounds(today),
    };

    PeriodRange {
        start: start.max(start_date),
        end,
    }
}

/// The percentage of `budgeted` that `actual` represents, rounded to the nearest integer.
///
/// Returns 0 when `budgeted` is zero.
pub fn calculate_percent_used(actual: f64, budgeted: f64) -> i64 {
    if budgeted == 0.0 {
        return 0;
    }

    (actual / budgeted * 100.0).round() as i64
}

/// Classify spending against a budget by the percentage used.
pub fn get_budget_status(actual: f64, budgeted: f64) -> BudgetStatus {
    let percent_used = calculate_percent_used(actual, budgeted);

    if percent_used < WARNING_PERCENT {
        BudgetStatus::OnTrack
    } else if percent_used < OVER_BUDGET_PERCENT {
        BudgetStatus::Warning
    } else {
        BudgetStatus::OverBudget
    }
}

#[cfg(test)]
mod period_dates_tests {
    use time::macros::date;

    use super::{BudgetPeriod, PeriodRange, get_current_period_dates};

    #[test]
    fn weekly_is_monday_to_sunday() {
        // 2025-03-13 is a Thursday.
        let range = get_current_period_dates(
            BudgetPeriod::Weekly,
            date!(2024 - 01 - 01),
            date!(2025 - 03 - 13),
        );

        assert_eq!(
            range,
            PeriodRange {
                start: date!(2025 - 03 - 10),
                end: date!(2025 - 03 - 16)
            }
        );
    }

    #[test]
    fn weekly_on_sunday_belongs_to_previous_monday() {
        let range = get_current_period_dates(
            BudgetPeriod::Weekly,
            date!(2024 - 01 - 01),
            date!(2025 - 03 - 16),
        );

        assert_eq!(range.start, date!(2025 - 03 - 10));
    }

    #[test]
    fn monthly_is_calendar_month() {
        let range = get_current_period_dates(
            BudgetPeriod::Monthly,
            date!(2024 - 01 - 01),
            date!(2024 - 02 - 10),
        );

        assert_eq!(
            range,
            PeriodRange {
                start: date!(2024 - 02 - 01),
                end: date!(2024 - 02 - 29)
            }
        );
    }

    #[test]
    fn yearly_is_calendar_year() {
        let range = get_current_period_dates(
            BudgetPeriod::Yearly,
            date!(2024 - 01 - 01),
            date!(2025 - 07 - 04),
        );

        assert_eq!(
            range,
            PeriodRange {
                start: date!(2025 - 01 - 01),
                end: date!(2025 - 12 - 31)
            }
        );
    }

    #[test]
    fn start_is_clamped_to_budget_start_date() {
        let range = get_current_period_dates(
            BudgetPeriod::Monthly,
            date!(2025 - 03 - 15),
            date!(2025 - 03 - 20),
        );

        assert_eq!(
            range,
            PeriodRange {
                start: date!(2025 - 03 - 15),
                end: date!(2025 - 03 - 31)
            }
        );
    }
}
