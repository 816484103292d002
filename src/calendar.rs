//! Calendar arithmetic shared by billing cycles, budget periods and bill schedules.

use time::{Date, Duration, Month};

/// The number of days in `month` of `year`.
pub fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Build a date, clamping `day` to the last day of the month.
///
/// Day 31 in February gives Feb 28 (or 29 in a leap year) instead of rolling
/// over into March.
pub fn clamped_date(year: i32, month: Month, day: u8) -> Date {
    let day = day.clamp(1, last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).expect("clamped day is always valid")
}

/// Shift a year and month by `offset` months (negative offsets go backwards).
pub fn add_months(year: i32, month: Month, offset: i32) -> (i32, Month) {
    let zero_based_month = year * 12 + (month as i32 - 1) + offset;
    let year = zero_based_month.div_euclid(12);
    let month_number = zero_based_month.rem_euclid(12) as u8 + 1;

    (
        year,
        Month::try_from(month_number).expect("month number is always from 1 to 12"),
    )
}

/// The Monday that starts the week containing `date`.
pub fn start_of_week(date: Date) -> Date {
    let days_since_monday = date.weekday().number_days_from_monday() as i64;

    date - Duration::days(days_since_monday)
}

/// The first and last day of the calendar month containing `date`.
pub fn month_bounds(date: Date) -> (Date, Date) {
    let (year, month) = (date.year(), date.month());

    (
        clamped_date(year, month, 1),
        clamped_date(year, month, last_day_of_month(year, month)),
    )
}

/// The first and last day of the calendar year containing `date`.
pub fn year_bounds(date: Date) -> (Date, Date) {
    let year = date.year();

    (
        clamped_date(year, Month::January, 1),
        clamped_date(year, Month::December, 31),
    )
}
