//! Credit card statement cycle arithmetic.
//!
//! A card is configured with three days of the month: the day a statement
//! cycle starts, the day it ends and the day payment is due. A cycle whose end
//! day is before its start day spans a month boundary, e.g. the 25th to the
//! 24th of the next month.
//!
//! Days past the end of a short month are clamped to the last day of that
//! month, so a cycle starting on the 31st starts on Feb 28 in February.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId,
    calendar::{add_months, clamped_date},
    database_id::BankId,
};

/// The three days of the month that define a credit card's billing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BillingConfigData")]
pub struct CreditCardBillingConfig {
    cycle_start_day: u8,
    cycle_end_day: u8,
    due_day: u8,
}

impl CreditCardBillingConfig {
    /// Create a billing config.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidBillingDay] if any day is not from 1 to 31.
    pub fn new(cycle_start_day: u8, cycle_end_day: u8, due_day: u8) -> Result<Self, Error> {
        for day in [cycle_start_day, cycle_end_day, due_day] {
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidBillingDay(day));
            }
        }

        Ok(Self {
            cycle_start_day,
            cycle_end_day,
            due_day,
        })
    }

    /// The day of the month a statement cycle starts.
    pub fn cycle_start_day(&self) -> u8 {
        self.cycle_start_day
    }

    /// The day of the month a statement cycle ends.
    pub fn cycle_end_day(&self) -> u8 {
        self.cycle_end_day
    }

    /// The day of the month the statement must be paid by.
    pub fn due_day(&self) -> u8 {
        self.due_day
    }
}

/// Unvalidated billing config as received in a request body.
#[derive(Deserialize)]
struct BillingConfigData {
    cycle_start_day: u8,
    cycle_end_day: u8,
    due_day: u8,
}

impl TryFrom<BillingConfigData> for CreditCardBillingConfig {
    type Error = Error;

    fn try_from(data: BillingConfigData) -> Result<Self, Self::Error> {
        Self::new(data.cycle_start_day, data.cycle_end_day, data.due_day)
    }
}

/// The date range a credit card statement covers and when it must be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCycle {
    pub cycle_start: Date,
    pub cycle_end: Date,
    pub due_date: Date,
}

/// Compute the billing cycle that starts in the month of `reference_date`.
pub fn generate_billing_cycle(
    config: &CreditCardBillingConfig,
    reference_date: Date,
) -> BillingCycle {
    let (year, month) = (reference_date.year(), reference_date.month());
    let cycle_start = clamped_date(year, month, config.cycle_start_day);

    let (end_year, end_month) = if config.cycle_end_day < config.cycle_start_day {
        add_months(year, month, 1)
    } else {
        (year, month)
    };
    let cycle_end = clamped_date(end_year, end_month, config.cycle_end_day);

    let due_date = if config.due_day < config.cycle_end_day {
        let (due_year, due_month) = add_months(end_year, end_month, 1);
        clamped_date(due_year, due_month, config.due_day)
    } else {
        let same_month_due = clamped_date(end_year, end_month, config.due_day);

        if same_month_due >= cycle_end {
            same_month_due
        } else {
            let (due_year, due_month) = add_months(end_year, end_month, 1);
            clamped_date(due_year, due_month, config.due_day)
        }
    };

    BillingCycle {
        cycle_start,
        cycle_end,
        due_date,
    }
}

/// Find the billing cycle for `today`.
///
/// Starts from the cycle that starts this month. If `today` is before its
/// start, last month's cycle is used, and if `today` is after its end, next
/// month's cycle is used. When the end day is not the day before the start
/// day there are gaps between cycles, and a date in a gap gets the cycle on
/// the side given by those two rules rather than one containing it.
pub fn get_current_billing_cycle(config: &CreditCardBillingConfig, today: Date) -> BillingCycle {
    let this_month = cycle_for_month_offset(config, today, 0);

    if today < this_month.cycle_start {
        cycle_for_month_offset(config, today, -1)
    } else if today > this_month.cycle_end {
        cycle_for_month_offset(config, today, 1)
    } else {
        this_month
    }
}

/// The cycles starting in each of the `count` months from the month of `today`.
///
/// Each cycle is computed independently, they are not checked for contiguity.
pub fn generate_upcoming_cycles(
    config: &CreditCardBillingConfig,
    today: Date,
    count: usize,
) -> Vec<BillingCycle> {
    (0..count as i32)
        .map(|offset| cycle_for_month_offset(config, today, offset))
        .collect()
}

/// Whether `date` is within `cycle`, inclusive of both ends.
pub fn is_date_in_cycle(date: Date, cycle: &BillingCycle) -> bool {
    cycle.cycle_start <= date && date <= cycle.cycle_end
}

/// The number of days from `today` until the cycle's payment is due.
///
/// Negative once the due date has passed.
pub fn days_until_due(cycle: &BillingCycle, today: Date) -> i64 {
    (cycle.due_date - today).whole_days()
}

/// Sum the expenses charged to a card during `cycle`, i.e. the statement balance so far.
pub fn get_cycle_spending(
    user_id: UserId,
    bank_id: BankId,
    cycle: &BillingCycle,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND bank_id = ?2 AND type = 'EXPENSE'
             AND date BETWEEN ?3 AND ?4",
        )?
        .query_row(
            (
                user_id.as_i64(),
                bank_id,
                cycle.cycle_start,
                cycle.cycle_end,
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn cycle_for_month_offset(
    config: &CreditCardBillingConfig,
    today: Date,
    offset: i32,
) -> BillingCycle {
    let (year, month) = add_months(today.year(), today.month(), offset);

    generate_billing_cycle(config, clamped_date(year, month, 1))
}
