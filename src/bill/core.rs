//! Defines recurring bills and their database queries.

use std::str::FromStr;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error, UserId,
    bank::get_bank,
    calendar::{add_months, clamped_date},
    category::get_category,
    database_id::{BankId, BillId, CategoryId},
    db::sql_text_enum,
};

/// How often a bill falls due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "WEEKLY",
            Frequency::Biweekly => "BIWEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// The due date of occurrence number `index`, where occurrence 0 is `first`.
    ///
    /// Month based frequencies keep the day of `first` and clamp it to the
    /// length of each month, so a bill first due on Jan 31 is next due on
    /// Feb 28 (or 29) and then Mar 31.
    pub fn occurrence(&self, first: Date, index: u32) -> Date {
        let months = match self {
            Frequency::Weekly => return first + Duration::weeks(index as i64),
            Frequency::Biweekly => return first + Duration::weeks(2 * index as i64),
            Frequency::Monthly => index as i32,
            Frequency::Quarterly => 3 * index as i32,
            Frequency::Yearly => 12 * index as i32,
        };

        let (year, month) = add_months(first.year(), first.month(), months);

        clamped_date(year, month, first.day())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEEKLY" => Ok(Frequency::Weekly),
            "BIWEEKLY" => Ok(Frequency::Biweekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "QUARTERLY" => Ok(Frequency::Quarterly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(Error::InvalidFrequency(other.to_owned())),
        }
    }
}

sql_text_enum!(Frequency);

/// A recurring bill, e.g. rent or a phone plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub user_id: UserId,
    pub name: String,
    /// The expected amount of each payment.
    pub amount: f64,
    /// The category that payments of this bill are recorded under.
    pub category_id: CategoryId,
    /// The bank the bill is usually paid from.
    pub bank_id: Option<BankId>,
    pub frequency: Frequency,
    /// The first due date. Later due dates are derived from it.
    pub start_date: Date,
    /// No payments are due after this date.
    pub end_date: Option<Date>,
    /// Inactive bills do not get new payments.
    pub is_active: bool,
}

/// The data needed to create a [Bill].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBill {
    pub name: String,
    pub amount: f64,
    pub category_id: CategoryId,
    #[serde(default)]
    pub bank_id: Option<BankId>,
    pub frequency: Frequency,
    pub start_date: Date,
    #[serde(default)]
    pub end_date: Option<Date>,
}

pub fn create_bill_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS bill (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            category_id INTEGER NOT NULL,
            bank_id INTEGER,
            frequency TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE,
            FOREIGN KEY(bank_id) REFERENCES bank(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_bill_user ON bill(user_id, is_active);",
    )?;

    Ok(())
}

/// Create an active bill for `user_id`.
///
/// # Errors
/// Returns:
/// - [Error::EmptyName] if the name is blank,
/// - [Error::NonPositiveAmount] if the amount is zero, negative or not finite,
/// - [Error::InvalidDateRange] if `end_date` is before `start_date`,
/// - [Error::InvalidForeignKey] if the category or bank does not belong to the user,
/// - [Error::SqlError] for any other SQL error.
pub fn create_bill(
    user_id: UserId,
    new_bill: NewBill,
    connection: &Connection,
) -> Result<Bill, Error> {
    let name = new_bill.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    if !new_bill.amount.is_finite() || new_bill.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(new_bill.amount));
    }

    if let Some(end_date) = new_bill
        .end_date
        .filter(|end_date| *end_date < new_bill.start_date)
    {
        return Err(Error::InvalidDateRange {
            start: new_bill.start_date,
            end: end_date,
        });
    }

    get_category(user_id, new_bill.category_id, connection)
        .map_err(not_found_as_invalid_reference)?;
    if let Some(bank_id) = new_bill.bank_id {
        get_bank(user_id, bank_id, connection).map_err(not_found_as_invalid_reference)?;
    }

    connection
        .prepare(
            "INSERT INTO bill
                (user_id, name, amount, category_id, bank_id, frequency, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, name, amount, category_id, bank_id, frequency,
                start_date, end_date, is_active",
        )?
        .query_row(
            (
                user_id.as_i64(),
                name,
                new_bill.amount,
                new_bill.category_id,
                new_bill.bank_id,
                new_bill.frequency,
                new_bill.start_date,
                new_bill.end_date,
            ),
            map_bill_row,
        )
        .map_err(|error| error.into())
}

fn not_found_as_invalid_reference(error: Error) -> Error {
    match error {
        Error::NotFound => Error::InvalidForeignKey,
        error => error,
    }
}

/// Retrieve a bill owned by `user_id`.
pub fn get_bill(user_id: UserId, bill_id: BillId, connection: &Connection) -> Result<Bill, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, category_id, bank_id, frequency,
                start_date, end_date, is_active
             FROM bill WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((bill_id, user_id.as_i64()), map_bill_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's bills ordered by name.
pub fn get_bills_for_user(user_id: UserId, connection: &Connection) -> Result<Vec<Bill>, Error> {
    query_bills(
        "SELECT id, user_id, name, amount, category_id, bank_id, frequency,
            start_date, end_date, is_active
         FROM bill WHERE user_id = ?1 ORDER BY name ASC, id ASC",
        user_id,
        connection,
    )
}

/// Retrieve the user's bills that are still generating payments.
pub fn get_active_bills_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Bill>, Error> {
    query_bills(
        "SELECT id, user_id, name, amount, category_id, bank_id, frequency,
            start_date, end_date, is_active
         FROM bill WHERE user_id = ?1 AND is_active = 1 ORDER BY id ASC",
        user_id,
        connection,
    )
}

fn query_bills(query: &str, user_id: UserId, connection: &Connection) -> Result<Vec<Bill>, Error> {
    connection
        .prepare(query)?
        .query_map((user_id.as_i64(),), map_bill_row)?
        .map(|maybe_bill| maybe_bill.map_err(|error| error.into()))
        .collect()
}

/// Activate or deactivate a bill. Existing payments are kept either way.
///
/// # Errors
/// Returns an [Error::NotFound] if the bill does not exist or belongs to another user.
pub fn set_bill_active(
    user_id: UserId,
    bill_id: BillId,
    is_active: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE bill SET is_active = ?1 WHERE id = ?2 AND user_id = ?3",
        (is_active, bill_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_bill_row(row: &Row) -> Result<Bill, rusqlite::Error> {
    Ok(Bill {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        amount: row.get(3)?,
        category_id: row.get(4)?,
        bank_id: row.get(5)?,
        frequency: row.get(6)?,
        start_date: row.get(7)?,
        end_date: row.get(8)?,
        is_active: row.get(9)?,
    })
}
