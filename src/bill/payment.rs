//! Payment instances: a single due occurrence of a bill and its status.

use std::str::FromStr;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error, UserId,
    database_id::{BillId, BillPaymentId, TransactionId},
    db::sql_text_enum,
};

/// A payment is due soon when it is due within this many days of today.
pub const DUE_SOON_DAYS: i64 = 7;

/// Where a payment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Upcoming,
    DueSoon,
    Overdue,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Upcoming => "UPCOMING",
            PaymentStatus::DueSoon => "DUE_SOON",
            PaymentStatus::Overdue => "OVERDUE",
            PaymentStatus::Paid => "PAID",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPCOMING" => Ok(PaymentStatus::Upcoming),
            "DUE_SOON" => Ok(PaymentStatus::DueSoon),
            "OVERDUE" => Ok(PaymentStatus::Overdue),
            "PAID" => Ok(PaymentStatus::Paid),
            other => Err(Error::InvalidPaymentStatus(other.to_owned())),
        }
    }
}

sql_text_enum!(PaymentStatus);

/// One due occurrence of a [crate::bill::Bill].
///
/// `status` is [PaymentStatus::Paid] exactly when `paid_amount` and
/// `transaction_id` are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPayment {
    pub id: BillPaymentId,
    pub bill_id: BillId,
    pub due_date: Date,
    /// The expected amount, copied from the bill when the payment was generated.
    pub amount: f64,
    pub status: PaymentStatus,
    pub paid_date: Option<Date>,
    pub paid_amount: Option<f64>,
    /// The expense transaction that records the payment.
    pub transaction_id: Option<TransactionId>,
    pub notes: Option<String>,
}

/// Work out the status of a payment that is due on `due_date`.
///
/// Paid payments stay paid. Otherwise a payment is overdue once its due date
/// has passed, due soon within [DUE_SOON_DAYS] days of its due date, and
/// upcoming before that.
pub fn classify_payment_status(
    due_date: Date,
    today: Date,
    current: PaymentStatus,
) -> PaymentStatus {
    if current == PaymentStatus::Paid {
        PaymentStatus::Paid
    } else if due_date < today {
        PaymentStatus::Overdue
    } else if due_date <= today + Duration::days(DUE_SOON_DAYS) {
        PaymentStatus::DueSoon
    } else {
        PaymentStatus::Upcoming
    }
}

pub fn create_bill_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS bill_payment (
            id INTEGER PRIMARY KEY,
            bill_id INTEGER NOT NULL,
            due_date TEXT NOT NULL,
            amount REAL NOT NULL,
            status TEXT NOT NULL,
            paid_date TEXT,
            paid_amount REAL,
            transaction_id INTEGER UNIQUE,
            notes TEXT,
            UNIQUE(bill_id, due_date),
            CHECK ((status = 'PAID') = (paid_amount IS NOT NULL AND transaction_id IS NOT NULL)),
            FOREIGN KEY(bill_id) REFERENCES bill(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id)
        );

        CREATE INDEX IF NOT EXISTS idx_bill_payment_due_date ON bill_payment(due_date);",
    )?;

    Ok(())
}

const SELECT_PAYMENT_FOR_USER: &str = "SELECT bill_payment.id, bill_id, due_date,
        bill_payment.amount, status, paid_date, paid_amount, transaction_id, notes
     FROM bill_payment INNER JOIN bill ON bill_payment.bill_id = bill.id";

/// Retrieve a payment of one of the user's bills.
///
/// # Errors
/// Returns an [Error::NotFound] if the payment does not exist or its bill belongs to another user.
pub fn get_bill_payment(
    user_id: UserId,
    payment_id: BillPaymentId,
    connection: &Connection,
) -> Result<BillPayment, Error> {
    connection
        .prepare(&format!(
            "{SELECT_PAYMENT_FOR_USER} WHERE bill_payment.id = ?1 AND bill.user_id = ?2"
        ))?
        .query_row((payment_id, user_id.as_i64()), map_payment_row)
        .map_err(|error| error.into())
}

/// Retrieve the payments of all of the user's bills, optionally only those
/// with `status`, ordered by due date.
pub fn get_bill_payments_for_user(
    user_id: UserId,
    status: Option<PaymentStatus>,
    connection: &Connection,
) -> Result<Vec<BillPayment>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_PAYMENT_FOR_USER} WHERE bill.user_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY due_date ASC, bill_payment.id ASC"
        ))?
        .query_map((user_id.as_i64(), status), map_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

pub(crate) fn map_payment_row(row: &Row) -> Result<BillPayment, rusqlite::Error> {
    Ok(BillPayment {
        id: row.get(0)?,
        bill_id: row.get(1)?,
        due_date: row.get(2)?,
        amount: row.get(3)?,
        status: row.get(4)?,
        paid_date: row.get(5)?,
        paid_amount: row.get(6)?,
        transaction_id: row.get(7)?,
        notes: row.get(8)?,
    })
}

#[cfg(test)]
mod classify_payment_status_tests {
    use time::macros::date;

    use crate::Error;

    use super::{PaymentStatus, classify_payment_status};

    const TODAY: time::Date = date!(2025 - 03 - 10);

    #[test]
    fn past_due_date_is_overdue() {
        assert_eq!(
            classify_payment_status(date!(2025 - 03 - 09), TODAY, PaymentStatus::Upcoming),
            PaymentStatus::Overdue
        );
    }

    #[test]
    fn due_today_is_due_soon() {
        assert_eq!(
            classify_payment_status(TODAY, TODAY, PaymentStatus::Upcoming),
            PaymentStatus::DueSoon
        );
    }

    #[test]
    fn due_soon_window_is_inclusive() {
        assert_eq!(
            classify_payment_status(date!(2025 - 03 - 17), TODAY, PaymentStatus::Upcoming),
            PaymentStatus::DueSoon
        );
        assert_eq!(
            classify_payment_status(date!(2025 - 03 - 18), TODAY, PaymentStatus::DueSoon),
            PaymentStatus::Upcoming
        );
    }

    #[test]
    fn paid_is_sticky() {
        assert_eq!(
            classify_payment_status(date!(2020 - 01 - 01), TODAY, PaymentStatus::Paid),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn parse_unknown_status_fails() {
        assert_eq!(
            "LATE".parse::<PaymentStatus>(),
            Err(Error::InvalidPaymentStatus("LATE".to_owned()))
        );
    }
}
