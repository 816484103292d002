//! Creates payment instances for upcoming bill occurrences and keeps their
//! statuses in step with the calendar.

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error, UserId,
    bill::{Bill, PaymentStatus, classify_payment_status, get_active_bills_for_user},
};

/// Payments are created for every occurrence due within this many days of today.
pub const LOOKAHEAD_DAYS: i64 = 30;

/// The due dates that should have a payment as of `today`.
///
/// These are the occurrences due from `today` to [LOOKAHEAD_DAYS] days later,
/// and always the next occurrence on or after `today` so that bills that are
/// due less often than the lookahead still show their next payment. No due
/// date is after the bill's end date.
pub fn upcoming_due_dates(bill: &Bill, today: Date) -> Vec<Date> {
    let horizon = today + Duration::days(LOOKAHEAD_DAYS);
    let mut due_dates = Vec::new();

    for index in 0.. {
        let due_date = bill.frequency.occurrence(bill.start_date, index);

        if bill.end_date.is_some_and(|end_date| due_date > end_date) {
            break;
        }

        if due_date < today {
            continue;
        }

        if due_date > horizon && !due_dates.is_empty() {
            break;
        }

        due_dates.push(due_date);
    }

    due_dates
}

/// Make sure every active bill of the user has a payment for each of its
/// [upcoming_due_dates].
///
/// Payments that already exist for a due date are left alone, so calling this
/// repeatedly does not create duplicates. All inserts happen in one SQL transaction.
///
/// Returns the number of payments created.
pub fn ensure_upcoming_payments(
    user_id: UserId,
    today: Date,
    connection: &Connection,
) -> Result<usize, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let mut created = 0;

    {
        let mut insert = sql_transaction.prepare(
            "INSERT OR IGNORE INTO bill_payment (bill_id, due_date, amount, status)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        for bill in get_active_bills_for_user(user_id, &sql_transaction)? {
            for due_date in upcoming_due_dates(&bill, today) {
                let status = classify_payment_status(due_date, today, PaymentStatus::Upcoming);
                created += insert.execute((bill.id, due_date, bill.amount, status))?;
            }
        }
    }

    sql_transaction.commit()?;

    if created > 0 {
        tracing::debug!("Created {created} bill payments for user {user_id}");
    }

    Ok(created)
}

/// Reclassify every unpaid payment of the user's bills as of `today`.
///
/// Returns the number of payments whose status changed.
pub fn update_payment_statuses(
    user_id: UserId,
    today: Date,
    connection: &Connection,
) -> Result<usize, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let mut changed = 0;

    {
        let unpaid: Vec<(i64, Date, PaymentStatus)> = sql_transaction
            .prepare(
                "SELECT bill_payment.id, due_date, status
                 FROM bill_payment INNER JOIN bill ON bill_payment.bill_id = bill.id
                 WHERE bill.user_id = ?1 AND status != ?2",
            )?
            .query_map((user_id.as_i64(), PaymentStatus::Paid), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<_, rusqlite::Error>>()?;

        let mut update =
            sql_transaction.prepare("UPDATE bill_payment SET status = ?1 WHERE id = ?2")?;

        for (payment_id, due_date, status) in unpaid {
            let new_status = classify_payment_status(due_date, today, status);

            if new_status != status {
                changed += update.execute((new_status, payment_id))?;
            }
        }
    }

    sql_transaction.commit()?;

    Ok(changed)
}
