//! Marks bill payments as paid, and reverses that, together with the expense
//! transaction that records the payment.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId,
    bank::get_bank,
    bill::{BillPayment, PaymentStatus, get_bill, get_bill_payment, payment::map_payment_row},
    database_id::{BankId, BillPaymentId},
    transaction::{Transaction, TransactionType, insert_transaction, remove_transaction},
};

/// The details of a bill payment that the user has made.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkBillPaid {
    pub payment_id: BillPaymentId,
    pub user_id: UserId,
    pub paid_amount: f64,
    pub paid_date: Date,
    /// The bank the bill was paid from.
    pub bank_id: BankId,
    pub notes: Option<String>,
}

/// The result of paying a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaidBill {
    pub payment: BillPayment,
    pub transaction: Transaction,
}

const RETURNING_PAYMENT: &str = "RETURNING id, bill_id, due_date, amount, status,
    paid_date, paid_amount, transaction_id, notes";

/// Mark a bill payment as paid and record the expense.
///
/// The expense transaction is created in the bill's category with the
/// description "Bill payment: <bill name>". Creating the transaction and
/// updating the payment happen in one SQL transaction, so either both are
/// saved or neither is.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the payment or the bank does not belong to the user,
/// - [Error::AlreadyPaid] if the payment has already been paid,
/// - [Error::NonPositiveAmount] if the paid amount is not positive,
/// - [Error::SqlError] for any other SQL error.
pub fn mark_bill_as_paid(
    details: MarkBillPaid,
    connection: &Connection,
) -> Result<PaidBill, Error> {
    let MarkBillPaid {
        payment_id,
        user_id,
        paid_amount,
        paid_date,
        bank_id,
        notes,
    } = details;

    let sql_transaction = connection.unchecked_transaction()?;

    let payment = get_bill_payment(user_id, payment_id, &sql_transaction)?;

    if payment.status == PaymentStatus::Paid {
        return Err(Error::AlreadyPaid);
    }

    let bill = get_bill(user_id, payment.bill_id, &sql_transaction)?;
    get_bank(user_id, bank_id, &sql_transaction)?;

    let transaction = insert_transaction(
        user_id,
        Transaction::build(
            paid_amount,
            TransactionType::Expense,
            bank_id,
            paid_date,
            &format!("Bill payment: {}", bill.name),
        )
        .category_id(Some(bill.category_id))
        .notes(notes.clone()),
        &sql_transaction,
    )?;

    let payment = sql_transaction
        .prepare(&format!(
            "UPDATE bill_payment
             SET status = ?1, paid_date = ?2, paid_amount = ?3, transaction_id = ?4,
                 notes = COALESCE(?5, notes)
             WHERE id = ?6
             {RETURNING_PAYMENT}"
        ))?
        .query_row(
            (
                PaymentStatus::Paid,
                paid_date,
                paid_amount,
                transaction.id,
                notes,
                payment_id,
            ),
            map_payment_row,
        )?;

    sql_transaction.commit()?;
    tracing::info!(
        "User {user_id} paid bill payment {payment_id} with transaction {}",
        transaction.id
    );

    Ok(PaidBill {
        payment,
        transaction,
    })
}

/// Reverse a bill payment so it is unpaid again.
///
/// The payment becomes [PaymentStatus::Overdue] if its due date is before
/// `today`, otherwise [PaymentStatus::Upcoming]. If `delete_transaction` is
/// true, the expense transaction that recorded the payment is deleted,
/// otherwise it is kept as an ordinary transaction. Both steps happen in one
/// SQL transaction.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the payment does not belong to the user,
/// - [Error::NotPaid] if the payment has not been paid,
/// - [Error::SqlError] for any other SQL error.
pub fn unmark_bill_payment(
    payment_id: BillPaymentId,
    user_id: UserId,
    delete_transaction: bool,
    today: Date,
    connection: &Connection,
) -> Result<BillPayment, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let payment = get_bill_payment(user_id, payment_id, &sql_transaction)?;

    if payment.status != PaymentStatus::Paid {
        return Err(Error::NotPaid);
    }

    let status = if payment.due_date < today {
        PaymentStatus::Overdue
    } else {
        PaymentStatus::Upcoming
    };

    // The link must be cleared before the transaction it points to can be deleted.
    let unpaid = sql_transaction
        .prepare(&format!(
            "UPDATE bill_payment
             SET status = ?1, paid_date = NULL, paid_amount = NULL, transaction_id = NULL
             WHERE id = ?2
             {RETURNING_PAYMENT}"
        ))?
        .query_row((status, payment_id), map_payment_row)?;

    if let Some(transaction_id) = payment.transaction_id.filter(|_| delete_transaction) {
        remove_transaction(transaction_id, &sql_transaction)?;
    }

    sql_transaction.commit()?;
    tracing::info!("User {user_id} unmarked bill payment {payment_id}");

    Ok(unpaid)
}

#[cfg(test)]
mod bill_processor_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        bill::{
            BillPayment, Frequency, NewBill, PaymentStatus, create_bill, ensure_upcoming_payments,
            get_bill_payment, update_payment_statuses,
        },
        test_utils::{TestData, get_test_data},
        transaction::{
            TransactionFilter, TransactionType, delete_transaction, get_transaction,
            list_transactions,
        },
        user::create_user,
    };

    use super::{MarkBillPaid, mark_bill_as_paid, unmark_bill_payment};

    /// Create a monthly bill of 500 due on the 5th and its March payment.
    fn create_payment(connection: &Connection, data: &TestData) -> BillPayment {
        create_bill(
            data.user_id,
            NewBill {
                name: "Rent".to_owned(),
                amount: 500.0,
                category_id: data.category_id,
                bank_id: None,
                frequency: Frequency::Monthly,
                start_date: date!(2025 - 01 - 05),
                end_date: None,
            },
            connection,
        )
        .unwrap();
        ensure_upcoming_payments(data.user_id, date!(2025 - 03 - 01), connection).unwrap();

        get_bill_payment(data.user_id, 1, connection).unwrap()
    }

    fn mark_paid_details(payment: &BillPayment, data: &TestData) -> MarkBillPaid {
        MarkBillPaid {
            payment_id: payment.id,
            user_id: data.user_id,
            paid_amount: payment.amount,
            paid_date: date!(2025 - 03 - 04),
            bank_id: data.bank_id,
            notes: Some("Paid early".to_owned()),
        }
    }

    fn count_transactions(connection: &Connection, data: &TestData) -> usize {
        list_transactions(data.user_id, &TransactionFilter::default(), connection)
            .unwrap()
            .len()
    }

    #[test]
    fn mark_paid_creates_one_expense_transaction() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);

        let paid = mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        assert_eq!(paid.payment.status, PaymentStatus::Paid);
        assert_eq!(paid.payment.transaction_id, Some(paid.transaction.id));
        assert_eq!(paid.payment.paid_amount, Some(500.0));
        assert_eq!(paid.payment.paid_date, Some(date!(2025 - 03 - 04)));
        assert_eq!(paid.payment.notes.as_deref(), Some("Paid early"));
        assert_eq!(paid.transaction.amount, 500.0);
        assert_eq!(paid.transaction.transaction_type, TransactionType::Expense);
        assert_eq!(paid.transaction.category_id, Some(data.category_id));
        assert_eq!(paid.transaction.description, "Bill payment: Rent");
        assert_eq!(count_transactions(&conn, &data), 1);
    }

    #[test]
    fn mark_paid_twice_fails_with_already_paid() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        let result = mark_bill_as_paid(mark_paid_details(&payment, &data), &conn);

        assert_eq!(result, Err(Error::AlreadyPaid));
        assert_eq!(count_transactions(&conn, &data), 1);
    }

    #[test]
    fn mark_paid_for_other_user_fails_and_writes_nothing() {
        let (conn, data) = get_test_data();
        let other_user = create_user("Other", &conn).unwrap();
        let payment = create_payment(&conn, &data);
        let mut details = mark_paid_details(&payment, &data);
        details.user_id = other_user.id;

        let result = mark_bill_as_paid(details, &conn);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(
            get_bill_payment(data.user_id, payment.id, &conn),
            Ok(payment)
        );
        assert_eq!(count_transactions(&conn, &data), 0);
    }

    #[test]
    fn mark_paid_with_other_users_bank_fails() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        let mut details = mark_paid_details(&payment, &data);
        details.bank_id += 100;

        assert_eq!(mark_bill_as_paid(details, &conn), Err(Error::NotFound));
    }

    #[test]
    fn mark_paid_with_invalid_amount_leaves_payment_unpaid() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        let mut details = mark_paid_details(&payment, &data);
        details.paid_amount = -1.0;

        let result = mark_bill_as_paid(details, &conn);

        assert_eq!(result, Err(Error::NonPositiveAmount(-1.0)));
        assert_eq!(
            get_bill_payment(data.user_id, payment.id, &conn),
            Ok(payment)
        );
    }

    #[test]
    fn paid_payment_transaction_cannot_be_deleted_directly() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        let paid = mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        assert_eq!(
            delete_transaction(data.user_id, paid.transaction.id, &conn),
            Err(Error::LinkedToBillPayment)
        );
    }

    #[test]
    fn status_update_does_not_touch_paid_payments() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        let changed = update_payment_statuses(data.user_id, date!(2025 - 04 - 01), &conn).unwrap();

        assert_eq!(changed, 0);
        assert_eq!(
            get_bill_payment(data.user_id, payment.id, &conn).unwrap().status,
            PaymentStatus::Paid
        );
    }

    #[test]
    fn unmark_with_delete_removes_transaction_and_sets_overdue() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        let paid = mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        let unpaid =
            unmark_bill_payment(payment.id, data.user_id, true, date!(2025 - 03 - 06), &conn)
                .unwrap();

        assert_eq!(unpaid.status, PaymentStatus::Overdue);
        assert_eq!(unpaid.paid_date, None);
        assert_eq!(unpaid.paid_amount, None);
        assert_eq!(unpaid.transaction_id, None);
        assert_eq!(
            get_transaction(data.user_id, paid.transaction.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn unmark_before_due_date_sets_upcoming() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        let unpaid =
            unmark_bill_payment(payment.id, data.user_id, true, date!(2025 - 03 - 05), &conn)
                .unwrap();

        assert_eq!(unpaid.status, PaymentStatus::Upcoming);
    }

    #[test]
    fn unmark_without_delete_keeps_transaction() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);
        let paid = mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        unmark_bill_payment(
            payment.id,
            data.user_id,
            false,
            date!(2025 - 03 - 06),
            &conn,
        )
            .unwrap();

        assert!(get_transaction(data.user_id, paid.transaction.id, &conn).is_ok());
        // Now unlinked, the transaction can be deleted like any other.
        assert_eq!(
            delete_transaction(data.user_id, paid.transaction.id, &conn),
            Ok(())
        );
    }

    #[test]
    fn unmark_unpaid_payment_fails_with_not_paid() {
        let (conn, data) = get_test_data();
        let payment = create_payment(&conn, &data);

        let result =
            unmark_bill_payment(payment.id, data.user_id, true, date!(2025 - 03 - 06), &conn);

        assert_eq!(result, Err(Error::NotPaid));
    }

    #[test]
    fn unmark_other_users_payment_fails_with_not_found() {
        let (conn, data) = get_test_data();
        let other_user = create_user("Other", &conn).unwrap();
        let payment = create_payment(&conn, &data);
        mark_bill_as_paid(mark_paid_details(&payment, &data), &conn).unwrap();

        let result = unmark_bill_payment(
            payment.id,
            other_user.id,
            true,
            date!(2025 - 03 - 06),
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(count_transactions(&conn, &data), 1);
    }
}
