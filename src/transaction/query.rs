//! Filtered transaction listing.

use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId,
    database_id::{BankId, CategoryId, LabelId},
    label::get_label_ids_for_transaction,
    transaction::{Transaction, TransactionType, core::map_transaction_row},
};

/// Criteria for listing transactions. Every field is optional and the
/// criteria that are set are combined with AND.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Earliest date, inclusive.
    pub start_date: Option<Date>,
    /// Latest date, inclusive.
    pub end_date: Option<Date>,
    pub category_id: Option<CategoryId>,
    pub bank_id: Option<BankId>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Only transactions carrying this label.
    pub label_id: Option<LabelId>,
}

/// List the user's transactions that match `filter`, newest first.
///
/// Transactions on the same date are ordered by descending ID so the order
/// is stable.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn list_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let user_id = user_id.as_i64();
    let mut clauses = vec!["user_id = ?"];
    let mut params: Vec<&dyn ToSql> = vec![&user_id];

    if let Some(start_date) = &filter.start_date {
        clauses.push("date >= ?");
        params.push(start_date);
    }

    if let Some(end_date) = &filter.end_date {
        clauses.push("date <= ?");
        params.push(end_date);
    }

    if let Some(category_id) = &filter.category_id {
        clauses.push("category_id = ?");
        params.push(category_id);
    }

    if let Some(bank_id) = &filter.bank_id {
        clauses.push("bank_id = ?");
        params.push(bank_id);
    }

    if let Some(transaction_type) = &filter.transaction_type {
        clauses.push("type = ?");
        params.push(transaction_type);
    }

    if let Some(label_id) = &filter.label_id {
        clauses.push("id IN (SELECT transaction_id FROM transaction_label WHERE label_id = ?)");
        params.push(label_id);
    }

    let query = format!(
        "SELECT id, user_id, amount, type, category_id, bank_id, date, description, notes \
         FROM \"transaction\" WHERE {} ORDER BY date DESC, id DESC",
        clauses.join(" AND ")
    );

    let mut transactions = connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()?;

    for transaction in &mut transactions {
        transaction.labels = get_label_ids_for_transaction(transaction.id, connection)?;
    }

    Ok(transactions)
}

#[cfg(test)]
mod list_transactions_tests {
    use time::macros::date;

    use crate::{
        label::{LabelName, create_label},
        test_utils::{get_test_data, insert_transaction},
        transaction::{Transaction, TransactionType, create_transaction},
        user::create_user,
    };

    use super::{TransactionFilter, list_transactions};

    fn amounts(transactions: &[Transaction]) -> Vec<f64> {
        transactions.iter().map(|transaction| transaction.amount).collect()
    }

    #[test]
    fn empty_filter_returns_all_of_users_transactions_newest_first() {
        let (conn, data) = get_test_data();
        let other_user = create_user("Other", &conn).unwrap();
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            1.0,
            TransactionType::Expense,
            date!(2025 - 01 - 01),
        );
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            2.0,
            TransactionType::Income,
            date!(2025 - 01 - 03),
        );
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            3.0,
            TransactionType::Expense,
            date!(2025 - 01 - 03),
        );

        let got = list_transactions(data.user_id, &TransactionFilter::default(), &conn).unwrap();
        let other = list_transactions(other_user.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(amounts(&got), vec![3.0, 2.0, 1.0]);
        assert!(other.is_empty());
    }

    #[test]
    fn filters_by_inclusive_date_range_and_type() {
        let (conn, data) = get_test_data();
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            1.0,
            TransactionType::Expense,
            date!(2025 - 01 - 01),
        );
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            2.0,
            TransactionType::Expense,
            date!(2025 - 01 - 31),
        );
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            3.0,
            TransactionType::Income,
            date!(2025 - 01 - 15),
        );
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            4.0,
            TransactionType::Expense,
            date!(2025 - 02 - 01),
        );

        let filter = TransactionFilter {
            start_date: Some(date!(2025 - 01 - 01)),
            end_date: Some(date!(2025 - 01 - 31)),
            transaction_type: Some(TransactionType::Expense),
            ..Default::default()
        };
        let got = list_transactions(data.user_id, &filter, &conn).unwrap();

        assert_eq!(amounts(&got), vec![2.0, 1.0]);
    }

    #[test]
    fn filters_by_label() {
        let (conn, data) = get_test_data();
        let label = create_label(data.user_id, LabelName::new_unchecked("Trip"), &conn).unwrap();
        insert_transaction(
            &conn,
            &data,
            data.bank_id,
            1.0,
            TransactionType::Expense,
            date!(2025 - 01 - 01),
        );
        let labelled = create_transaction(
            data.user_id,
            Transaction::build(
                2.0,
                TransactionType::Expense,
                data.bank_id,
                date!(2025 - 01 - 02),
                "",
            )
                .labels(vec![label.id]),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter {
            label_id: Some(label.id),
            ..Default::default()
        };
        let got = list_transactions(data.user_id, &filter, &conn).unwrap();

        assert_eq!(got, vec![labelled]);
    }

    #[test]
    fn deserializes_from_query_string_names() {
        let filter: TransactionFilter =
            serde_json::from_str(r#"{"start_date": "2025-03-01", "type": "INCOME"}"#).unwrap();

        assert_eq!(
            filter,
            TransactionFilter {
                start_date: Some(date!(2025 - 03 - 01)),
                transaction_type: Some(TransactionType::Income),
                ..Default::default()
            }
        );
    }
}
