use rusqlite::Connection;
use time::Date;

use crate::{
    UserId,
    bank::{BankKind, NewBank, create_bank},
    category::create_category,
    database_id::{BankId, CategoryId},
    db::initialize,
    transaction::{Transaction, TransactionType, create_transaction},
    user::create_user,
};

/// The rows every database test starts with.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TestData {
    pub user_id: UserId,
    /// A category named "Groceries".
    pub category_id: CategoryId,
    /// A plain bank account named "Everyday".
    pub bank_id: BankId,
}

/// Open an initialised in-memory database with one user, one category and one bank.
#[track_caller]
pub(crate) fn get_test_data() -> (Connection, TestData) {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");

    let user = create_user("Test", &connection).expect("Could not create test user");
    let category =
        create_category(user.id, "Groceries", &connection).expect("Could not create category");
    let bank = create_bank(
        user.id,
        NewBank {
            name: "Everyday".to_owned(),
            kind: BankKind::Bank,
            billing: None,
        },
        &connection,
    )
    .expect("Could not create bank");

    (
        connection,
        TestData {
            user_id: user.id,
            category_id: category.id,
            bank_id: bank.id,
        },
    )
}

/// Create a transaction in the test category.
#[track_caller]
pub(crate) fn insert_transaction(
    connection: &Connection,
    data: &TestData,
    bank_id: BankId,
    amount: f64,
    transaction_type: TransactionType,
    date: Date,
) -> Transaction {
    create_transaction(
        data.user_id,
        Transaction::build(amount, transaction_type, bank_id, date, "test transaction")
            .category_id(Some(data.category_id)),
        connection,
    )
    .expect("Could not create transaction")
}
