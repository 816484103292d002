//! Defines the core data models and database queries for transactions.

use std::str::FromStr;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId,
    bank::get_bank,
    category::get_category,
    database_id::{BankId, CategoryId, LabelId, TransactionId},
    db::sql_text_enum,
    label::{
        add_labels_to_transaction, delete_labels_for_transaction, get_label_ids_for_transaction,
    },
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned, spent or moved between the user's own accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
            TransactionType::Transfer => "TRANSFER",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            "TRANSFER" => Ok(TransactionType::Transfer),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

sql_text_enum!(TransactionType);

/// An expense, income or transfer recorded against one of the user's banks.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// The amount of money, always positive. The direction is given by `transaction_type`.
    pub amount: f64,
    /// Whether the transaction is income, an expense or a transfer.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category the transaction belongs to, transfers usually have none.
    pub category_id: Option<CategoryId>,
    /// The bank or credit card the money moved through.
    pub bank_id: BankId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// The labels attached to the transaction.
    pub labels: Vec<LabelId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        transaction_type: TransactionType,
        bank_id: BankId,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            transaction_type,
            bank_id,
            date,
            description: description.to_owned(),
            category_id: None,
            notes: None,
            labels: Vec::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// This is also the request body for creating a transaction, so the optional
/// fields may be omitted from the JSON.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::{Transaction, TransactionType};
///
/// let date = date!(2025 - 01 - 15);
/// let builder = Transaction::build(45.99, TransactionType::Expense, bank_id, date, "Coffee")
///     .category_id(Some(eating_out_id))
///     .notes(Some("With Sam".to_owned()));
/// ```
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// The positive amount of money that moved.
    pub amount: f64,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Must refer to a bank owned by the same user.
    pub bank_id: BankId,

    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable description of the transaction.
    pub description: String,

    /// Must refer to a category owned by the same user.
    #[serde(default)]
    pub category_id: Option<CategoryId>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Must refer to labels owned by the same user.
    #[serde(default)]
    pub labels: Vec<LabelId>,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the notes for the transaction.
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Set the labels for the transaction.
    pub fn labels(mut self, labels: Vec<LabelId>) -> Self {
        self.labels = labels;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction and attach its labels in one SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero, negative or not finite,
/// - [Error::InvalidForeignKey] if the bank, category or a label does not belong to `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let transaction = insert_transaction(user_id, builder, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(transaction)
}

/// Insert a transaction and its labels without opening an SQL transaction.
///
/// For callers that need the insert to be part of a larger atomic write.
pub(crate) fn insert_transaction(
    user_id: UserId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.amount.is_finite() || builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    // Both references must be owned by the user, not just exist.
    get_bank(user_id, builder.bank_id, connection).map_err(not_found_as_invalid_reference)?;
    if let Some(category_id) = builder.category_id {
        get_category(user_id, category_id, connection).map_err(not_found_as_invalid_reference)?;
    }

    let mut transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, amount, type, category_id, bank_id, date, description, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, amount, type, category_id, bank_id, date, description, notes",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.amount,
                builder.transaction_type,
                builder.category_id,
                builder.bank_id,
                builder.date,
                builder.description,
                builder.notes,
            ),
            map_transaction_row,
        )?;

    add_labels_to_transaction(user_id, transaction.id, &builder.labels, connection)?;
    transaction.labels = get_label_ids_for_transaction(transaction.id, connection)?;

    Ok(transaction)
}

fn not_found_as_invalid_reference(error: Error) -> Error {
    match error {
        Error::NotFound => Error::InvalidForeignKey,
        error => error,
    }
}

/// Retrieve a transaction owned by `user_id`, including its labels.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let mut transaction = connection
        .prepare(
            "SELECT id, user_id, amount, type, category_id, bank_id, date, description, notes
             FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_transaction_row)?;

    transaction.labels = get_label_ids_for_transaction(id, connection)?;

    Ok(transaction)
}

/// Delete a transaction owned by `user_id` together with its label links.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - [Error::LinkedToBillPayment] if the transaction records a paid bill,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    user_id: UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    get_transaction(user_id, id, &sql_transaction)?;

    let is_bill_payment: bool = sql_transaction.query_row(
        "SELECT EXISTS(SELECT 1 FROM bill_payment WHERE transaction_id = ?1)",
        (id,),
        |row| row.get(0),
    )?;

    if is_bill_payment {
        return Err(Error::LinkedToBillPayment);
    }

    remove_transaction(id, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(())
}

/// Delete a transaction row and its label links without any ownership checks.
///
/// Any bill payment pointing at the transaction must be updated first.
pub(crate) fn remove_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    delete_labels_for_transaction(id, connection)?;
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            type TEXT NOT NULL,
            category_id INTEGER,
            bank_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            notes TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
            FOREIGN KEY(bank_id) REFERENCES bank(id) ON UPDATE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_date
            ON \"transaction\"(category_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction without its labels.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        amount: row.get(2)?,
        transaction_type: row.get(3)?,
        category_id: row.get(4)?,
        bank_id: row.get(5)?,
        date: row.get(6)?,
        description: row.get(7)?,
        notes: row.get(8)?,
        labels: Vec::new(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
