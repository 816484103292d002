//! Database setup and helpers shared by the model modules.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    bank::create_bank_table,
    bill::{create_bill_payment_table, create_bill_table},
    budget::create_budget_table,
    category::create_category_table,
    label::{create_label_table, create_transaction_label_table},
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Implement [rusqlite::types::ToSql] and [rusqlite::types::FromSql] for an
/// enum that is stored as its text name.
///
/// The enum must have an `as_str` method and implement [std::str::FromStr]
/// with [crate::Error] as the error type.
macro_rules! sql_text_enum {
    ($name:ty) => {
        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error: $crate::Error| {
                        rusqlite::types::FromSqlError::Other(Box::new(error))
                    })
            }
        }
    };
}

pub(crate) use sql_text_enum;

/// Create all of the application's tables if they do not already exist.
///
/// Tables are created in one exclusive transaction so a half initialised
/// database is never left behind.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_bank_table(&transaction)?;
    create_label_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_transaction_label_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_bill_table(&transaction)?;
    create_bill_payment_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
