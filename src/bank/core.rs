//! Defines the bank account model and its database queries.

use std::str::FromStr;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserId,
    bank::billing_cycle::CreditCardBillingConfig,
    database_id::BankId,
    db::sql_text_enum,
};

/// Whether an account is an ordinary bank account or a credit card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BankKind {
    Bank,
    CreditCard,
}

impl BankKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankKind::Bank => "BANK",
            BankKind::CreditCard => "CREDIT_CARD",
        }
    }
}

impl FromStr for BankKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BANK" => Ok(BankKind::Bank),
            "CREDIT_CARD" => Ok(BankKind::CreditCard),
            other => Err(Error::InvalidBankKind(other.to_owned())),
        }
    }
}

sql_text_enum!(BankKind);

/// A bank account or credit card that transactions are made against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: BankId,
    pub user_id: UserId,
    pub name: String,
    pub kind: BankKind,
    /// Only credit cards have a billing cycle.
    pub billing: Option<CreditCardBillingConfig>,
}

/// The data needed to create a [Bank].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBank {
    pub name: String,
    pub kind: BankKind,
    #[serde(default)]
    pub billing: Option<CreditCardBillingConfig>,
}

pub fn create_bank_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS bank (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            cycle_start_day INTEGER,
            cycle_end_day INTEGER,
            due_day INTEGER,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_bank_user ON bank(user_id);",
    )?;

    Ok(())
}

/// Create a bank account or credit card for `user_id`.
///
/// # Errors
/// Returns:
/// - [Error::EmptyName] if the name is blank,
/// - [Error::MissingBillingConfig] for a credit card without a billing config,
/// - [Error::UnexpectedBillingConfig] for a bank account with a billing config,
/// - [Error::DuplicateName] if the user already has an account with that name,
/// - [Error::SqlError] for any other SQL error.
pub fn create_bank(
    user_id: UserId,
    new_bank: NewBank,
    connection: &Connection,
) -> Result<Bank, Error> {
    let name = new_bank.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    match (new_bank.kind, new_bank.billing) {
        (BankKind::CreditCard, None) => return Err(Error::MissingBillingConfig),
        (BankKind::Bank, Some(_)) => return Err(Error::UnexpectedBillingConfig),
        _ => {}
    }

    let billing = new_bank.billing;

    connection
        .prepare(
            "INSERT INTO bank (user_id, name, kind, cycle_start_day, cycle_end_day, due_day)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, name, kind, cycle_start_day, cycle_end_day, due_day",
        )?
        .query_row(
            (
                user_id.as_i64(),
                name,
                new_bank.kind,
                billing.map(|config| config.cycle_start_day()),
                billing.map(|config| config.cycle_end_day()),
                billing.map(|config| config.due_day()),
            ),
            map_bank_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateName(name.to_owned()),
            error => error.into(),
        })
}

/// Retrieve a bank owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the bank does not exist or belongs to another user.
pub fn get_bank(user_id: UserId, bank_id: BankId, connection: &Connection) -> Result<Bank, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, cycle_start_day, cycle_end_day, due_day
             FROM bank WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((bank_id, user_id.as_i64()), map_bank_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's banks and credit cards ordered by name.
pub fn get_banks_for_user(user_id: UserId, connection: &Connection) -> Result<Vec<Bank>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, cycle_start_day, cycle_end_day, due_day
             FROM bank WHERE user_id = ?1 ORDER BY name ASC",
        )?
        .query_map((user_id.as_i64(),), map_bank_row)?
        .map(|maybe_bank| maybe_bank.map_err(|error| error.into()))
        .collect()
}

fn map_bank_row(row: &Row) -> Result<Bank, rusqlite::Error> {
    let cycle_start_day: Option<u8> = row.get(4)?;
    let cycle_end_day: Option<u8> = row.get(5)?;
    let due_day: Option<u8> = row.get(6)?;

    let billing = match (cycle_start_day, cycle_end_day, due_day) {
        (Some(start), Some(end), Some(due)) => Some(
            CreditCardBillingConfig::new(start, end, due).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Integer,
                    Box::new(error),
                )
            })?,
        ),
        _ => None,
    };

    Ok(Bank {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        kind: row.get(3)?,
        billing,
    })
}
