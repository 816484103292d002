//! Database operations for labels and the transaction-label join table.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserId,
    database_id::{LabelId, TransactionId},
    label::{Label, LabelName},
};

/// Initialize the label table and indexes.
pub fn create_label_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS label (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_label_user ON label(user_id);",
    )?;

    Ok(())
}

/// Initialize the join table between transactions and labels.
///
/// The foreign keys have no `ON DELETE` action: rows must be
/// removed with [delete_labels_for_transaction] or [delete_label] before the
/// transaction or label they point to can be deleted.
pub fn create_transaction_label_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transaction_label (
            transaction_id INTEGER NOT NULL,
            label_id INTEGER NOT NULL,
            PRIMARY KEY(transaction_id, label_id),
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id),
            FOREIGN KEY(label_id) REFERENCES label(id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_label_label ON transaction_label(label_id);",
    )?;

    Ok(())
}

/// Create a label and return it with its generated ID.
///
/// # Errors
/// Returns an [Error::DuplicateName] if the user already has a label called `name`.
pub fn create_label(
    user_id: UserId,
    name: LabelName,
    connection: &Connection,
) -> Result<Label, Error> {
    connection
        .prepare(
            "INSERT INTO label (user_id, name) VALUES (?1, ?2)
             RETURNING id, user_id, name",
        )?
        .query_row((user_id.as_i64(), name.as_ref()), map_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateName(name.to_string()),
            error => error.into(),
        })
}

/// Retrieve a single label owned by `user_id`.
pub fn get_label(
    user_id: UserId,
    label_id: LabelId,
    connection: &Connection,
) -> Result<Label, Error> {
    connection
        .prepare("SELECT id, user_id, name FROM label WHERE id = ?1 AND user_id = ?2")?
        .query_row((label_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's labels ordered alphabetically by name.
pub fn get_labels_for_user(user_id: UserId, connection: &Connection) -> Result<Vec<Label>, Error> {
    connection
        .prepare("SELECT id, user_id, name FROM label WHERE user_id = ?1 ORDER BY name ASC")?
        .query_map((user_id.as_i64(),), map_row)?
        .map(|maybe_label| maybe_label.map_err(|error| error.into()))
        .collect()
}

/// Delete a label and every association between it and a transaction.
///
/// Both deletes happen in one SQL transaction.
///
/// # Errors
/// Returns an [Error::NotFound] if the label does not exist or belongs to another user.
pub fn delete_label(
    user_id: UserId,
    label_id: LabelId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    // Ownership check before touching the join table.
    get_label(user_id, label_id, &sql_transaction)?;

    let unlinked = sql_transaction.execute(
        "DELETE FROM transaction_label WHERE label_id = ?1",
        (label_id,),
    )?;
    sql_transaction.execute(
        "DELETE FROM label WHERE id = ?1 AND user_id = ?2",
        (label_id, user_id.as_i64()),
    )?;

    sql_transaction.commit()?;
    tracing::debug!("Deleted label {label_id} and unlinked it from {unlinked} transactions");

    Ok(())
}

/// Attach `label_ids` to a transaction.
///
/// The caller is responsible for wrapping this in an SQL transaction together
/// with the write that created `transaction_id`.
///
/// # Errors
/// Returns an [Error::InvalidForeignKey] if any label does not belong to `user_id`.
pub(crate) fn add_labels_to_transaction(
    user_id: UserId,
    transaction_id: TransactionId,
    label_ids: &[LabelId],
    connection: &Connection,
) -> Result<(), Error> {
    let mut insert = connection.prepare(
        "INSERT OR IGNORE INTO transaction_label (transaction_id, label_id)
         SELECT ?1, id FROM label WHERE id = ?2 AND user_id = ?3",
    )?;

    for &label_id in label_ids {
        let inserted = insert.execute((transaction_id, label_id, user_id.as_i64()))?;

        if inserted == 0 && !transaction_has_label(transaction_id, label_id, connection)? {
            return Err(Error::InvalidForeignKey);
        }
    }

    Ok(())
}

fn transaction_has_label(
    transaction_id: TransactionId,
    label_id: LabelId,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM transaction_label WHERE transaction_id = ?1 AND label_id = ?2
             )",
            (transaction_id, label_id),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The IDs of the labels attached to a transaction, in ascending order.
pub(crate) fn get_label_ids_for_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Vec<LabelId>, Error> {
    connection
        .prepare(
            "SELECT label_id FROM transaction_label
             WHERE transaction_id = ?1 ORDER BY label_id ASC",
        )?
        .query_map((transaction_id,), |row| row.get(0))?
        .map(|maybe_id| maybe_id.map_err(|error| error.into()))
        .collect()
}

/// Remove every label from a transaction, returning the number of rows removed.
pub(crate) fn delete_labels_for_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM transaction_label WHERE transaction_id = ?1",
            (transaction_id,),
        )
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<Label, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Label {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: LabelName::new_unchecked(&raw_name),
    })
}
