//! Route handlers for transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::{HeaderName, StatusCode, header::LOCATION},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserId,
    app_state::lock_connection,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    transaction::{
        Transaction, TransactionBuilder, TransactionFilter, create_transaction, delete_transaction,
        get_transaction, list_transactions,
    },
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing transactions, filtered by the query string.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(user_id, &filter, &connection).map(Json)
}

/// A route handler for getting a single transaction with its labels.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(user_id, transaction_id, &connection).map(Json)
}

/// A route handler for creating a new transaction.
///
/// The `Location` header of the response is the new transaction's route.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Transaction>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(user_id, builder, &connection)?;
    tracing::debug!("User {user_id} created transaction {}", transaction.id);
    let location = format_endpoint(endpoints::TRANSACTION, transaction.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(transaction),
    ))
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(user_id, transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
