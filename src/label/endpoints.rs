//! Route handlers for labels.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::{HeaderName, StatusCode, header::LOCATION},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserId,
    app_state::lock_connection,
    database_id::LabelId,
    endpoints::{self, format_endpoint},
    label::{Label, LabelData, create_label, delete_label, get_label, get_labels_for_user},
};

/// The state needed for the label endpoints.
#[derive(Debug, Clone)]
pub struct LabelState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LabelState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the current user's labels.
pub async fn list_labels_endpoint(
    State(state): State<LabelState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Label>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_labels_for_user(user_id, &connection).map(Json)
}

/// A route handler for getting one of the current user's labels.
pub async fn get_label_endpoint(
    State(state): State<LabelState>,
    Extension(user_id): Extension<UserId>,
    Path(label_id): Path<LabelId>,
) -> Result<Json<Label>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_label(user_id, label_id, &connection).map(Json)
}

/// A route handler for creating a new label.
///
/// The `Location` header of the response is the new label's route.
pub async fn create_label_endpoint(
    State(state): State<LabelState>,
    Extension(user_id): Extension<UserId>,
    Json(data): Json<LabelData>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Label>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let label = create_label(user_id, data.name, &connection)?;
    let location = format_endpoint(endpoints::LABEL, label.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(label)))
}

/// A route handler for deleting a label, which also removes it from every transaction.
pub async fn delete_label_endpoint(
    State(state): State<LabelState>,
    Extension(user_id): Extension<UserId>,
    Path(label_id): Path<LabelId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_label(user_id, label_id, &connection).inspect_err(|error| {
        if !matches!(error, Error::NotFound) {
            tracing::error!("Could not delete label {label_id}: {error}");
        }
    })?;

    Ok(StatusCode::NO_CONTENT)
}
