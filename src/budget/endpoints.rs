//! Route handlers for budgets.

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
    budget::{
        Budget, BudgetProgress, NewBudget, create_budget, delete_budget, get_budget,
        get_budget_progress, get_budgets_for_user,
    },
    database_id::BudgetId,
    endpoints::{self, format_endpoint},
    timezone::local_today,
};

/// The state needed for the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

pub async fn list_budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budgets_for_user(user_id, &connection).map(Json)
}

pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserId>,
    Json(new_budget): Json<NewBudget>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Budget>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let budget = create_budget(user_id, new_budget, &connection)?;
    tracing::info!("User {user_id} created budget {}", budget.id);
    let location = format_endpoint(endpoints::BUDGET, budget.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(budget)))
}

pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<Budget>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budget(user_id, budget_id, &connection).map(Json)
}

pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_budget(user_id, budget_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for the progress of the user's active budgets in the current period.
pub async fn get_budget_progress_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<BudgetProgress>>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    get_budget_progress(user_id, today, &connection).map(Json)
}
