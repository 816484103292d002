//! Route handlers for banks, credit cards and their billing cycles.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, UserId,
    app_state::lock_connection,
    bank::{
        Bank, BillingCycle, NewBank, create_bank, days_until_due, generate_upcoming_cycles,
        get_bank, get_banks_for_user, get_current_billing_cycle, get_cycle_spending,
        is_date_in_cycle,
    },
    database_id::BankId,
    timezone::local_today,
};

/// The state needed for the bank endpoints.
#[derive(Debug, Clone)]
pub struct BankState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The current statement of a credit card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardCycleSummary {
    pub bank: Bank,
    pub current_cycle: BillingCycle,
    /// False when today falls in a gap between two cycles.
    pub today_in_cycle: bool,
    /// Expenses charged to the card during the current cycle.
    pub cycle_spending: f64,
    pub days_until_due: i64,
    /// Cycles starting this month and the following months.
    pub upcoming_cycles: Vec<BillingCycle>,
}

/// Summarise the billing cycle of a credit card as of `today`.
///
/// # Errors
/// Returns an [Error::NotFound] if the card does not belong to `user_id` and
/// an [Error::NotACreditCard] if the account has no billing cycle.
pub fn get_credit_card_cycle_summary(
    user_id: UserId,
    bank_id: BankId,
    today: Date,
    upcoming: usize,
    connection: &Connection,
) -> Result<CreditCardCycleSummary, Error> {
    let bank = get_bank(user_id, bank_id, connection)?;
    let config = bank.billing.ok_or(Error::NotACreditCard)?;

    let current_cycle = get_current_billing_cycle(&config, today);
    let cycle_spending = get_cycle_spending(user_id, bank_id, &current_cycle, connection)?;

    Ok(CreditCardCycleSummary {
        days_until_due: days_until_due(&current_cycle, today),
        today_in_cycle: is_date_in_cycle(today, &current_cycle),
        upcoming_cycles: generate_upcoming_cycles(&config, today, upcoming),
        bank,
        current_cycle,
        cycle_spending,
    })
}

/// A route handler for listing the current user's banks and credit cards.
pub async fn list_banks_endpoint(
    State(state): State<BankState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Bank>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_banks_for_user(user_id, &connection).map(Json)
}

/// A route handler for creating a bank or credit card.
pub async fn create_bank_endpoint(
    State(state): State<BankState>,
    Extension(user_id): Extension<UserId>,
    Json(new_bank): Json<NewBank>,
) -> Result<(StatusCode, Json<Bank>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let bank = create_bank(user_id, new_bank, &connection)?;
    tracing::info!("User {user_id} created {:?} account {}", bank.kind, bank.id);

    Ok((StatusCode::CREATED, Json(bank)))
}

/// Query parameters for the billing cycle endpoint.
#[derive(Debug, Deserialize)]
pub struct BillingCycleQuery {
    /// How many cycles to list starting from this month.
    pub upcoming: Option<usize>,
}

const DEFAULT_UPCOMING_CYCLES: usize = 3;
const MAX_UPCOMING_CYCLES: usize = 24;

/// A route handler for the current billing cycle of a credit card.
pub async fn get_billing_cycle_endpoint(
    State(state): State<BankState>,
    Extension(user_id): Extension<UserId>,
    Path(bank_id): Path<BankId>,
    Query(query): Query<BillingCycleQuery>,
) -> Result<Json<CreditCardCycleSummary>, Error> {
    let today = local_today(&state.local_timezone)?;
    let upcoming = query
        .upcoming
        .unwrap_or(DEFAULT_UPCOMING_CYCLES)
        .min(MAX_UPCOMING_CYCLES);
    let connection = lock_connection(&state.db_connection)?;

    get_credit_card_cycle_summary(user_id, bank_id, today, upcoming, &connection).map(Json)
}
