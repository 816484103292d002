//! Route handlers for bills and their payments.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::{HeaderName, StatusCode, header::LOCATION},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, UserId,
    app_state::lock_connection,
    bill::{
        Bill, BillPayment, MarkBillPaid, NewBill, PaidBill, PaymentStatus, create_bill,
        ensure_upcoming_payments, get_bill, get_bill_payment, get_bill_payments_for_user,
        get_bills_for_user, mark_bill_as_paid, set_bill_active, unmark_bill_payment,
        update_payment_statuses,
    },
    database_id::{BankId, BillId, BillPaymentId},
    endpoints::{self, format_endpoint},
    timezone::local_today,
};

/// The state needed for the bill endpoints.
#[derive(Debug, Clone)]
pub struct BillState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BillState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

pub async fn list_bills_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Bill>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_bills_for_user(user_id, &connection).map(Json)
}

pub async fn create_bill_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
    Json(new_bill): Json<NewBill>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Bill>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let bill = create_bill(user_id, new_bill, &connection)?;
    tracing::info!("User {user_id} created bill {}", bill.id);
    let location = format_endpoint(endpoints::BILL, bill.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(bill)))
}

pub async fn get_bill_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
    Path(bill_id): Path<BillId>,
) -> Result<Json<Bill>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_bill(user_id, bill_id, &connection).map(Json)
}

/// The request body for updating a bill.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateBillData {
    /// Inactive bills get no new payments when payments are refreshed.
    pub is_active: bool,
}

/// A route handler for activating or deactivating a bill.
pub async fn update_bill_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
    Path(bill_id): Path<BillId>,
    Json(data): Json<UpdateBillData>,
) -> Result<Json<Bill>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    set_bill_active(user_id, bill_id, data.is_active, &connection)?;
    tracing::info!(
        "User {user_id} set bill {bill_id} active to {}",
        data.is_active
    );

    get_bill(user_id, bill_id, &connection).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct BillPaymentQuery {
    pub status: Option<PaymentStatus>,
}

pub async fn list_bill_payments_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<BillPaymentQuery>,
) -> Result<Json<Vec<BillPayment>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_bill_payments_for_user(user_id, query.status, &connection).map(Json)
}

/// The response body of the refresh endpoint.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RefreshSummary {
    /// The number of payments created for upcoming due dates.
    pub created: usize,
    /// The number of payments whose status changed.
    pub updated: usize,
}

/// A route handler that generates upcoming payments and brings the status
/// of existing payments up to date.
pub async fn refresh_bill_payments_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<RefreshSummary>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let created = ensure_upcoming_payments(user_id, today, &connection)?;
    let updated = update_payment_statuses(user_id, today, &connection)?;

    Ok(Json(RefreshSummary { created, updated }))
}

/// The request body for paying a bill.
#[derive(Debug, Serialize, Deserialize)]
pub struct PayBillData {
    pub bank_id: BankId,
    /// Defaults to the amount due.
    #[serde(default)]
    pub paid_amount: Option<f64>,
    /// Defaults to today.
    #[serde(default)]
    pub paid_date: Option<Date>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn pay_bill_payment_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
    Path(payment_id): Path<BillPaymentId>,
    Json(data): Json<PayBillData>,
) -> Result<Json<PaidBill>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let paid_amount = match data.paid_amount {
        Some(paid_amount) => paid_amount,
        None => get_bill_payment(user_id, payment_id, &connection)?.amount,
    };

    mark_bill_as_paid(
        MarkBillPaid {
            payment_id,
            user_id,
            paid_amount,
            paid_date: data.paid_date.unwrap_or(today),
            bank_id: data.bank_id,
            notes: data.notes,
        },
        &connection,
    )
    .map(Json)
}

/// The request body for reversing a bill payment.
#[derive(Debug, Serialize, Deserialize)]
pub struct UnpayBillData {
    /// Whether to delete the transaction that recorded the payment.
    #[serde(default = "default_delete_transaction")]
    pub delete_transaction: bool,
}

fn default_delete_transaction() -> bool {
    true
}

pub async fn unpay_bill_payment_endpoint(
    State(state): State<BillState>,
    Extension(user_id): Extension<UserId>,
    Path(payment_id): Path<BillPaymentId>,
    Json(data): Json<UnpayBillData>,
) -> Result<Json<BillPayment>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    unmark_bill_payment(
        payment_id,
        user_id,
        data.delete_transaction,
        today,
        &connection,
    )
    .map(Json)
}
