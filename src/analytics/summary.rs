//! Combines the aggregators into the analytics summary for a range of months.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, UserId,
    analytics::{
        aggregation::{
            CategorySpending, MonthlyTotals, Trend, aggregate_by_month, calculate_trend,
            spending_by_category,
        },
        transaction::get_transactions_in_date_range,
    },
    app_state::lock_connection,
    calendar::{add_months, clamped_date, month_bounds},
    timezone::local_today,
};

/// The number of months summarised when the request does not specify one.
const DEFAULT_MONTHS: u32 = 6;

/// The largest number of months that can be summarised in one request.
const MAX_MONTHS: u32 = 60;

/// Income, expenses and spending habits over a range of months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    /// The share of income that was not spent in percent, 0 without income.
    pub savings_rate: f64,
    /// One entry per month in the range, including months without transactions.
    pub monthly: Vec<MonthlyTotals>,
    pub categories: Vec<CategorySpending>,
    /// This month's expenses compared with last month's.
    pub expense_trend: Trend,
}

/// The first and last day of the `months` calendar months that end with the
/// month containing `today`.
fn summary_window(months: u32, today: Date) -> (Date, Date) {
    let months_back = months.max(1) as i32 - 1;
    let (year, month) = add_months(today.year(), today.month(), -months_back);
    let (_, end) = month_bounds(today);

    (clamped_date(year, month, 1), end)
}

/// Summarise the user's transactions over the last `months` calendar months,
/// including the current month.
///
/// # Errors
/// Returns [Error::SqlError] if the transactions cannot be queried.
pub fn get_analytics_summary(
    user_id: UserId,
    months: u32,
    today: Date,
    connection: &Connection,
) -> Result<AnalyticsSummary, Error> {
    let (start, end) = summary_window(months, today);
    let transactions = get_transactions_in_date_range(user_id, start..=end, connection)?;

    let with_activity = aggregate_by_month(&transactions);
    let mut monthly = Vec::new();
    let mut month = start;

    while month <= end {
        let totals = with_activity
            .iter()
            .find(|totals| totals.month == month)
            .cloned()
            .unwrap_or_else(|| MonthlyTotals::empty(month));
        monthly.push(totals);

        let (year, next_month) = add_months(month.year(), month.month(), 1);
        month = clamped_date(year, next_month, 1);
    }

    let total_income: f64 = monthly.iter().map(|totals| totals.income).sum();
    let total_expenses: f64 = monthly.iter().map(|totals| totals.expenses).sum();
    let net = total_income - total_expenses;
    let savings_rate = if total_income > 0.0 {
        net / total_income * 100.0
    } else {
        0.0
    };

    let current_expenses = monthly.last().map_or(0.0, |totals| totals.expenses);
    let previous_expenses = monthly
        .iter()
        .rev()
        .nth(1)
        .map_or(0.0, |totals| totals.expenses);

    Ok(AnalyticsSummary {
        total_income,
        total_expenses,
        net,
        savings_rate,
        categories: spending_by_category(&transactions),
        expense_trend: calculate_trend(current_expenses, previous_expenses),
        monthly,
    })
}

/// The state needed for the analytics endpoint.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub months: Option<u32>,
}

/// A route handler for the analytics summary. `months` is clamped to 1 to 60.
pub async fn get_analytics_summary_endpoint(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsSummary>, Error> {
    let months = query.months.unwrap_or(DEFAULT_MONTHS).clamp(1, MAX_MONTHS);
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    get_analytics_summary(user_id, months, today, &connection).map(Json)
}
