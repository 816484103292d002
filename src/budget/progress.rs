//! Compares actual spending against budgets for the current period.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId,
    budget::{
        Budget, BudgetStatus, PeriodRange, calculate_percent_used, get_budget_status,
        get_budgets_for_user, get_current_period_dates,
    },
    database_id::CategoryId,
    transaction::TransactionType,
};

/// A budget together with how much has been spent against it this period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub category_name: String,
    /// The dates that spending is counted over.
    pub period: PeriodRange,
    pub actual: f64,
    /// `budget.amount - actual`, negative when over budget.
    pub remaining: f64,
    pub percent_used: i64,
    pub status: BudgetStatus,
}

/// Sum the user's expenses in a category between `start` and `end` inclusive.
///
/// Income and transfers are not counted.
pub fn calculate_actual_spending(
    user_id: UserId,
    category_id: CategoryId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\"
             WHERE user_id = ?1 AND category_id = ?2 AND type = ?3 AND date BETWEEN ?4 AND ?5",
            (
                user_id.as_i64(),
                category_id,
                TransactionType::Expense,
                start,
                end,
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the progress of every budget that has not expired as of `today`.
pub fn get_budget_progress(
    user_id: UserId,
    today: Date,
    connection: &Connection,
) -> Result<Vec<BudgetProgress>, Error> {
    let mut category_name_query =
        connection.prepare("SELECT name FROM category WHERE id = ?1 AND user_id = ?2")?;

    get_budgets_for_user(user_id, connection)?
        .into_iter()
        .filter(|budget| !budget.is_expired(today))
        .map(|budget| -> Result<BudgetProgress, Error> {
            let period = get_current_period_dates(budget.period, budget.start_date, today);
            let actual = calculate_actual_spending(
                user_id,
                budget.category_id,
                period.start,
                period.end,
                connection,
            )?;
            let category_name: String = category_name_query
                .query_row((budget.category_id, user_id.as_i64()), |row| row.get(0))?;

            Ok(BudgetProgress {
                category_name,
                period,
                actual,
                remaining: budget.amount - actual,
                percent_used: calculate_percent_used(actual, budget.amount),
                status: get_budget_status(actual, budget.amount),
                budget,
            })
        })
        .collect()
}
