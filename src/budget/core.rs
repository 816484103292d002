//! Defines the budget model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId,
    budget::BudgetPeriod,
    category::get_category,
    database_id::{BudgetId, CategoryId},
};

/// A spending limit for a category that resets every period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub period: BudgetPeriod,
    /// The amount that may be spent each period.
    pub amount: f64,
    /// The first day the budget applies.
    pub start_date: Date,
    /// The last day the budget applies, if it ever stops.
    pub end_date: Option<Date>,
}

impl Budget {
    /// Whether the budget stopped applying before `today`.
    pub fn is_expired(&self, today: Date) -> bool {
        self.end_date.is_some_and(|end_date| end_date < today)
    }
}

/// The data needed to create a [Budget].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category_id: CategoryId,
    pub period: BudgetPeriod,
    pub amount: f64,
    pub start_date: Date,
    #[serde(default)]
    pub end_date: Option<Date>,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            period TEXT NOT NULL,
            amount REAL NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user ON budget(user_id);",
    )?;

    Ok(())
}

/// Create a budget for one of the user's categories.
///
/// # Errors
/// Returns:
/// - [Error::NonPositiveAmount] if the amount is zero, negative or not finite,
/// - [Error::InvalidDateRange] if `end_date` is before `start_date`,
/// - [Error::InvalidForeignKey] if the category does not belong to the user,
/// - [Error::SqlError] for any other SQL error.
pub fn create_budget(
    user_id: UserId,
    new_budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    if !new_budget.amount.is_finite() || new_budget.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(new_budget.amount));
    }

    if let Some(end_date) = new_budget
        .end_date
        .filter(|end_date| *end_date < new_budget.start_date)
    {
        return Err(Error::InvalidDateRange {
            start: new_budget.start_date,
            end: end_date,
        });
    }

    get_category(user_id, new_budget.category_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidForeignKey,
        error => error,
    })?;

    connection
        .prepare(
            "INSERT INTO budget (user_id, category_id, period, amount, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, category_id, period, amount, start_date, end_date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_budget.category_id,
                new_budget.period,
                new_budget.amount,
                new_budget.start_date,
                new_budget.end_date,
            ),
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a budget owned by `user_id`.
pub fn get_budget(
    user_id: UserId,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, period, amount, start_date, end_date
             FROM budget WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((budget_id, user_id.as_i64()), map_budget_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's budgets, including expired ones, oldest first.
pub fn get_budgets_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, period, amount, start_date, end_date
             FROM budget WHERE user_id = ?1 ORDER BY start_date ASC, id ASC",
        )?
        .query_map((user_id.as_i64(),), map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Delete a budget owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn delete_budget(
    user_id: UserId,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        category_id: row.get(2)?,
        period: row.get(3)?,
        amount: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}
