//! Database queries for retrieving transaction data for analytics.
//!
//! This module provides a simplified transaction view for aggregation,
//! containing only the fields needed for grouping by month and category.

use std::ops::RangeInclusive;

use rusqlite::Connection;
use time::Date;

use crate::{Error, UserId, database_id::CategoryId, transaction::TransactionType};

/// The category name used for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A simplified transaction view for analytics.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsTransaction {
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub date: Date,
    pub category_id: Option<CategoryId>,
    /// The category's name, or [UNCATEGORIZED_LABEL].
    pub category_name: String,
}

/// Gets the user's transactions and their category names within a date range.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transactions_in_date_range(
    user_id: UserId,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<AnalyticsTransaction>, Error> {
    let query = format!(
        "SELECT
            t.amount,
            t.type,
            t.date,
            t.category_id,
            COALESCE(category.name, '{UNCATEGORIZED_LABEL}') AS category_name
        FROM \"transaction\" t
        LEFT JOIN category ON category.id = t.category_id
        WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3
        ORDER BY t.date ASC"
    );

    connection
        .prepare(&query)?
        .query_map(
            (user_id.as_i64(), date_range.start(), date_range.end()),
            |row| {
                Ok(AnalyticsTransaction {
                    amount: row.get(0)?,
                    transaction_type: row.get(1)?,
                    date: row.get(2)?,
                    category_id: row.get(3)?,
                    category_name: row.get(4)?,
                })
            },
        )?
        .collect::<Result<Vec<AnalyticsTransaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}
