//! Transaction data aggregation for analytics.
//!
//! Provides functions to total transactions by month, group expenses by
//! category, and compare two periods to find the direction of a trend.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    analytics::transaction::AnalyticsTransaction, calendar::month_bounds,
    database_id::CategoryId, transaction::TransactionType,
};

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// The first day of the month.
    pub month: Date,
    pub income: f64,
    pub expenses: f64,
    /// `income - expenses`.
    pub net: f64,
}

impl MonthlyTotals {
    /// A month with no income or expenses.
    pub fn empty(month: Date) -> Self {
        Self {
            month,
            income: 0.0,
            expenses: 0.0,
            net: 0.0,
        }
    }
}

/// Total expenses in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category_id: Option<CategoryId>,
    pub category_name: String,
    pub total: f64,
    /// The share of all expenses, from 0 to 100.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// How a value changed from one period to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// The change relative to the previous value in percent, 0 when the
    /// previous value is 0.
    pub percent_change: f64,
}

/// Totals income and expenses by month.
///
/// Transfers move money between the user's own accounts, so they are neither
/// income nor expenses and are skipped.
///
/// # Returns
/// One entry per month that has at least one income or expense, in
/// chronological order.
pub fn aggregate_by_month(transactions: &[AnalyticsTransaction]) -> Vec<MonthlyTotals> {
    let mut totals: BTreeMap<Date, MonthlyTotals> = BTreeMap::new();

    for transaction in transactions {
        let (month, _) = month_bounds(transaction.date);
        let entry = match transaction.transaction_type {
            TransactionType::Transfer => continue,
            _ => totals
                .entry(month)
                .or_insert_with(|| MonthlyTotals::empty(month)),
        };

        match transaction.transaction_type {
            TransactionType::Income => entry.income += transaction.amount,
            TransactionType::Expense => entry.expenses += transaction.amount,
            TransactionType::Transfer => {}
        }

        entry.net = entry.income - entry.expenses;
    }

    totals.into_values().collect()
}

/// Groups expenses by category.
///
/// # Returns
/// One entry per category with expenses, largest total first. Categories
/// with the same total are ordered by name.
pub fn spending_by_category(transactions: &[AnalyticsTransaction]) -> Vec<CategorySpending> {
    let mut totals: HashMap<Option<CategoryId>, (&str, f64)> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
    {
        totals
            .entry(transaction.category_id)
            .or_insert((transaction.category_name.as_str(), 0.0))
            .1 += transaction.amount;
    }

    let total_expenses: f64 = totals.values().map(|(_, total)| total).sum();

    let mut spending: Vec<CategorySpending> = totals
        .into_iter()
        .map(|(category_id, (category_name, total))| CategorySpending {
            category_id,
            category_name: category_name.to_owned(),
            total,
            percentage: if total_expenses > 0.0 {
                total / total_expenses * 100.0
            } else {
                0.0
            },
        })
        .collect();

    spending.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });

    spending
}

/// Compares `current` against `previous`.
pub fn calculate_trend(current: f64, previous: f64) -> Trend {
    let direction = if current > previous {
        TrendDirection::Up
    } else if current < previous {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };

    let percent_change = if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous.abs() * 100.0
    };

    Trend {
        direction,
        percent_change,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        analytics::{
            aggregation::{
                MonthlyTotals, TrendDirection, aggregate_by_month, calculate_trend,
                spending_by_category,
            },
            transaction::{AnalyticsTransaction, UNCATEGORIZED_LABEL},
        },
        transaction::TransactionType,
    };

    fn create_test_transaction(
        amount: f64,
        transaction_type: TransactionType,
        date: time::Date,
        category: Option<(i64, &str)>,
    ) -> AnalyticsTransaction {
        AnalyticsTransaction {
            amount,
            transaction_type,
            date,
            category_id: category.map(|(id, _)| id),
            category_name: category
                .map(|(_, name)| name)
                .unwrap_or(UNCATEGORIZED_LABEL)
                .to_owned(),
        }
    }

    #[test]
    fn aggregate_by_month_splits_income_and_expenses() {
        let transactions = vec![
            create_test_transaction(100.0, TransactionType::Income, date!(2024 - 02 - 15), None),
            create_test_transaction(30.0, TransactionType::Expense, date!(2024 - 01 - 20), None),
            create_test_transaction(50.0, TransactionType::Income, date!(2024 - 01 - 10), None),
            create_test_transaction(20.0, TransactionType::Expense, date!(2024 - 02 - 01), None),
        ];

        let result = aggregate_by_month(&transactions);

        assert_eq!(
            result,
            vec![
                MonthlyTotals {
                    month: date!(2024 - 01 - 01),
                    income: 50.0,
                    expenses: 30.0,
                    net: 20.0,
                },
                MonthlyTotals {
                    month: date!(2024 - 02 - 01),
                    income: 100.0,
                    expenses: 20.0,
                    net: 80.0,
                },
            ]
        );
    }

    #[test]
    fn aggregate_by_month_ignores_transfers() {
        let transactions = vec![create_test_transaction(
            100.0,
            TransactionType::Transfer,
            date!(2024 - 02 - 15),
            None,
        )];

        assert!(aggregate_by_month(&transactions).is_empty());
    }

    #[test]
    fn aggregate_by_month_handles_empty_input() {
        assert!(aggregate_by_month(&[]).is_empty());
    }

    #[test]
    fn spending_by_category_sorts_by_total() {
        let food = Some((1, "Food"));
        let rent = Some((2, "Rent"));
        let transactions = vec![
            create_test_transaction(50.0, TransactionType::Expense, date!(2024 - 01 - 15), food),
            create_test_transaction(300.0, TransactionType::Expense, date!(2024 - 01 - 01), rent),
            create_test_transaction(50.0, TransactionType::Expense, date!(2024 - 01 - 20), food),
            create_test_transaction(100.0, TransactionType::Expense, date!(2024 - 01 - 21), None),
            // Income is not spending.
            create_test_transaction(900.0, TransactionType::Income, date!(2024 - 01 - 21), food),
        ];

        let result = spending_by_category(&transactions);

        let summary: Vec<(&str, f64, f64)> = result
            .iter()
            .map(|spending| {
                (
                    spending.category_name.as_str(),
                    spending.total,
                    spending.percentage,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Rent", 300.0, 60.0),
                ("Food", 100.0, 20.0),
                (UNCATEGORIZED_LABEL, 100.0, 20.0),
            ]
        );
    }

    #[test]
    fn spending_by_category_without_expenses_is_empty() {
        let transactions = vec![create_test_transaction(
            10.0,
            TransactionType::Income,
            date!(2024 - 01 - 21),
            None,
        )];

        assert!(spending_by_category(&transactions).is_empty());
    }

    #[test]
    fn trend_up() {
        let trend = calculate_trend(150.0, 100.0);

        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.percent_change, 50.0);
    }

    #[test]
    fn trend_down() {
        let trend = calculate_trend(75.0, 100.0);

        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.percent_change, -25.0);
    }

    #[test]
    fn trend_from_zero_has_no_percent_change() {
        let trend = calculate_trend(100.0, 0.0);

        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.percent_change, 0.0);
    }

    #[test]
    fn trend_flat() {
        let trend = calculate_trend(42.0, 42.0);

        assert_eq!(trend.direction, TrendDirection::Flat);
        assert_eq!(trend.percent_change, 0.0);
    }
}
