//! Budgets: spending limits per category that reset every week, month or year.

mod core;
mod endpoints;
mod period;
mod progress;

pub use core::{
    Budget, NewBudget, create_budget, create_budget_table, delete_budget, get_budget,
    get_budgets_for_user,
};
pub use endpoints::{
    create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint,
    get_budget_progress_endpoint, list_budgets_endpoint,
};
pub use period::{
    BudgetPeriod, BudgetStatus, PeriodRange, calculate_percent_used, get_budget_status,
    get_current_period_dates,
};
pub use progress::{BudgetProgress, get_budget_progress};
