//! Spending analytics: monthly totals, spending by category and trends.

mod aggregation;
mod summary;
mod transaction;

pub use summary::get_analytics_summary_endpoint;
