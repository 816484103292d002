//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/labels/{label_id}', use [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to access categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to access bank accounts and credit cards.
pub const BANKS: &str = "/api/banks";
/// The route to get the current and upcoming billing cycles of a credit card.
pub const BILLING_CYCLE: &str = "/api/banks/{bank_id}/billing_cycle";
/// The route to access labels.
pub const LABELS: &str = "/api/labels";
/// The route to access a single label.
pub const LABEL: &str = "/api/labels/{label_id}";
/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to access budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to get the progress of the active budgets.
pub const BUDGET_PROGRESS: &str = "/api/budgets/progress";
/// The route to access recurring bills.
pub const BILLS: &str = "/api/bills";
/// The route to access a single recurring bill.
pub const BILL: &str = "/api/bills/{bill_id}";
/// The route to list bill payments.
pub const BILL_PAYMENTS: &str = "/api/bill_payments";
/// The route to generate upcoming bill payments and update their statuses.
pub const REFRESH_BILL_PAYMENTS: &str = "/api/bill_payments/refresh";
/// The route to mark a bill payment as paid.
pub const PAY_BILL_PAYMENT: &str = "/api/bill_payments/{payment_id}/pay";
/// The route to reverse a bill payment.
pub const UNPAY_BILL_PAYMENT: &str = "/api/bill_payments/{payment_id}/unpay";
/// The route to get the analytics summary.
pub const ANALYTICS_SUMMARY: &str = "/api/analytics/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
