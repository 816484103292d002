//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;
/// Database identifier for a category.
pub type CategoryId = DatabaseId;
/// Database identifier for a bank account or credit card.
pub type BankId = DatabaseId;
/// Database identifier for a label.
pub type LabelId = DatabaseId;
/// Database identifier for a budget.
pub type BudgetId = DatabaseId;
/// Database identifier for a recurring bill.
pub type BillId = DatabaseId;
/// Database identifier for a single bill payment instance.
pub type BillPaymentId = DatabaseId;
