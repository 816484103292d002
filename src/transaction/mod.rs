//! Transactions: income, expenses and transfers recorded against a bank.

mod core;
mod endpoints;
mod query;

pub use core::{
    Transaction, TransactionBuilder, TransactionType, create_transaction,
    create_transaction_table, delete_transaction, get_transaction,
};
pub(crate) use core::{insert_transaction, remove_transaction};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint,
};
pub use query::{TransactionFilter, list_transactions};
