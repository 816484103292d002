//! Bank accounts and credit cards, including credit card billing cycles.

mod billing_cycle;
mod core;
mod endpoints;

pub use billing_cycle::{
    BillingCycle, CreditCardBillingConfig, days_until_due, generate_upcoming_cycles,
    get_current_billing_cycle, get_cycle_spending, is_date_in_cycle,
};
pub use core::{
    Bank, BankKind, NewBank, create_bank, create_bank_table, get_bank, get_banks_for_user,
};
pub use endpoints::{create_bank_endpoint, get_billing_cycle_endpoint, list_banks_endpoint};
