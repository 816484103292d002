//! Recurring bills, the payments generated for them, and paying those payments.

mod core;
mod endpoints;
mod generator;
mod payment;
mod processor;

pub use core::{
    Bill, Frequency, NewBill, create_bill, create_bill_table, get_active_bills_for_user,
    get_bill, get_bills_for_user, set_bill_active,
};
pub use endpoints::{
    create_bill_endpoint, get_bill_endpoint, list_bill_payments_endpoint, list_bills_endpoint,
    pay_bill_payment_endpoint, refresh_bill_payments_endpoint, unpay_bill_payment_endpoint,
    update_bill_endpoint,
};
pub use generator::{ensure_upcoming_payments, update_payment_statuses};
pub use payment::{
    BillPayment, PaymentStatus, classify_payment_status, create_bill_payment_table,
    get_bill_payment, get_bill_payments_for_user,
};
pub use processor::{MarkBillPaid, PaidBill, mark_bill_as_paid, unmark_bill_payment};
