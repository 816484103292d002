//! Labels for tagging transactions independently of their category.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_label, create_label_table, create_transaction_label_table, delete_label, get_label,
    get_labels_for_user,
};
pub(crate) use db::{
    add_labels_to_transaction, delete_labels_for_transaction, get_label_ids_for_transaction,
};
pub use domain::{Label, LabelData, LabelName};
pub use endpoints::{
    create_label_endpoint, delete_label_endpoint, get_label_endpoint, list_labels_endpoint,
};
