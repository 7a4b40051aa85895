//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The feed that publishes each user's latest transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod events_endpoint;
mod feed;
mod form;
mod query;
mod transactions_page;

pub use core::{
    INCOME_CATEGORY, Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, list_transactions,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_new_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use events_endpoint::{TRANSACTIONS_EVENT, get_transaction_events};
pub use feed::{Snapshot, TransactionFeed};
pub use form::TransactionForm;
pub use query::TransactionListQuery;
pub use transactions_page::get_transactions_page;
