//! Transactions: the income and expense records of a financial control.
//!
//! This module contains everything related to transactions:
//! - The [Transaction] model, its [Category] set, and the store operations
//! - Filtering and sorting for the list view
//! - Route handlers for the transaction pages, endpoints, and CSV export

mod category;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod export_endpoint;
mod filter;
pub(crate) mod form;
mod new_transaction_page;
mod transactions_page;

pub(crate) use category::{ALL_CATEGORIES, Category};
pub(crate) use core::{
    NewTransaction, Transaction, TransactionKind, create_transaction, delete_transaction,
    get_transaction, get_transactions, remove_control_transactions, update_transaction,
};
pub(crate) use create_endpoint::create_transaction_endpoint;
pub(crate) use delete_endpoint::delete_transaction_endpoint;
pub(crate) use edit_endpoint::edit_transaction_endpoint;
pub(crate) use edit_page::get_edit_transaction_page;
pub(crate) use export_endpoint::export_transactions_endpoint;
pub(crate) use filter::{
    SortDirection, SortKey, TransactionFilter, filter_transactions, sort_transactions,
};
pub(crate) use new_transaction_page::get_new_transaction_page;
pub(crate) use transactions_page::{TransactionsQuery, get_transactions_page};

#[cfg(test)]
pub(crate) use core::test_utils;
