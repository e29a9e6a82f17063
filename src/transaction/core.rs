//! Defines the core data model and store operations for transactions.
//!
//! Each financial control owns an independent, ordered list of transactions.
//! The lists live in a single JSON object under the `allTransactions` key,
//! keyed by control ID, and every mutation re-persists the affected list in
//! full.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    Error,
    control::ControlId,
    store::{KeyValueStore, keys, read_or_default, write},
};

use super::Category;

/// The unique identifier of a transaction within its control's list.
pub type TransactionId = String;

/// Whether a transaction brought money in or sent it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The lowercase identifier used in stored records and query strings.
    pub fn slug(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The human-readable label shown in tables and forms.
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(()),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, unique within its control.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned. Always greater than zero, the
    /// direction comes from [Transaction::kind].
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category: Category,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
}

/// The details needed to create a transaction. The ID is generated on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, must be greater than zero.
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category: Category,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
}

type TransactionsByControl = BTreeMap<ControlId, Vec<Transaction>>;

fn read_all(store: &dyn KeyValueStore) -> Result<TransactionsByControl, Error> {
    read_or_default(store, keys::ALL_TRANSACTIONS)
}

/// Get the transaction list for `control_id`, in insertion order.
///
/// If the per-control map has never been written but a flat `transactions`
/// list from a pre-workspace version exists, that list is migrated under
/// `control_id` and the legacy key removed.
///
/// # Errors
/// Returns an error if the store cannot be read or the migration cannot be
/// written back.
pub fn get_transactions(
    store: &mut dyn KeyValueStore,
    control_id: &str,
) -> Result<Vec<Transaction>, Error> {
    let mut all = read_all(store)?;

    if let Some(transactions) = all.remove(control_id) {
        return Ok(transactions);
    }

    if all.is_empty() && store.get(keys::ALL_TRANSACTIONS)?.is_none() {
        let legacy: Vec<Transaction> = read_or_default(store, keys::LEGACY_TRANSACTIONS)?;

        if !legacy.is_empty() {
            tracing::info!(
                "migrating {} legacy transactions under control {control_id}",
                legacy.len()
            );
            save_transactions(store, control_id, &legacy)?;
            store.remove(keys::LEGACY_TRANSACTIONS)?;

            return Ok(legacy);
        }
    }

    Ok(Vec::new())
}

/// Replace the transaction list for `control_id` with `transactions`.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn save_transactions(
    store: &mut dyn KeyValueStore,
    control_id: &str,
    transactions: &[Transaction],
) -> Result<(), Error> {
    let mut all = read_all(store)?;
    all.insert(control_id.to_owned(), transactions.to_vec());

    write(store, keys::ALL_TRANSACTIONS, &all)
}

/// Remove the entire transaction list for `control_id` from the store.
///
/// Used when a financial control is deleted. Removing a control with no
/// stored transactions is not an error.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn remove_control_transactions(
    store: &mut dyn KeyValueStore,
    control_id: &str,
) -> Result<(), Error> {
    let mut all = read_all(store)?;
    all.remove(control_id);

    write(store, keys::ALL_TRANSACTIONS, &all)
}

fn validate(description: &str, amount: f64) -> Result<(), Error> {
    if description.trim().is_empty() {
        return Err(Error::EmptyDescription);
    }

    if !(amount > 0.0) || !amount.is_finite() {
        return Err(Error::InvalidAmount(amount));
    }

    Ok(())
}

/// Append a new transaction to `control_id`'s list with a freshly generated
/// ID, and persist the list.
///
/// # Errors
/// Returns:
/// - [Error::EmptyDescription] if the description is blank,
/// - [Error::InvalidAmount] if the amount is not greater than zero,
/// - or an error if the store cannot be read or written.
pub fn create_transaction(
    store: &mut dyn KeyValueStore,
    control_id: &str,
    details: NewTransaction,
) -> Result<Transaction, Error> {
    validate(&details.description, details.amount)?;

    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        description: details.description.trim().to_owned(),
        amount: details.amount,
        category: details.category,
        kind: details.kind,
        date: details.date,
    };

    let mut transactions = get_transactions(store, control_id)?;
    transactions.push(transaction.clone());
    save_transactions(store, control_id, &transactions)?;

    Ok(transaction)
}

/// Get a single transaction from `control_id`'s list by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if no transaction has the given ID.
pub fn get_transaction(
    store: &mut dyn KeyValueStore,
    control_id: &str,
    transaction_id: &str,
) -> Result<Transaction, Error> {
    get_transactions(store, control_id)?
        .into_iter()
        .find(|transaction| transaction.id == transaction_id)
        .ok_or(Error::NotFound)
}

/// Replace the transaction matching `updated.id` in place, preserving the
/// order and contents of every other record.
///
/// # Errors
/// Returns:
/// - [Error::EmptyDescription] if the description is blank,
/// - [Error::InvalidAmount] if the amount is not greater than zero,
/// - [Error::UpdateMissingTransaction] if no transaction has the given ID,
/// - or an error if the store cannot be read or written.
pub fn update_transaction(
    store: &mut dyn KeyValueStore,
    control_id: &str,
    updated: Transaction,
) -> Result<Transaction, Error> {
    validate(&updated.description, updated.amount)?;

    let mut transactions = get_transactions(store, control_id)?;

    let Some(slot) = transactions
        .iter_mut()
        .find(|transaction| transaction.id == updated.id)
    else {
        return Err(Error::UpdateMissingTransaction);
    };

    *slot = updated.clone();
    save_transactions(store, control_id, &transactions)?;

    Ok(updated)
}

/// Remove the transaction with `transaction_id` from `control_id`'s list.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if no transaction has the given
/// ID, or an error if the store cannot be read or written.
pub fn delete_transaction(
    store: &mut dyn KeyValueStore,
    control_id: &str,
    transaction_id: &str,
) -> Result<(), Error> {
    let mut transactions = get_transactions(store, control_id)?;
    let original_len = transactions.len();

    transactions.retain(|transaction| transaction.id != transaction_id);

    if transactions.len() == original_len {
        return Err(Error::DeleteMissingTransaction);
    }

    save_transactions(store, control_id, &transactions)
}
