//! The string-keyed, JSON-valued persistence layer.
//!
//! Every collection in the app (users, controls, transactions, reset
//! requests) is stored as a JSON document under a well-known key. Components
//! receive a [KeyValueStore] rather than reaching for storage ambiently,
//! which keeps the domain logic testable against an in-memory store.

mod kv;
mod memory;
mod sqlite;

pub use kv::{KeyValueStore, read_or_default, write};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// The well-known keys under which the app's collections are stored.
pub(crate) mod keys {
    /// The list of registered users.
    pub const USERS: &str = "users";
    /// A map from financial control ID to that control's transaction list.
    pub const ALL_TRANSACTIONS: &str = "allTransactions";
    /// The flat transaction list written by versions that predate multiple
    /// financial controls. Read once and migrated into [ALL_TRANSACTIONS].
    pub const LEGACY_TRANSACTIONS: &str = "transactions";
    /// The list of financial controls (workspaces).
    pub const FINANCIAL_CONTROLS: &str = "financialControls";
    /// A map from email address to pending password reset request.
    pub const RESET_REQUESTS: &str = "resetRequests";
}
