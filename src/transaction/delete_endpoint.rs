//! Defines the route handler for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState, Error, control::resolve_selected_control, store::SqliteStore,
    transaction::delete_transaction,
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the transactions.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DeleteTransactionState> for Key {
    fn from_ref(state: &DeleteTransactionState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle requests to delete the transaction with the ID in the URL from the
/// active control.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    jar: PrivateCookieJar,
    Path(transaction_id): Path<String>,
) -> Response {
    let result = {
        let mut store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_alert_response();
            }
        };

        resolve_selected_control(&mut *store, &jar)
            .and_then(|control| delete_transaction(&mut *store, &control.id, &transaction_id))
    };

    match result {
        Ok(_) => StatusCode::OK.into_response(),
        Err(error) => error.into_alert_response(),
    }
}
