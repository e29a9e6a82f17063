//! Defines the route handler for creating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error,
    control::resolve_selected_control,
    endpoints,
    store::SqliteStore,
    transaction::{NewTransaction, create_transaction, form::TransactionFormData},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the transactions.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<CreateTransactionState> for Key {
    fn from_ref(state: &CreateTransactionState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle transaction creation form submission.
///
/// The transaction is appended to the active control's list.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    jar: PrivateCookieJar,
    Form(data): Form<TransactionFormData>,
) -> Response {
    let result = {
        let mut store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_alert_response();
            }
        };

        resolve_selected_control(&mut *store, &jar).and_then(|control| {
            create_transaction(
                &mut *store,
                &control.id,
                NewTransaction {
                    description: data.description,
                    amount: data.amount,
                    category: data.category,
                    kind: data.kind,
                    date: data.date,
                },
            )
        })
    };

    match result {
        Ok(_) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            (),
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
