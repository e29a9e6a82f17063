//! Defines the route handler for updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
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
    transaction::{Transaction, form::TransactionFormData, update_transaction},
};

/// The state needed for updating a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the transactions.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<EditTransactionState> for Key {
    fn from_ref(state: &EditTransactionState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle transaction edit form submission via the PUT method.
///
/// Only the transaction with the ID in the URL is replaced, all other
/// records keep their position and contents.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    jar: PrivateCookieJar,
    Path(transaction_id): Path<String>,
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
            update_transaction(
                &mut *store,
                &control.id,
                Transaction {
                    id: transaction_id,
                    description: data.description.trim().to_owned(),
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

#[cfg(test)]
mod edit_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::{Path, State},
        http::{Response, StatusCode},
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        app_state::create_cookie_key,
        control::ensure_default_control,
        endpoints,
        store::SqliteStore,
        test_utils::assert_hx_redirect,
        transaction::{
            Category, TransactionKind, create_transaction, form::TransactionFormData,
            get_transactions, test_utils::new_transaction,
        },
    };

    use super::{EditTransactionState, edit_transaction_endpoint};

    fn get_test_state() -> EditTransactionState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let store = SqliteStore::new(connection).expect("Could not create store");

        EditTransactionState {
            cookie_key: create_cookie_key("foobar"),
            store: Arc::new(Mutex::new(store)),
        }
    }

    async fn new_edit_request(
        state: EditTransactionState,
        transaction_id: &str,
        data: TransactionFormData,
    ) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        edit_transaction_endpoint(State(state), jar, Path(transaction_id.to_owned()), Form(data))
            .await
    }

    #[tokio::test]
    async fn edit_transaction_replaces_record_in_place() {
        let state = get_test_state();
        let (control_id, transaction_id) = {
            let mut store = state.store.lock().unwrap();
            let control_id = ensure_default_control(&mut *store).unwrap()[0].id.clone();

            create_transaction(
                &mut *store,
                &control_id,
                new_transaction(
                    "Weekly shop",
                    52.30,
                    Category::Groceries,
                    TransactionKind::Expense,
                    date!(2024 - 01 - 10),
                ),
            )
            .unwrap();
            let target = create_transaction(
                &mut *store,
                &control_id,
                new_transaction(
                    "Bus pass",
                    35.0,
                    Category::Transport,
                    TransactionKind::Expense,
                    date!(2024 - 02 - 01),
                ),
            )
            .unwrap();

            (control_id, target.id)
        };
        let store = state.store.clone();

        let response = new_edit_request(
            state,
            &transaction_id,
            TransactionFormData {
                description: "Monthly bus pass".to_owned(),
                amount: 60.0,
                category: Category::Transport,
                kind: TransactionKind::Expense,
                date: date!(2024 - 02 - 01),
            },
        )
        .await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let mut store = store.lock().unwrap();
        let transactions = get_transactions(&mut *store, &control_id).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].description, "Weekly shop");
        assert_eq!(transactions[1].description, "Monthly bus pass");
        assert_eq!(transactions[1].amount, 60.0);
        assert_eq!(transactions[1].id, transaction_id);
    }

    #[tokio::test]
    async fn edit_missing_transaction_fails() {
        let state = get_test_state();

        let response = new_edit_request(
            state,
            "no-such-id",
            TransactionFormData {
                description: "Monthly bus pass".to_owned(),
                amount: 60.0,
                category: Category::Transport,
                kind: TransactionKind::Expense,
                date: date!(2024 - 02 - 01),
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
