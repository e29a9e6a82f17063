//! Defines the route handler for the page for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::html;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    control::resolve_selected_control,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    internal_server_error::render_internal_server_error,
    navigation::NavBar,
    not_found::get_404_not_found_response,
    store::SqliteStore,
    transaction::{
        form::{TransactionFormDefaults, transaction_form_fields},
        get_transaction,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the transactions.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<EditTransactionPageState> for Key {
    fn from_ref(state: &EditTransactionPageState) -> Self {
        state.cookie_key.clone()
    }
}

/// Renders the page for editing a transaction in the active control.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    jar: PrivateCookieJar,
    Path(transaction_id): Path<String>,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire store lock: {error}");
            return render_internal_server_error(Default::default());
        }
    };

    let control = match resolve_selected_control(&mut *store, &jar) {
        Ok(control) => control,
        Err(error) => return error.into_response(),
    };

    let transaction = match get_transaction(&mut *store, &control.id, &transaction_id) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return get_404_not_found_response(),
        Err(error) => {
            tracing::error!("failed to retrieve transaction {transaction_id}: {error}");
            return render_internal_server_error(Default::default());
        }
    };

    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let edit_url = format_endpoint(endpoints::TRANSACTION, &transaction.id);
    let fields = transaction_form_fields(&TransactionFormDefaults {
        kind: transaction.kind,
        amount: Some(transaction.amount),
        category: Some(transaction.category),
        date: transaction.date,
        description: Some(&transaction.description),
        max_date: OffsetDateTime::now_utc().date(),
    });

    let content = html! {
        (nav_bar)
        (dollar_input_styles())

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold" { "Edit Transaction" }

            form
                hx-put=(edit_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
            }
        }
    };

    base("Edit Transaction", &[], &content).into_response()
}
