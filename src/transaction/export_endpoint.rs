//! Defines the route handler for downloading transactions as CSV.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState, Error,
    control::resolve_selected_control,
    internal_server_error::render_internal_server_error,
    store::SqliteStore,
    transaction::{
        Transaction, TransactionsQuery, filter_transactions, get_transactions, sort_transactions,
    },
};

/// The state needed for exporting transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the transactions.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ExportTransactionsState> for Key {
    fn from_ref(state: &ExportTransactionsState) -> Self {
        state.cookie_key.clone()
    }
}

fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["Date", "Description", "Category", "Type", "Amount"])?;

    for transaction in transactions {
        writer.write_record([
            transaction.date.to_string(),
            transaction.description.clone(),
            transaction.category.label().to_owned(),
            transaction.kind.label().to_owned(),
            format!("{:.2}", transaction.amount),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|error| error.into_error().into())
}

/// Download the active control's transactions as a CSV file.
///
/// The same query string as the transactions page applies, so the download
/// matches what is currently on screen.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    Query(query): Query<TransactionsQuery>,
    jar: PrivateCookieJar,
) -> Response {
    let transactions = {
        let mut store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_response();
            }
        };

        let result = resolve_selected_control(&mut *store, &jar)
            .and_then(|control| get_transactions(&mut *store, &control.id));

        match result {
            Ok(transactions) => transactions,
            Err(error) => return error.into_response(),
        }
    };

    let filtered = filter_transactions(&transactions, &query.filter());
    let sorted = sort_transactions(filtered, query.sort_key(), query.sort_direction());

    match write_csv(&sorted) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"transactions.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not write transaction CSV: {error}");
            render_internal_server_error(Default::default())
        }
    }
}

#[cfg(test)]
mod export_transactions_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::{Body, to_bytes},
        extract::{Query, State},
        http::{Response, header},
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        app_state::create_cookie_key,
        control::ensure_default_control,
        store::SqliteStore,
        test_utils::{assert_content_type, assert_status_ok, get_header},
        transaction::{
            Category, TransactionKind, TransactionsQuery, create_transaction,
            test_utils::new_transaction,
        },
    };

    use super::{ExportTransactionsState, export_transactions_endpoint};

    fn get_test_state() -> ExportTransactionsState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let store = SqliteStore::new(connection).expect("Could not create store");

        ExportTransactionsState {
            cookie_key: create_cookie_key("foobar"),
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn seed_transactions(state: &ExportTransactionsState) {
        let mut store = state.store.lock().unwrap();
        let control_id = ensure_default_control(&mut *store).unwrap()[0].id.clone();

        let entries = [
            (
                "Weekly shop",
                52.30,
                Category::Groceries,
                TransactionKind::Expense,
                date!(2024 - 01 - 10),
            ),
            (
                "Salary",
                1000.0,
                Category::Salary,
                TransactionKind::Income,
                date!(2024 - 01 - 15),
            ),
        ];

        for (description, amount, category, kind, date) in entries {
            create_transaction(
                &mut *store,
                &control_id,
                new_transaction(description, amount, category, kind, date),
            )
            .unwrap();
        }
    }

    async fn get_export(
        state: ExportTransactionsState,
        query: TransactionsQuery,
    ) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        export_transactions_endpoint(State(state), Query(query), jar).await
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        String::from_utf8(bytes.to_vec()).expect("response body was not UTF-8")
    }

    #[tokio::test]
    async fn export_produces_csv_attachment() {
        let state = get_test_state();
        seed_transactions(&state);

        let response = get_export(state, TransactionsQuery::default()).await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/csv; charset=utf-8");
        let disposition = get_header(&response, header::CONTENT_DISPOSITION.as_str());
        assert!(
            disposition.contains("transactions.csv"),
            "want attachment file name, got {disposition}"
        );

        let text = body_text(response).await;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Description,Category,Type,Amount");
        assert_eq!(lines.len(), 3);
        assert!(text.contains("2024-01-10,Weekly shop,Groceries,Expense,52.30"));
        assert!(text.contains("2024-01-15,Salary,Salary,Income,1000.00"));
    }

    #[tokio::test]
    async fn export_applies_the_page_filter() {
        let state = get_test_state();
        seed_transactions(&state);

        let response = get_export(
            state,
            TransactionsQuery {
                kind: Some("income".to_owned()),
                ..Default::default()
            },
        )
        .await;

        let text = body_text(response).await;
        assert!(text.contains("Salary"));
        assert!(!text.contains("Weekly shop"));
    }

    #[tokio::test]
    async fn export_of_empty_control_has_only_the_header() {
        let state = get_test_state();

        let response = get_export(state, TransactionsQuery::default()).await;

        let text = body_text(response).await;
        assert_eq!(text.trim(), "Date,Description,Category,Type,Amount");
    }
}
