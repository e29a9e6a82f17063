//! Defines the route handler for switching the active financial control.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error,
    control::{core::get_control, selection::set_selected_control},
    endpoints,
    store::SqliteStore,
};

/// The state needed for switching the active financial control.
#[derive(Debug, Clone)]
pub struct SelectControlState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the financial controls.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for SelectControlState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SelectControlState> for Key {
    fn from_ref(state: &SelectControlState) -> Self {
        state.cookie_key.clone()
    }
}

/// Make the control with the ID in the URL the active one and send the
/// client to its dashboard.
pub async fn select_control_endpoint(
    State(state): State<SelectControlState>,
    jar: PrivateCookieJar,
    Path(control_id): Path<String>,
) -> Response {
    let result = {
        let store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_alert_response();
            }
        };

        get_control(&*store, &control_id)
    };

    match result {
        Ok(control) => {
            let jar = set_selected_control(jar, &control.id);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                jar,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod select_control_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Body,
        extract::{Path, State},
        http::{Response, StatusCode},
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;

    use crate::{
        app_state::create_cookie_key,
        control::core::{ControlDetails, create_control},
        endpoints,
        store::SqliteStore,
        test_utils::assert_hx_redirect,
    };

    use super::{SelectControlState, select_control_endpoint};

    fn get_test_state() -> SelectControlState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let store = SqliteStore::new(connection).expect("Could not create store");

        SelectControlState {
            cookie_key: create_cookie_key("foobar"),
            store: Arc::new(Mutex::new(store)),
        }
    }

    async fn new_select_request(state: SelectControlState, control_id: &str) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        select_control_endpoint(State(state), jar, Path(control_id.to_owned())).await
    }

    #[tokio::test]
    async fn select_control_sets_cookie_and_redirects() {
        let state = get_test_state();
        let control_id = {
            let mut store = state.store.lock().unwrap();
            create_control(
                &mut *store,
                ControlDetails {
                    name: "Household".to_owned(),
                    description: String::new(),
                    color: String::new(),
                },
            )
            .unwrap()
            .id
        };

        let response = new_select_request(state, &control_id).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert!(
            response.headers().contains_key("set-cookie"),
            "want a selection cookie to be set"
        );
    }

    #[tokio::test]
    async fn select_unknown_control_fails() {
        let state = get_test_state();

        let response = new_select_request(state, "no-such-id").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
