//! Defines the route handler for deleting a financial control.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState, Error,
    control::{core::delete_control, selection::set_selected_control},
    store::SqliteStore,
};

/// The state needed for deleting a financial control.
#[derive(Debug, Clone)]
pub struct DeleteControlState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the financial controls.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for DeleteControlState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DeleteControlState> for Key {
    fn from_ref(state: &DeleteControlState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle requests to delete the financial control with the ID in the URL.
///
/// The control's transactions are deleted with it. The selection cookie is
/// pointed at the first remaining control so the user never lands in a
/// deleted workspace.
pub async fn delete_control_endpoint(
    State(state): State<DeleteControlState>,
    jar: PrivateCookieJar,
    Path(control_id): Path<String>,
) -> Response {
    let result = {
        let mut store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_alert_response();
            }
        };

        delete_control(&mut *store, &control_id)
    };

    match result {
        Ok(remaining_id) => {
            let jar = set_selected_control(jar, &remaining_id);

            (StatusCode::OK, jar).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
