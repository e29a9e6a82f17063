//! Defines the route handler for creating a financial control.

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
    control::{core::ControlDetails, core::create_control, selection::set_selected_control},
    endpoints,
    store::SqliteStore,
};

/// The state needed for creating a financial control.
#[derive(Debug, Clone)]
pub struct CreateControlState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the financial controls.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for CreateControlState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<CreateControlState> for Key {
    fn from_ref(state: &CreateControlState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle control creation form submission.
///
/// The newly created control becomes the active one.
pub async fn create_control_endpoint(
    State(state): State<CreateControlState>,
    jar: PrivateCookieJar,
    Form(details): Form<ControlDetails>,
) -> Response {
    let result = {
        let mut store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_alert_response();
            }
        };

        create_control(&mut *store, details)
    };

    match result {
        Ok(control) => {
            let jar = set_selected_control(jar, &control.id);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::CONTROLS_VIEW.to_owned()),
                jar,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
