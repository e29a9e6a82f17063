//! Defines the route handler for updating a financial control.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error,
    control::core::{ControlDetails, update_control},
    endpoints,
    store::SqliteStore,
};

/// The state needed for updating a financial control.
#[derive(Debug, Clone)]
pub struct EditControlState {
    /// The key-value store holding the financial controls.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for EditControlState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// Handle control edit form submission via the PUT method.
pub async fn edit_control_endpoint(
    State(state): State<EditControlState>,
    Path(control_id): Path<String>,
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

        update_control(&mut *store, &control_id, details)
    };

    match result {
        Ok(_) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::CONTROLS_VIEW.to_owned()),
            (),
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
