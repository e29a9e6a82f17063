//! Defines the route handler for the page for editing a financial control.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, Error,
    control::{core::get_control, form::control_form_fields},
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base},
    internal_server_error::render_internal_server_error,
    navigation::NavBar,
    not_found::get_404_not_found_response,
    store::SqliteStore,
};

/// The state needed for the edit control page.
#[derive(Debug, Clone)]
pub struct EditControlPageState {
    /// The key-value store holding the financial controls.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for EditControlPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// Renders the page for editing a financial control.
pub async fn get_edit_control_page(
    State(state): State<EditControlPageState>,
    Path(control_id): Path<String>,
) -> Response {
    let store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire store lock: {error}");
            return render_internal_server_error(Default::default());
        }
    };

    let control = match get_control(&*store, &control_id) {
        Ok(control) => control,
        Err(Error::NotFound) => return get_404_not_found_response(),
        Err(error) => {
            tracing::error!("failed to retrieve control {control_id}: {error}");
            return render_internal_server_error(Default::default());
        }
    };

    let nav_bar = NavBar::new(endpoints::EDIT_CONTROL_VIEW).into_html();
    let edit_url = format_endpoint(endpoints::CONTROL, &control.id);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold" { "Edit Control" }

            form
                hx-put=(edit_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (control_form_fields(&control.name, &control.description, &control.color))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
            }
        }
    };

    base("Edit Control", &[], &content).into_response()
}
