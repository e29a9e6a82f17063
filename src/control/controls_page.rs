//! Displays the financial controls and which one is active.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    control::{
        core::{FinancialControl, ensure_default_control},
        selection::resolve_selected_control,
    },
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    store::SqliteStore,
};

/// The state needed for the controls page.
#[derive(Debug, Clone)]
pub struct ControlsPageState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the financial controls.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for ControlsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ControlsPageState> for Key {
    fn from_ref(state: &ControlsPageState) -> Self {
        state.cookie_key.clone()
    }
}

fn controls_view(controls: &[FinancialControl], selected_id: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CONTROLS_VIEW).into_html();

    let table_row = |control: &FinancialControl| {
        let edit_url = format_endpoint(endpoints::EDIT_CONTROL_VIEW, &control.id);
        let delete_url = format_endpoint(endpoints::CONTROL, &control.id);
        let select_url = format_endpoint(endpoints::SELECT_CONTROL, &control.id);
        let is_selected = control.id == selected_id;

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    span class="flex items-center gap-2"
                    {
                        span
                            class="inline-block w-3 h-3 rounded-full"
                            style=(format!("background-color: {};", control.color)) {}

                        (control.name)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (control.description)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    time datetime=(control.created_at.date()) { (control.created_at.date()) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if is_selected {
                        span class="font-semibold text-green-600 dark:text-green-400" { "Active" }
                    } @else {
                        button
                            type="button"
                            class=(LINK_STYLE)
                            hx-post=(select_url)
                            hx-target-error="#alert-container"
                        {
                            "Switch to"
                        }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &format!(
                                "Are you sure you want to delete the control '{}' and all of \
                                its transactions? This cannot be undone.",
                                control.name
                            ),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Financial Controls" }

                    a href=(endpoints::NEW_CONTROL_VIEW) class=(LINK_STYLE)
                    {
                        "Add Control"
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Selection" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for control in controls {
                                (table_row(control))
                            }
                        }
                    }
                }
            }
        }
    );

    base("Controls", &[], &content)
}

/// Display the financial controls and their details.
pub async fn get_controls_page(
    State(state): State<ControlsPageState>,
    jar: PrivateCookieJar,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire store lock: {error}");
            return Error::StoreLockError.into_response();
        }
    };

    let controls = match ensure_default_control(&mut *store) {
        Ok(controls) => controls,
        Err(error) => return error.into_response(),
    };

    let selected = match resolve_selected_control(&mut *store, &jar) {
        Ok(control) => control,
        Err(error) => return error.into_response(),
    };

    controls_view(&controls, &selected.id).into_response()
}

#[cfg(test)]
mod controls_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        app_state::create_cookie_key,
        control::core::{ControlDetails, DEFAULT_CONTROL_NAME, create_control},
        store::SqliteStore,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{ControlsPageState, get_controls_page};

    fn get_test_state() -> ControlsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let store = SqliteStore::new(connection).expect("Could not create store");

        ControlsPageState {
            cookie_key: create_cookie_key("foobar"),
            store: Arc::new(Mutex::new(store)),
        }
    }

    #[tokio::test]
    async fn controls_page_creates_and_lists_default_control() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_controls_page(State(state), jar).await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 1, "want 1 table row, got {}", rows.len());

        let row_text = rows[0].text().collect::<String>();
        assert!(
            row_text.contains(DEFAULT_CONTROL_NAME),
            "want row to contain \"{DEFAULT_CONTROL_NAME}\", got {row_text}"
        );
        assert!(
            row_text.contains("Active"),
            "want the only control to be marked active, got {row_text}"
        );
    }

    #[tokio::test]
    async fn controls_page_lists_every_control() {
        let state = get_test_state();
        {
            let mut store = state.store.lock().unwrap();
            for name in ["Household", "Side Project"] {
                create_control(
                    &mut *store,
                    ControlDetails {
                        name: name.to_owned(),
                        description: String::new(),
                        color: String::new(),
                    },
                )
                .unwrap();
            }
        }
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_controls_page(State(state), jar).await;

        let html = parse_html_document(response).await;
        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 2, "want 2 table rows, got {}", rows.len());
    }
}
