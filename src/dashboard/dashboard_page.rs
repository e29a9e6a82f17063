//! Defines the route handler for the dashboard page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    control::{FinancialControl, resolve_selected_control},
    dashboard::{
        aggregation::{monthly_summaries, totals},
        cards::totals_cards_view,
        charts::{DashboardChart, charts_script, charts_view, expenses_chart, monthly_chart},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    store::SqliteStore,
    transaction::{Transaction, get_transactions},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the application data.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// Renders the dashboard page when the active control has no transactions.
fn dashboard_no_data_view(nav_bar: Markup, control: &FinancialControl) -> Markup {
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once " (control.name) " has some records.
                Start by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(
    nav_bar: Markup,
    control: &FinancialControl,
    transactions: &[Transaction],
) -> Markup {
    let charts = [
        DashboardChart {
            id: "expenses-chart",
            options: expenses_chart(transactions).to_string(),
        },
        DashboardChart {
            id: "monthly-chart",
            options: monthly_chart(&monthly_summaries(transactions)).to_string(),
        },
    ];

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            header class="w-full mb-4"
            {
                h1 class="text-xl font-bold"
                {
                    "Dashboard"

                    span class="ml-2 text-sm font-normal text-gray-500 dark:text-gray-400"
                    {
                        "for " (control.name)
                    }
                }
            }

            (totals_cards_view(&totals(transactions)))

            (charts_view(&charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

/// Display an overview of the active control: headline totals and charts.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    jar: PrivateCookieJar,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire store lock: {error}");
            return Error::StoreLockError.into_response();
        }
    };

    let control = match resolve_selected_control(&mut *store, &jar) {
        Ok(control) => control,
        Err(error) => return error.into_response(),
    };

    let transactions = match get_transactions(&mut *store, &control.id) {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    if transactions.is_empty() {
        dashboard_no_data_view(nav_bar, &control).into_response()
    } else {
        dashboard_view(nav_bar, &control, &transactions).into_response()
    }
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        app_state::create_cookie_key,
        control::ensure_default_control,
        store::SqliteStore,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Category, TransactionKind, create_transaction, test_utils::new_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> DashboardState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let store = SqliteStore::new(connection).expect("Could not create store");

        DashboardState {
            cookie_key: create_cookie_key("foobar"),
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn seed_transactions(state: &DashboardState) {
        let mut store = state.store.lock().unwrap();
        let control_id = ensure_default_control(&mut *store).unwrap()[0].id.clone();

        let entries = [
            (
                "Salary",
                1000.0,
                Category::Salary,
                TransactionKind::Income,
                date!(2024 - 01 - 05),
            ),
            (
                "Weekly shop",
                300.0,
                Category::Groceries,
                TransactionKind::Expense,
                date!(2024 - 01 - 20),
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

    async fn get_page(state: DashboardState) -> Html {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let response = get_dashboard_page(State(state), jar).await;

        parse_html_document(response).await
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{chart_id}")).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{chart_id}' not found"
        );
    }

    #[tokio::test]
    async fn dashboard_page_shows_totals_and_charts() {
        let state = get_test_state();
        seed_transactions(&state);

        let html = get_page(state).await;

        assert_valid_html(&html);

        assert_chart_exists(&html, "expenses-chart");
        assert_chart_exists(&html, "monthly-chart");

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("$1,000.00"), "want income total in {text}");
        assert!(text.contains("$700.00"), "want balance in {text}");
    }

    #[tokio::test]
    async fn dashboard_page_shows_prompt_when_empty() {
        let state = get_test_state();

        let html = get_page(state).await;

        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Nothing here yet"),
            "want empty state prompt in {text}"
        );
    }
}
