//! Displays the transactions of the active financial control, with
//! filtering and sortable columns.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    control::FinancialControl,
    endpoints::{self, format_endpoint},
    html::{
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    store::SqliteStore,
    transaction::{
        ALL_CATEGORIES, Category, SortDirection, SortKey, Transaction, TransactionFilter,
        TransactionKind, filter_transactions, get_transactions, sort_transactions,
    },
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// The sentinel select value meaning "do not filter on this field".
const ALL: &str = "all";

/// The query string controlling which transactions are shown and in what
/// order. Every field is optional so a bare `/transactions` shows everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsQuery {
    /// Case-insensitive text to look for in descriptions and category labels.
    #[serde(default)]
    pub search: String,
    /// A category slug, or "all".
    pub category: Option<String>,
    /// "income", "expense", or "all".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The column to sort by.
    pub sort: Option<String>,
    /// "asc" or "desc".
    pub direction: Option<String>,
}

impl TransactionsQuery {
    /// The filter described by this query. Unknown slugs and the "all"
    /// sentinel both mean "no filter on that field".
    pub(crate) fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            search: self.search.trim().to_owned(),
            category: self
                .category
                .as_deref()
                .and_then(|slug| Category::from_str(slug).ok()),
            kind: self
                .kind
                .as_deref()
                .and_then(|slug| TransactionKind::from_str(slug).ok()),
        }
    }

    pub(crate) fn sort_key(&self) -> SortKey {
        self.sort
            .as_deref()
            .and_then(|slug| SortKey::from_str(slug).ok())
            .unwrap_or_default()
    }

    pub(crate) fn sort_direction(&self) -> SortDirection {
        self.direction
            .as_deref()
            .and_then(|slug| SortDirection::from_str(slug).ok())
            .unwrap_or_default()
    }

    /// Re-encode this query with the given sort column and direction.
    fn to_query_string(&self, sort: SortKey, direction: SortDirection) -> String {
        let pairs = [
            ("search", self.search.clone()),
            (
                "category",
                self.category.clone().unwrap_or_else(|| ALL.to_owned()),
            ),
            ("type", self.kind.clone().unwrap_or_else(|| ALL.to_owned())),
            ("sort", sort.slug().to_owned()),
            ("direction", direction.slug().to_owned()),
        ];

        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }
}

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the transactions.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<TransactionsPageState> for Key {
    fn from_ref(state: &TransactionsPageState) -> Self {
        state.cookie_key.clone()
    }
}

fn amount_class(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "text-red-700 dark:text-red-300",
        TransactionKind::Income => "text-green-700 dark:text-green-300",
    }
}

fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();

        (truncated + "...", Some(description))
    }
}

fn sort_header(query: &TransactionsQuery, key: SortKey, label: &str) -> Markup {
    let current_key = query.sort_key();
    let direction = if current_key == key {
        query.sort_direction().toggled()
    } else {
        SortDirection::default()
    };
    let url = format!(
        "{}?{}",
        endpoints::TRANSACTIONS_VIEW,
        query.to_query_string(key, direction)
    );
    let marker = if current_key == key {
        match query.sort_direction() {
            SortDirection::Ascending => " \u{25b2}",
            SortDirection::Descending => " \u{25bc}",
        }
    } else {
        ""
    };

    html! {
        th scope="col" class=(TABLE_CELL_STYLE)
        {
            a href=(url) class="hover:underline" { (label) (marker) }
        }
    }
}

fn filter_form(query: &TransactionsQuery) -> Markup {
    let selected_category = query.category.as_deref().unwrap_or(ALL);
    let selected_kind = query.kind.as_deref().unwrap_or(ALL);

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-wrap items-end gap-4"
        {
            input type="hidden" name="sort" value=(query.sort_key().slug());
            input type="hidden" name="direction" value=(query.sort_direction().slug());

            input
                type="search"
                name="search"
                placeholder="Search transactions"
                value=(query.search)
                class=(FORM_TEXT_INPUT_STYLE)
                style="max-width: 16rem";

            select name="category" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 11rem"
            {
                option value=(ALL) selected[selected_category == ALL] { "All categories" }

                @for category in ALL_CATEGORIES {
                    option
                        value=(category.slug())
                        selected[selected_category == category.slug()]
                    {
                        (category.label())
                    }
                }
            }

            select name="type" class=(FORM_TEXT_INPUT_STYLE) style="max-width: 9rem"
            {
                option value=(ALL) selected[selected_kind == ALL] { "All types" }

                @for kind in [TransactionKind::Income, TransactionKind::Expense] {
                    option value=(kind.slug()) selected[selected_kind == kind.slug()]
                    {
                        (kind.label())
                    }
                }
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Filter"
            }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let signed_amount = match transaction.kind {
        TransactionKind::Income => transaction.amount,
        TransactionKind::Expense => -transaction.amount,
    };
    let amount_str = format_currency(signed_amount);
    let (description, tooltip) = format_description(&transaction.description);
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, &transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, &transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (transaction.date) }
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE) { (transaction.category.label()) }
            td class=(TABLE_CELL_STYLE) { (transaction.kind.label()) }
            td class={ "px-6 py-4 text-right " (amount_class(transaction.kind)) }
            {
                (amount_str)
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

fn transactions_view(
    control: &FinancialControl,
    transactions: &[Transaction],
    query: &TransactionsQuery,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let export_url = format!(
        "{}?{}",
        endpoints::EXPORT_TRANSACTIONS,
        query.to_query_string(query.sort_key(), query.sort_direction())
    );

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold"
                    {
                        "Transactions"

                        span class="ml-2 text-sm font-normal text-gray-500 dark:text-gray-400"
                        {
                            "in " (control.name)
                        }
                    }

                    div class="flex gap-4"
                    {
                        a href=(export_url) class=(LINK_STYLE) { "Export CSV" }
                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                        {
                            "Add Transaction"
                        }
                    }
                }

                (filter_form(query))

                @if transactions.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No transactions match. Add one or adjust the filters."
                    }
                } @else {
                    section class="w-full overflow-x-auto dark:bg-gray-800"
                    {
                        table class="w-full text-sm text-left rtl:text-right
                            text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    (sort_header(query, SortKey::Date, "Date"))
                                    (sort_header(query, SortKey::Description, "Description"))
                                    (sort_header(query, SortKey::Category, "Category"))
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    (sort_header(query, SortKey::Amount, "Amount"))
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for transaction in transactions {
                                    (transaction_row(transaction))
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

/// Display the transactions of the active control, filtered and sorted
/// according to the query string.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Query(query): Query<TransactionsQuery>,
    jar: PrivateCookieJar,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire store lock: {error}");
            return Error::StoreLockError.into_response();
        }
    };

    let control = match crate::control::resolve_selected_control(&mut *store, &jar) {
        Ok(control) => control,
        Err(error) => return error.into_response(),
    };

    let transactions = match get_transactions(&mut *store, &control.id) {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    let filtered = filter_transactions(&transactions, &query.filter());
    let sorted = sort_transactions(filtered, query.sort_key(), query.sort_direction());

    transactions_view(&control, &sorted, &query).into_response()
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        app_state::create_cookie_key,
        control::ensure_default_control,
        store::SqliteStore,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{
            Category, TransactionKind, create_transaction, test_utils::new_transaction,
        },
    };

    use super::{TransactionsPageState, TransactionsQuery, get_transactions_page};

    fn get_test_state() -> TransactionsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let store = SqliteStore::new(connection).expect("Could not create store");

        TransactionsPageState {
            cookie_key: create_cookie_key("foobar"),
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn seed_transactions(state: &TransactionsPageState) {
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
            (
                "Bus pass",
                35.0,
                Category::Transport,
                TransactionKind::Expense,
                date!(2024 - 02 - 01),
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

    async fn get_page(state: TransactionsPageState, query: TransactionsQuery) -> Html {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let response = get_transactions_page(State(state), Query(query), jar).await;

        parse_html_document(response).await
    }

    fn row_descriptions(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("tbody tr td:nth-child(2)").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn transactions_page_lists_all_by_default() {
        let state = get_test_state();
        seed_transactions(&state);

        let html = get_page(state, TransactionsQuery::default()).await;

        assert_valid_html(&html);
        assert_eq!(row_descriptions(&html).len(), 3);
    }

    #[tokio::test]
    async fn transactions_page_filters_by_category() {
        let state = get_test_state();
        seed_transactions(&state);

        let html = get_page(
            state,
            TransactionsQuery {
                category: Some("groceries".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(row_descriptions(&html), vec!["Weekly shop"]);
    }

    #[tokio::test]
    async fn transactions_page_all_sentinel_matches_everything() {
        let state = get_test_state();
        seed_transactions(&state);

        let html = get_page(
            state,
            TransactionsQuery {
                category: Some("all".to_owned()),
                kind: Some("all".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(row_descriptions(&html).len(), 3);
    }

    #[tokio::test]
    async fn transactions_page_sorts_by_amount_descending() {
        let state = get_test_state();
        seed_transactions(&state);

        let html = get_page(
            state,
            TransactionsQuery {
                sort: Some("amount".to_owned()),
                direction: Some("desc".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(
            row_descriptions(&html),
            vec!["Salary", "Weekly shop", "Bus pass"]
        );
    }

    #[tokio::test]
    async fn transactions_page_searches_descriptions() {
        let state = get_test_state();
        seed_transactions(&state);

        let html = get_page(
            state,
            TransactionsQuery {
                search: "salary".to_owned(),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(row_descriptions(&html), vec!["Salary"]);
    }

    #[tokio::test]
    async fn transactions_page_shows_empty_message() {
        let state = get_test_state();

        let html = get_page(state, TransactionsQuery::default()).await;

        let text = html
            .select(&Selector::parse("main p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<String>();
        assert!(
            text.contains("No transactions match"),
            "want empty state message, got {text}"
        );
    }
}
