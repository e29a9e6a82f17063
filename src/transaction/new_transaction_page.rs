//! Defines the route handler for the page for creating a transaction.

use axum::response::{IntoResponse, Response};
use maud::html;
use time::OffsetDateTime;

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    transaction::{
        TransactionKind,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let max_date = OffsetDateTime::now_utc().date();
    let fields = transaction_form_fields(&TransactionFormDefaults {
        kind: TransactionKind::Expense,
        amount: None,
        category: None,
        date: max_date,
        description: None,
        max_date,
    });

    let content = html! {
        (nav_bar)
        (dollar_input_styles())

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold" { "New Transaction" }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Transaction" }
            }
        }
    };

    base("New Transaction", &[], &content).into_response()
}
