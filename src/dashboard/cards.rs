//! The headline figure cards at the top of the dashboard.

use maud::{Markup, html};

use crate::{dashboard::aggregation::Totals, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

fn balance_color(balance: f64) -> &'static str {
    if balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    }
}

fn card(label: &str, amount: String, amount_class: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (label) }

            div class={ "text-3xl font-bold " (amount_class) } { (amount) }
        }
    }
}

/// Renders the balance, income, and expense cards for `totals`.
pub(super) fn totals_cards_view(totals: &Totals) -> Markup {
    html! {
        section class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
            {
                (card(
                    "Balance",
                    format_currency(totals.balance),
                    balance_color(totals.balance),
                ))
                (card(
                    "Income",
                    format_currency(totals.income),
                    "text-green-600 dark:text-green-400",
                ))
                (card(
                    "Expenses",
                    format_currency(totals.expense),
                    "text-red-600 dark:text-red-400",
                ))
            }
        }
    }
}
