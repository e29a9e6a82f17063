//! The shared form fields for creating and editing a transaction.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::{ALL_CATEGORIES, Category, TransactionKind},
};

/// The values submitted by the transaction forms.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionFormData {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category: Category,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
}

pub(super) struct TransactionFormDefaults<'a> {
    pub kind: TransactionKind,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub max_date: Date,
}

pub(super) fn transaction_form_fields(defaults: &TransactionFormDefaults<'_>) -> Markup {
    let is_expense = matches!(defaults.kind, TransactionKind::Expense);
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount.abs()));

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="transaction-kind-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="transaction-kind-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                required
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.01"
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select
                name="category"
                id="category"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for category in ALL_CATEGORIES {
                    @if Some(category) == defaults.category {
                        option value=(category.slug()) selected { (category.label()) }
                    } @else {
                        option value=(category.slug()) { (category.label()) }
                    }
                }
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

#[cfg(test)]
mod form_tests {
    use scraper::{Html, Selector};
    use time::OffsetDateTime;

    use crate::transaction::TransactionKind;

    use super::{TransactionFormDefaults, transaction_form_fields};

    fn render_fields(kind: TransactionKind) -> Html {
        let max_date = OffsetDateTime::now_utc().date();
        let fields = transaction_form_fields(&TransactionFormDefaults {
            kind,
            amount: None,
            category: None,
            date: max_date,
            description: None,
            max_date,
        });
        let markup = maud::html! { form { (fields) } };

        Html::parse_document(&markup.into_string())
    }

    #[test]
    fn transaction_form_fields_checks_selected_kind() {
        let cases = [
            (TransactionKind::Expense, "expense"),
            (TransactionKind::Income, "income"),
        ];

        for (kind, expected) in cases {
            let html = render_fields(kind);
            assert_checked_value(&html, expected);
        }
    }

    #[test]
    fn transaction_form_fields_lists_every_category() {
        let html = render_fields(TransactionKind::Expense);

        let selector = Selector::parse("select[name=category] option").unwrap();
        let options = html.select(&selector).collect::<Vec<_>>();
        assert_eq!(options.len(), 9, "want 9 categories, got {}", options.len());
    }

    fn assert_checked_value(document: &Html, expected: &str) {
        let selector = Selector::parse("input[type=radio][name=kind]").unwrap();
        let inputs = document.select(&selector).collect::<Vec<_>>();
        assert_eq!(
            inputs.len(),
            2,
            "want 2 transaction kind inputs, got {}",
            inputs.len()
        );

        let checked = inputs
            .iter()
            .find(|input| input.value().attr("checked").is_some())
            .and_then(|input| input.value().attr("value"));
        assert_eq!(
            checked,
            Some(expected),
            "want checked transaction kind to be {expected}, got {checked:?}"
        );
    }
}
