//! The shared form fields for creating and editing a financial control.

use maud::{Markup, html};

use crate::html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE};

pub(super) fn control_form_fields(name: &str, description: &str, color: &str) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="e.g. Household"
                required
                autofocus
                value=(name)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                id="description"
                type="text"
                name="description"
                placeholder="What is this control for?"
                value=(description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="color" class=(FORM_LABEL_STYLE) { "Accent Color" }

            input
                id="color"
                type="color"
                name="color"
                value=(color)
                class="h-10 w-20 cursor-pointer rounded border border-gray-300
                    dark:border-gray-600 bg-gray-50 dark:bg-gray-700";
        }
    }
}
