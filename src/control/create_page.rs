//! Defines the route handler for the page for creating a financial control.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    control::{core::DEFAULT_CONTROL_COLOR, form::control_form_fields},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// Renders the page for creating a financial control.
pub async fn get_new_control_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_CONTROL_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold" { "Create Control" }

            form
                hx-post=(endpoints::CONTROLS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (control_form_fields("", "", DEFAULT_CONTROL_COLOR))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Control" }
            }
        }
    };

    base("New Control", &[], &content).into_response()
}

#[cfg(test)]
mod new_control_page_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_new_control_page;

    #[tokio::test]
    async fn new_control_page_displays_form() {
        let response = get_new_control_page().await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CONTROLS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_submit_button(&form);
    }
}
