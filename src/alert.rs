//! Alert messages for displaying success and error feedback to users.
//!
//! Alerts are rendered into the fixed `#alert-container` element via an
//! HTMX out-of-band swap, so an endpoint can return one alongside (or
//! instead of) its normal response fragment.

use maud::{Markup, html};

fn alert(container_style: &str, message: &str, details: &str) -> Markup {
    html! {
        div
            id="alert-container"
            hx-swap-oob="true"
            class="w-full max-w-md px-4"
            style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
        {
            div
                class=(container_style)
                role="alert"
            {
                div class="text-sm font-semibold" { (message) }

                @if !details.is_empty() {
                    div class="mt-1 text-sm" { (details) }
                }

                button
                    type="button"
                    class="absolute top-2 right-2 text-sm opacity-70 hover:opacity-100"
                    onclick="this.closest('#alert-container').classList.add('hidden')"
                    aria-label="Dismiss"
                {
                    "✕"
                }
            }
        }
    }
}

/// An error alert with a headline `message` and an optional `details` line.
pub fn alert_error(message: &str, details: &str) -> Markup {
    alert(
        "relative rounded-lg border border-red-300 bg-red-50 p-4 text-red-800 \
        shadow-lg dark:border-red-800 dark:bg-gray-800 dark:text-red-400",
        message,
        details,
    )
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::alert_error;

    #[test]
    fn error_alert_targets_alert_container() {
        let rendered = alert_error("Something went wrong", "The store is unavailable.")
            .into_string();

        let html = Html::parse_fragment(&rendered);
        let selector = Selector::parse("div#alert-container").unwrap();
        let container = html
            .select(&selector)
            .next()
            .expect("Could not find alert container");

        assert_eq!(container.attr("hx-swap-oob"), Some("true"));
        let text: String = container.text().collect();
        assert!(text.contains("Something went wrong"));
        assert!(text.contains("The store is unavailable."));
    }

    #[test]
    fn alert_omits_empty_details() {
        let rendered = alert_error("Saved", "").into_string();

        let html = Html::parse_fragment(&rendered);
        let selector = Selector::parse("div[role='alert'] div").unwrap();
        let lines = html.select(&selector).count();

        assert_eq!(lines, 1);
    }
}
