//! The page and route handler for requesting a password reset code.
//!
//! The app has no mail integration, so the generated code is written to the
//! server log and the operator is expected to pass it on to the user.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::reset_request::create_reset_request,
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, log_in_register,
    },
    store::SqliteStore,
    user::get_user_by_email,
};

const UNKNOWN_EMAIL_ERROR_MSG: &str = "No account was found with that email address.";

fn forgot_password_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::FORGOT_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Enter your email address and a verification code will be \
                generated for you. Use the code on the next page to choose a \
                new password."
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="you@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(email);

                @if let Some(error_message) = error_message {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Send Code"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Remembered your password? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the forgot password page.
pub async fn get_forgot_password_page() -> Response {
    let form = forgot_password_form("", None);
    let content = log_in_register("Reset your password", &form);

    base("Forgot Password", &[], &content).into_response()
}

/// The state needed for issuing a password reset code.
#[derive(Debug, Clone)]
pub struct ForgotPasswordState {
    /// The key-value store holding the registered users and reset requests.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for ForgotPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The email submitted on the forgot password form.
#[derive(Deserialize)]
pub struct ForgotPasswordData {
    /// The email of the account to reset the password for.
    pub email: String,
}

/// Handler for password reset code requests via the POST method.
///
/// On success the code is written to the server log and the client is
/// redirected to the reset password page with the email pre-filled.
pub async fn post_forgot_password(
    State(state): State<ForgotPasswordState>,
    Form(data): Form<ForgotPasswordData>,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire store lock: {error}");
            return Error::StoreLockError.into_response();
        }
    };

    let user = match get_user_by_email(&*store, &data.email) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return forgot_password_form(&data.email, Some(UNKNOWN_EMAIL_ERROR_MSG))
                .into_response();
        }
        Err(error) => return error.into_response(),
    };

    let code = match create_reset_request(&mut *store, &user.email) {
        Ok(code) => code,
        Err(error) => return error.into_response(),
    };

    // No email delivery, the operator reads the code off the log.
    tracing::info!("password reset code for {}: {}", user.email, code);

    let redirect_url = match serde_urlencoded::to_string([("email", user.email.as_str())]) {
        Ok(query) => format!("{}?{}", endpoints::RESET_PASSWORD_VIEW, query),
        Err(_) => endpoints::RESET_PASSWORD_VIEW.to_owned(),
    };

    (StatusCode::SEE_OTHER, HxRedirect(redirect_url), ()).into_response()
}

#[cfg(test)]
mod forgot_password_page_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_forgot_password_page;

    #[tokio::test]
    async fn forgot_password_page_displays_form() {
        let response = get_forgot_password_page().await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::FORGOT_PASSWORD_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_submit_button(&form);
    }
}
