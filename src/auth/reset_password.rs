//! The page and route handler for setting a new password with a reset code.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{cookie::set_flash, reset_request::consume_reset_request},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, log_in_register,
        password_input,
    },
    store::SqliteStore,
    user::{MIN_PASSWORD_LENGTH, update_password},
};

/// The flash message shown on the log-in page after a successful reset.
pub const RESET_SUCCESS_MSG: &str = "Your password has been updated. Please log in.";

/// Per-field error messages for the reset password form.
#[derive(Default)]
struct FormErrors<'a> {
    code: Option<&'a str>,
    password: Option<&'a str>,
}

fn reset_password_form(email: &str, errors: &FormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::RESET_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #code, #new_password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
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
                    value=(email);
            }

            div
            {
                label for="code" class=(FORM_LABEL_STYLE) { "Verification Code" }

                input
                    type="text"
                    name="code"
                    id="code"
                    placeholder="123456"
                    inputmode="numeric"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus[!email.is_empty()];

                @if let Some(error_message) = errors.code {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div
            {
                (password_input("new_password", "New Password", MIN_PASSWORD_LENGTH))
                (password_input("confirm_password", "Confirm New Password", MIN_PASSWORD_LENGTH))

                @if let Some(error_message) = errors.password {
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
                "Set New Password"
            }
        }
    }
}

/// The query string for the reset password page.
#[derive(Deserialize)]
pub struct ResetPasswordQuery {
    /// Pre-fills the email field when coming from the forgot password flow.
    pub email: Option<String>,
}

/// Display the reset password page.
pub async fn get_reset_password_page(Query(query): Query<ResetPasswordQuery>) -> Response {
    let form = reset_password_form(query.email.as_deref().unwrap_or(""), &FormErrors::default());
    let content = log_in_register("Choose a new password", &form);

    base("Reset Password", &[], &content).into_response()
}

/// The state needed for resetting a password.
#[derive(Debug, Clone)]
pub struct ResetPasswordState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the registered users and reset requests.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for ResetPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ResetPasswordState> for Key {
    fn from_ref(state: &ResetPasswordState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the reset password form.
#[derive(Deserialize)]
pub struct ResetPasswordData {
    /// The email of the account to reset the password for.
    pub email: String,
    /// The verification code from the forgot password flow.
    pub code: String,
    /// The new password in plain text.
    pub new_password: String,
    /// The new password typed a second time.
    pub confirm_password: String,
}

/// Handler for password reset requests via the POST method.
///
/// The password is validated before the verification code is checked so a
/// typo in the new password does not burn the single-use code.
pub async fn post_reset_password(
    State(state): State<ResetPasswordState>,
    jar: PrivateCookieJar,
    Form(data): Form<ResetPasswordData>,
) -> Response {
    if data.new_password.len() < MIN_PASSWORD_LENGTH {
        let error_message = Error::PasswordTooShort(MIN_PASSWORD_LENGTH).to_string();
        return reset_password_form(
            &data.email,
            &FormErrors {
                password: Some(&error_message),
                ..Default::default()
            },
        )
        .into_response();
    }

    if data.new_password != data.confirm_password {
        let error_message = Error::PasswordMismatch.to_string();
        return reset_password_form(
            &data.email,
            &FormErrors {
                password: Some(&error_message),
                ..Default::default()
            },
        )
        .into_response();
    }

    let result = {
        let mut store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_response();
            }
        };

        consume_reset_request(&mut *store, &data.email, &data.code)
            .and_then(|_| update_password(&mut *store, &data.email, &data.new_password))
    };

    match result {
        Ok(_) => {
            tracing::info!("password reset for {}", data.email.trim().to_lowercase());
            let jar = set_flash(jar, RESET_SUCCESS_MSG);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                jar,
            )
                .into_response()
        }
        Err(
            error @ (Error::UnknownResetRequest(_)
            | Error::InvalidResetCode
            | Error::ExpiredResetCode),
        ) => {
            let error_message = error.to_string();
            reset_password_form(
                &data.email,
                &FormErrors {
                    code: Some(&error_message),
                    ..Default::default()
                },
            )
            .into_response()
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod reset_password_page_tests {
    use axum::extract::Query;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::{ResetPasswordQuery, get_reset_password_page};

    #[tokio::test]
    async fn reset_password_page_displays_form() {
        let response = get_reset_password_page(Query(ResetPasswordQuery { email: None })).await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::RESET_PASSWORD_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "code", "text");
        assert_form_input(&form, "new_password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn reset_password_page_pre_fills_email() {
        let response = get_reset_password_page(Query(ResetPasswordQuery {
            email: Some("test@example.com".to_owned()),
        }))
        .await;

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "email", "email", "test@example.com");
    }
}
