//! The registration page and route handler for creating a new user account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    auth::cookie::set_flash,
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, log_in_register,
        password_input,
    },
    store::SqliteStore,
    user::{MIN_PASSWORD_LENGTH, RegisterDetails, create_user},
};

/// The flash message shown on the log-in page after a successful registration.
pub const REGISTRATION_SUCCESS_MSG: &str = "Your account has been created. Please log in.";

/// Per-field error messages for the registration form.
#[derive(Default)]
struct FormErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(name: &str, email: &str, errors: &FormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#name, #email, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="text"
                    name="name"
                    id="name"
                    placeholder="Jane Doe"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(name);
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
                    value=(email);

                @if let Some(error_message) = errors.email {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div
            {
                (password_input("password", "Password", MIN_PASSWORD_LENGTH))

                @if let Some(error_message) = errors.password {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div
            {
                (password_input("confirm_password", "Confirm Password", MIN_PASSWORD_LENGTH))

                @if let Some(error_message) = errors.confirm_password {
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
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

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

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form("", "", &FormErrors::default());
    let content = log_in_register("Create your account", &form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The key-value store holding the registered users.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            store: state.store.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handler for registration requests via the POST method.
///
/// On success a flash message is set and the client is redirected to the
/// log-in page. On a validation error the form is returned with an error
/// message next to the offending field.
pub async fn post_register(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(details): Form<RegisterDetails>,
) -> Response {
    let result = {
        let mut store = match state.store.lock() {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("could not acquire store lock: {error}");
                return Error::StoreLockError.into_response();
            }
        };

        create_user(&mut *store, details.clone())
    };

    let error = match result {
        Ok(user) => {
            tracing::info!("registered new user {}", user.id);
            let jar = set_flash(jar, REGISTRATION_SUCCESS_MSG);

            return (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                jar,
            )
                .into_response();
        }
        Err(error) => error,
    };

    let error_message = error.to_string();
    let errors = match error {
        Error::MissingField => FormErrors {
            email: Some("Please fill in all of the fields."),
            ..Default::default()
        },
        Error::InvalidEmail(_) | Error::DuplicateEmail(_) => FormErrors {
            email: Some(&error_message),
            ..Default::default()
        },
        Error::PasswordTooShort(_) => FormErrors {
            password: Some(&error_message),
            ..Default::default()
        },
        Error::PasswordMismatch => FormErrors {
            confirm_password: Some(&error_message),
            ..Default::default()
        },
        error => return error.into_response(),
    };

    registration_form(&details.name, &details.email, &errors).into_response()
}
