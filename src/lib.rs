//! Fincontrol is a web app for tracking personal income and expenses across
//! one or more named "financial controls" (independent workspaces).
//!
//! This library provides a server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod control;
mod dashboard;
mod endpoints;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod routing;
mod store;
#[cfg(test)]
mod test_utils;
mod transaction;
mod user;

pub use app_state::AppState;
pub use routing::build_router;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};

use crate::{
    alert::alert_error,
    html::render,
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email/password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user email or expiry cookie is missing from the cookie jar
    /// in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A registration or password reset form was submitted with a missing
    /// required field.
    #[error("a required field was left empty")]
    MissingField,

    /// The email given at registration does not look like an email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email given at registration already belongs to a user.
    #[error("the email \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// The password given at registration or reset is shorter than the
    /// minimum length.
    #[error("the password must be at least {0} characters long")]
    PasswordTooShort(usize),

    /// The password and confirmation fields do not match.
    #[error("the passwords do not match")]
    PasswordMismatch,

    /// No password reset request exists for the given email.
    #[error("no password reset request was found for \"{0}\"")]
    UnknownResetRequest(String),

    /// The verification code does not match the stored reset request.
    #[error("the verification code is incorrect")]
    InvalidResetCode,

    /// The verification code has expired.
    #[error("the verification code has expired")]
    ExpiredResetCode,

    /// An empty string was used for a transaction description.
    #[error("the transaction description cannot be empty")]
    EmptyDescription,

    /// A zero or negative amount was used to create a transaction.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// An empty string was used for a financial control name.
    #[error("the control name cannot be empty")]
    EmptyControlName,

    /// Tried to delete the only remaining financial control.
    #[error("the last remaining control cannot be deleted")]
    LastControl,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the store")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the store")]
    DeleteMissingTransaction,

    /// Tried to update a financial control that does not exist.
    #[error("tried to update a control that is not in the store")]
    UpdateMissingControl,

    /// Tried to delete a financial control that does not exist.
    #[error("tried to delete a control that is not in the store")]
    DeleteMissingControl,

    /// An error occurred while serializing a collection as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the store lock.
    #[error("could not acquire the store lock")]
    StoreLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::StoreLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(InternalServerErrorPageTemplate::default())
            }
        }
    }
}

impl Error {
    pub(crate) fn into_alert_response(self) -> Response {
        match self {
            Error::UpdateMissingTransaction => render(
                StatusCode::NOT_FOUND,
                alert_error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                ),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                alert_error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                ),
            ),
            Error::UpdateMissingControl => render(
                StatusCode::NOT_FOUND,
                alert_error("Could not update control", "The control could not be found."),
            ),
            Error::DeleteMissingControl => render(
                StatusCode::NOT_FOUND,
                alert_error(
                    "Could not delete control",
                    "The control could not be found. \
                    Try refreshing the page to see if the control has already been deleted.",
                ),
            ),
            Error::LastControl => render(
                StatusCode::BAD_REQUEST,
                alert_error(
                    "Could not delete control",
                    "You cannot delete the only remaining financial control.",
                ),
            ),
            Error::NotFound => render(
                StatusCode::NOT_FOUND,
                alert_error(
                    "Not found",
                    "The requested item could not be found. Try refreshing the page.",
                ),
            ),
            Error::EmptyControlName => render(
                StatusCode::BAD_REQUEST,
                alert_error("Invalid name", "Please enter a name for the control."),
            ),
            Error::EmptyDescription => render(
                StatusCode::BAD_REQUEST,
                alert_error(
                    "Invalid description",
                    "Please enter a description for the transaction.",
                ),
            ),
            Error::InvalidAmount(amount) => render(
                StatusCode::BAD_REQUEST,
                alert_error(
                    "Invalid amount",
                    &format!("{amount} is not a valid amount, enter an amount greater than zero."),
                ),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                alert_error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
