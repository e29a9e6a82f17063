//! Short-lived verification codes for the password reset flow.
//!
//! Codes are kept in the key-value store under a single map keyed by email, so
//! at most one reset request is active per user at a time.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    store::{KeyValueStore, keys, read_or_default, write},
};

/// How long a reset code stays valid after it is issued.
const RESET_CODE_DURATION: Duration = Duration::minutes(30);

/// A pending password reset for a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    /// The six digit verification code the user must enter.
    pub code: String,
    /// When the code stops being accepted.
    #[serde(rename = "expiresAt", with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

type ResetRequests = HashMap<String, ResetRequest>;

/// Issue a six digit reset code for `email`, replacing any code issued
/// earlier. Returns the code so the caller can deliver it to the user.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn create_reset_request(store: &mut dyn KeyValueStore, email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();
    let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));

    let mut requests: ResetRequests = read_or_default(store, keys::RESET_REQUESTS)?;
    requests.insert(
        email,
        ResetRequest {
            code: code.clone(),
            expires_at: OffsetDateTime::now_utc() + RESET_CODE_DURATION,
        },
    );
    write(store, keys::RESET_REQUESTS, &requests)?;

    Ok(code)
}

/// Check `code` against the pending reset request for `email`.
///
/// The request is removed when the code matches, so each code can be used at
/// most once. Expired requests are also removed so the user has to start over.
///
/// # Errors
/// Returns:
/// - [Error::UnknownResetRequest] if no request exists for `email`,
/// - [Error::InvalidResetCode] if the code does not match,
/// - [Error::ExpiredResetCode] if the code matched but has expired,
/// - or an error if the store cannot be read or written.
pub fn consume_reset_request(
    store: &mut dyn KeyValueStore,
    email: &str,
    code: &str,
) -> Result<(), Error> {
    let email = email.trim().to_lowercase();
    let mut requests: ResetRequests = read_or_default(store, keys::RESET_REQUESTS)?;

    let request = requests
        .get(&email)
        .ok_or_else(|| Error::UnknownResetRequest(email.clone()))?;

    if request.code != code.trim() {
        return Err(Error::InvalidResetCode);
    }

    let expired = request.expires_at < OffsetDateTime::now_utc();
    requests.remove(&email);
    write(store, keys::RESET_REQUESTS, &requests)?;

    if expired {
        return Err(Error::ExpiredResetCode);
    }

    Ok(())
}
