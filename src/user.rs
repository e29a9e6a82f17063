//! Defines the core data model and store operations for users.
//!
//! Users live as a JSON list under the `users` key. Passwords are stored as
//! bcrypt hashes, never as plain text.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    store::{KeyValueStore, keys, read_or_default, write},
};

/// The unique identifier of a user.
pub type UserId = String;

/// The minimum number of characters a password must have.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The unique ID of the user.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email address, unique across all users.
    pub email: String,
    /// The bcrypt hash of the user's password.
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
    /// When the account was created.
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The details submitted by the registration form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterDetails {
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The chosen password in plain text.
    pub password: String,
    /// The password typed a second time, must match `password`.
    pub confirm_password: String,
}

/// Get all registered users.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub fn get_users(store: &dyn KeyValueStore) -> Result<Vec<User>, Error> {
    read_or_default(store, keys::USERS)
}

fn save_users(store: &mut dyn KeyValueStore, users: &[User]) -> Result<(), Error> {
    write(store, keys::USERS, &users)
}

fn validate(details: &RegisterDetails, existing: &[User]) -> Result<(), Error> {
    if details.name.trim().is_empty()
        || details.email.trim().is_empty()
        || details.password.is_empty()
        || details.confirm_password.is_empty()
    {
        return Err(Error::MissingField);
    }

    if !details.email.contains('@') {
        return Err(Error::InvalidEmail(details.email.clone()));
    }

    if details.password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if details.password != details.confirm_password {
        return Err(Error::PasswordMismatch);
    }

    let email = details.email.trim().to_lowercase();
    if existing.iter().any(|user| user.email == email) {
        return Err(Error::DuplicateEmail(email));
    }

    Ok(())
}

/// Register a new user, hashing the password and appending the record to the
/// user list. Emails are stored lowercased.
///
/// # Errors
/// Returns:
/// - [Error::MissingField] if any field is blank,
/// - [Error::InvalidEmail] if the email has no `@`,
/// - [Error::PasswordTooShort] if the password is under six characters,
/// - [Error::PasswordMismatch] if the confirmation does not match,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::HashingError] if the password cannot be hashed,
/// - or an error if the store cannot be read or written.
pub fn create_user(store: &mut dyn KeyValueStore, details: RegisterDetails) -> Result<User, Error> {
    let mut users = get_users(store)?;
    validate(&details, &users)?;

    let password_hash = bcrypt::hash(&details.password, bcrypt::DEFAULT_COST)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: details.name.trim().to_owned(),
        email: details.email.trim().to_lowercase(),
        password_hash,
        created_at: OffsetDateTime::now_utc(),
    };

    users.push(user.clone());
    save_users(store, &users)?;

    Ok(user)
}

/// Get the user with the given email address, if one is registered.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub fn get_user_by_email(store: &dyn KeyValueStore, email: &str) -> Result<Option<User>, Error> {
    let email = email.trim().to_lowercase();

    Ok(get_users(store)?
        .into_iter()
        .find(|user| user.email == email))
}

/// Get the user with the given ID.
///
/// # Errors
/// Returns [Error::NotFound] if no user has the given ID, or an error if the
/// store cannot be read.
pub fn get_user_by_id(store: &dyn KeyValueStore, user_id: &str) -> Result<User, Error> {
    get_users(store)?
        .into_iter()
        .find(|user| user.id == user_id)
        .ok_or(Error::NotFound)
}

/// Check `email` and `password` against the registered users and return the
/// matching user.
///
/// # Errors
/// Returns [Error::InvalidCredentials] if the email is unknown or the
/// password does not match its hash. The two cases are indistinguishable to
/// the caller so that login errors do not reveal which emails exist.
pub fn verify_user(
    store: &dyn KeyValueStore,
    email: &str,
    password: &str,
) -> Result<User, Error> {
    let Some(user) = get_user_by_email(store, email)? else {
        return Err(Error::InvalidCredentials);
    };

    let matches = bcrypt::verify(password, &user.password_hash)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if matches {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}

/// Replace the password hash of the user with `email` with a hash of
/// `new_password`.
///
/// # Errors
/// Returns:
/// - [Error::PasswordTooShort] if the new password is under six characters,
/// - [Error::NotFound] if the email is not registered,
/// - [Error::HashingError] if the password cannot be hashed,
/// - or an error if the store cannot be read or written.
pub fn update_password(
    store: &mut dyn KeyValueStore,
    email: &str,
    new_password: &str,
) -> Result<(), Error> {
    if new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    let email = email.trim().to_lowercase();
    let mut users = get_users(store)?;

    let Some(user) = users.iter_mut().find(|user| user.email == email) else {
        return Err(Error::NotFound);
    };

    user.password_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    save_users(store, &users)
}
