//! User authentication: cookie handling, the auth middleware, and the
//! log-in, registration and password reset flows.

pub(crate) mod cookie;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod register;
pub(crate) mod reset_request;
mod reset_password;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub(crate) use forgot_password::{get_forgot_password_page, post_forgot_password};
pub(crate) use log_in::{get_log_in_page, post_log_in};
pub(crate) use log_out::get_log_out;
pub(crate) use middleware::{auth_guard, auth_guard_hx};
pub(crate) use register::{get_register_page, post_register};
pub(crate) use reset_password::{get_reset_password_page, post_reset_password};

#[cfg(test)]
pub(crate) use middleware::AuthState;
