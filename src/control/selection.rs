//! The cookie remembering which financial control the user is working in.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};

use crate::{
    Error,
    control::core::{FinancialControl, ensure_default_control},
    store::KeyValueStore,
};

pub(crate) const COOKIE_CONTROL_ID: &str = "control_id";

/// Remember `control_id` as the active financial control.
pub(crate) fn set_selected_control(jar: PrivateCookieJar, control_id: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_CONTROL_ID, control_id.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true)
            .build(),
    )
}

/// Resolve the active financial control for this request.
///
/// Falls back to the first control when no selection cookie is set or the
/// selected control no longer exists, creating the default control first if
/// the registry is empty.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub(crate) fn resolve_selected_control(
    store: &mut dyn KeyValueStore,
    jar: &PrivateCookieJar,
) -> Result<FinancialControl, Error> {
    let mut controls = ensure_default_control(store)?;

    if let Some(cookie) = jar.get(COOKIE_CONTROL_ID) {
        if let Some(index) = controls
            .iter()
            .position(|control| control.id == cookie.value_trimmed())
        {
            return Ok(controls.swap_remove(index));
        }
    }

    Ok(controls.swap_remove(0))
}
