//! Defines the core data model and store operations for financial controls.
//!
//! A financial control is a named workspace that owns its own transaction
//! list. The registry of controls lives as a JSON list under the
//! `financialControls` key, and at least one control always exists.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    store::{KeyValueStore, keys, read_or_default, write},
    transaction::remove_control_transactions,
};

/// The unique identifier of a financial control.
pub type ControlId = String;

/// The name given to the control created on first use.
pub const DEFAULT_CONTROL_NAME: &str = "Main control";

/// The accent color assigned to a control when none is chosen.
pub const DEFAULT_CONTROL_COLOR: &str = "#3b82f6";

/// A named workspace holding its own set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialControl {
    /// The unique ID of the control.
    pub id: ControlId,
    /// The display name, never blank.
    pub name: String,
    /// An optional free-form description.
    #[serde(default)]
    pub description: String,
    /// The accent color shown next to the control's name, as a hex string.
    #[serde(default = "default_color")]
    pub color: String,
    /// When the control was created.
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the control was last renamed or recolored.
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn default_color() -> String {
    DEFAULT_CONTROL_COLOR.to_owned()
}

/// The details needed to create or edit a control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlDetails {
    /// The display name, must not be blank.
    pub name: String,
    /// An optional free-form description.
    #[serde(default)]
    pub description: String,
    /// The accent color as a hex string, empty for the default.
    #[serde(default)]
    pub color: String,
}

/// Get all financial controls in creation order.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub fn get_controls(store: &dyn KeyValueStore) -> Result<Vec<FinancialControl>, Error> {
    read_or_default(store, keys::FINANCIAL_CONTROLS)
}

fn save_controls(
    store: &mut dyn KeyValueStore,
    controls: &[FinancialControl],
) -> Result<(), Error> {
    write(store, keys::FINANCIAL_CONTROLS, &controls)
}

/// Get the registry, creating the default control first if it is empty.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn ensure_default_control(
    store: &mut dyn KeyValueStore,
) -> Result<Vec<FinancialControl>, Error> {
    let controls = get_controls(store)?;

    if !controls.is_empty() {
        return Ok(controls);
    }

    tracing::info!("no financial controls found, creating the default one");

    let now = OffsetDateTime::now_utc();
    let default = FinancialControl {
        id: Uuid::new_v4().to_string(),
        name: DEFAULT_CONTROL_NAME.to_owned(),
        description: String::new(),
        color: DEFAULT_CONTROL_COLOR.to_owned(),
        created_at: now,
        updated_at: now,
    };
    save_controls(store, &[default.clone()])?;

    Ok(vec![default])
}

/// Get a single control by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if no control has the given ID.
pub fn get_control(store: &dyn KeyValueStore, control_id: &str) -> Result<FinancialControl, Error> {
    get_controls(store)?
        .into_iter()
        .find(|control| control.id == control_id)
        .ok_or(Error::NotFound)
}

fn validate(details: &ControlDetails) -> Result<(), Error> {
    if details.name.trim().is_empty() {
        return Err(Error::EmptyControlName);
    }

    Ok(())
}

/// Create a new control with a freshly generated ID and append it to the
/// registry.
///
/// # Errors
/// Returns [Error::EmptyControlName] if the name is blank, or an error if
/// the store cannot be read or written.
pub fn create_control(
    store: &mut dyn KeyValueStore,
    details: ControlDetails,
) -> Result<FinancialControl, Error> {
    validate(&details)?;

    let now = OffsetDateTime::now_utc();
    let control = FinancialControl {
        id: Uuid::new_v4().to_string(),
        name: details.name.trim().to_owned(),
        description: details.description.trim().to_owned(),
        color: if details.color.is_empty() {
            DEFAULT_CONTROL_COLOR.to_owned()
        } else {
            details.color
        },
        created_at: now,
        updated_at: now,
    };

    let mut controls = get_controls(store)?;
    controls.push(control.clone());
    save_controls(store, &controls)?;

    Ok(control)
}

/// Update the name, description and color of the control with `control_id`,
/// bumping its `updatedAt` timestamp.
///
/// # Errors
/// Returns [Error::EmptyControlName] if the name is blank,
/// [Error::UpdateMissingControl] if no control has the given ID, or an error
/// if the store cannot be read or written.
pub fn update_control(
    store: &mut dyn KeyValueStore,
    control_id: &str,
    details: ControlDetails,
) -> Result<FinancialControl, Error> {
    validate(&details)?;

    let mut controls = get_controls(store)?;

    let Some(control) = controls.iter_mut().find(|control| control.id == control_id) else {
        return Err(Error::UpdateMissingControl);
    };

    control.name = details.name.trim().to_owned();
    control.description = details.description.trim().to_owned();
    if !details.color.is_empty() {
        control.color = details.color;
    }
    control.updated_at = OffsetDateTime::now_utc();
    let updated = control.clone();

    save_controls(store, &controls)?;

    Ok(updated)
}

/// Delete the control with `control_id` along with its transaction list, and
/// return the ID of the first remaining control.
///
/// The last control can never be deleted: every user must always have at
/// least one workspace to land in.
///
/// # Errors
/// Returns [Error::LastControl] if only one control exists,
/// [Error::DeleteMissingControl] if no control has the given ID, or an error
/// if the store cannot be read or written.
pub fn delete_control(store: &mut dyn KeyValueStore, control_id: &str) -> Result<ControlId, Error> {
    let mut controls = get_controls(store)?;

    if controls.len() <= 1 {
        return Err(Error::LastControl);
    }

    let original_len = controls.len();
    controls.retain(|control| control.id != control_id);

    if controls.len() == original_len {
        return Err(Error::DeleteMissingControl);
    }

    // Persist the shrunken registry before dropping the transactions so a
    // failure part-way never leaves transactions without an owning control.
    save_controls(store, &controls)?;
    remove_control_transactions(store, control_id)?;

    Ok(controls[0].id.clone())
}
