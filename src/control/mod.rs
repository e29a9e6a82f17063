//! Financial controls: independent workspaces that each hold their own set
//! of transactions.

mod controls_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod select_endpoint;
mod selection;

pub(crate) use controls_page::get_controls_page;
pub(crate) use core::{ControlId, FinancialControl, ensure_default_control};
pub(crate) use create_endpoint::create_control_endpoint;
pub(crate) use create_page::get_new_control_page;
pub(crate) use delete_endpoint::delete_control_endpoint;
pub(crate) use edit_endpoint::edit_control_endpoint;
pub(crate) use edit_page::get_edit_control_page;
pub(crate) use select_endpoint::select_control_endpoint;
pub(crate) use selection::resolve_selected_control;

#[cfg(test)]
pub(crate) use core::{ControlDetails, create_control, delete_control, get_controls};
