//! The dashboard: an overview page with headline totals and charts for the
//! active financial control.

mod aggregation;
mod cards;
mod charts;
mod dashboard_page;

pub(crate) use dashboard_page::get_dashboard_page;
