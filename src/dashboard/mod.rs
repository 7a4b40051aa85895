//! The dashboard: totals, budget progress and charts for a chosen time range.

mod cards;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
