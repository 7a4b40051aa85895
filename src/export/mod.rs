//! Downloads of the user's transactions as CSV, JSON and PDF files.

mod csv;
mod handlers;
mod json;
mod pdf;

pub use csv::render_csv;
pub use handlers::{export_csv, export_json, export_pdf};
pub use json::render_json;
pub use pdf::render_pdf;

#[cfg(test)]
pub(crate) use csv::CSV_HEADER;
