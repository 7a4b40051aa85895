//! Renders transactions as comma separated values.

use crate::transaction::Transaction;

/// The first line of every CSV export.
pub const CSV_HEADER: &str = "Date,Type,Category,Description,Amount,Recurring";

/// Render `transactions` as CSV, one row per transaction after the header.
///
/// The description is always quoted and the category only when it contains a
/// delimiter, quote or line break. Rows are separated by `\n` with no
/// trailing newline, so an empty list renders just the header.
pub fn render_csv(transactions: &[Transaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(CSV_HEADER.to_owned());
    lines.extend(transactions.iter().map(csv_row));

    lines.join("\n")
}

fn csv_row(transaction: &Transaction) -> String {
    format!(
        "{},{},{},\"{}\",{},{}",
        transaction.date,
        transaction.kind,
        escape_field(&transaction.category),
        transaction.description.replace('"', "\"\""),
        transaction.amount,
        if transaction.recurring { "yes" } else { "no" }
    )
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
