//! Renders transactions as a paginated A4 report.

use std::ops::Range;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use time::Date;

use crate::{
    Error,
    engine::summarize,
    html::format_currency,
    transaction::{Transaction, TransactionKind},
};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LAYER_NAME: &str = "Transactions";

const LEFT_MARGIN: f32 = 15.0;
const TOP_LINE: f32 = 277.0;
const ROW_HEIGHT: f32 = 6.0;
const FOOTER_LINE: f32 = 12.0;

/// Rows on the first page, which also holds the title and totals.
const FIRST_PAGE_ROWS: usize = 36;
/// Rows on every page after the first.
const PAGE_ROWS: usize = 40;

const TITLE_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 9.0;

/// The table columns as (heading, x position, maximum characters).
const COLUMNS: [(&str, f32, usize); 5] = [
    ("Date", LEFT_MARGIN, 10),
    ("Type", 40.0, 7),
    ("Category", 60.0, 16),
    ("Description", 95.0, 38),
    ("Amount", 168.0, 16),
];

/// Render `transactions` as a PDF table, with a title and `generated_on` as the date of the report.
///
/// # Errors
/// Returns [Error::NothingToExport] if `transactions` is empty, or
/// [Error::PdfExportError] if the document could not be written.
pub fn render_pdf(transactions: &[Transaction], generated_on: Date) -> Result<Vec<u8>, Error> {
    if transactions.is_empty() {
        return Err(Error::NothingToExport);
    }

    let (document, first_page, first_layer) =
        PdfDocument::new("Spendwise Transactions", PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
    let regular = document
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = document
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let pages = page_ranges(transactions.len());
    let page_count = pages.len();

    for (page_number, rows) in pages.into_iter().enumerate() {
        let layer = if page_number == 0 {
            document.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = document.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
            document.get_page(page).get_layer(layer)
        };

        let mut y = TOP_LINE;

        if page_number == 0 {
            layer.use_text("Spendwise Transactions", TITLE_SIZE, Mm(LEFT_MARGIN), Mm(y), &bold);
            y -= 7.0;
            layer.use_text(
                format!("Generated {generated_on}"),
                TEXT_SIZE,
                Mm(LEFT_MARGIN),
                Mm(y),
                &regular,
            );
            y -= 6.0;
            layer.use_text(totals_line(transactions), TEXT_SIZE, Mm(LEFT_MARGIN), Mm(y), &regular);
            y -= 10.0;
        }

        draw_header(&layer, y, &bold);
        y -= ROW_HEIGHT;

        for transaction in &transactions[rows] {
            draw_row(&layer, y, transaction, &regular);
            y -= ROW_HEIGHT;
        }

        layer.use_text(
            format!("Page {} of {page_count}", page_number + 1),
            TABLE_SIZE,
            Mm(LEFT_MARGIN),
            Mm(FOOTER_LINE),
            &regular,
        );
    }

    document.save_to_bytes().map_err(pdf_error)
}

fn pdf_error(error: printpdf::Error) -> Error {
    tracing::error!("could not render PDF: {error:?}");
    Error::PdfExportError(format!("{error:?}"))
}

/// Split `row_count` rows into the ranges that fit on each page.
fn page_ranges(row_count: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = FIRST_PAGE_ROWS;

    while start < row_count {
        let end = (start + capacity).min(row_count);
        pages.push(start..end);
        start = end;
        capacity = PAGE_ROWS;
    }

    pages
}

fn totals_line(transactions: &[Transaction]) -> String {
    let summary = summarize(transactions);

    format!(
        "Income {}   Expenses {}   Net {}",
        format_currency(summary.total_income),
        format_currency(summary.total_expenses),
        format_currency(summary.net_balance)
    )
}

fn draw_header(layer: &PdfLayerReference, y: f32, font: &IndirectFontRef) {
    for (heading, x, _) in COLUMNS {
        layer.use_text(heading, TABLE_SIZE, Mm(x), Mm(y), font);
    }
}

fn draw_row(layer: &PdfLayerReference, y: f32, transaction: &Transaction, font: &IndirectFontRef) {
    let amount = match transaction.kind {
        TransactionKind::Income => format!("+{}", format_currency(transaction.amount)),
        TransactionKind::Expense => format!("-{}", format_currency(transaction.amount)),
    };
    let cells = [
        transaction.date.to_string(),
        transaction.kind.to_string(),
        transaction.category.clone(),
        transaction.description.clone(),
        amount,
    ];

    for ((_, x, max_chars), cell) in COLUMNS.iter().zip(cells) {
        layer.use_text(pdf_text(&cell, *max_chars), TABLE_SIZE, Mm(*x), Mm(y), font);
    }
}

/// Fit `text` to the builtin fonts and to at most `max_chars` characters.
///
/// The builtin fonts only cover printable ASCII, anything else becomes '?'.
fn pdf_text(text: &str, max_chars: usize) -> String {
    let mut cleaned: String = text
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect();

    if cleaned.len() > max_chars {
        cleaned.truncate(max_chars.saturating_sub(3));
        cleaned.push_str("...");
    }

    cleaned
}
