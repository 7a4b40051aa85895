//! Route handlers for downloading transactions as CSV, JSON or PDF.
//!
//! htmx requests only check that the export can be made and then redirect
//! the browser to the same URL, which responds with the file itself.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, list_categories},
    endpoints,
    export::{render_csv, render_json, render_pdf},
    settings::{Settings, get_settings},
    timezone::local_today,
    transaction::{Transaction, TransactionFeed, TransactionListQuery},
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading settings and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The source of the user's transactions.
    pub transaction_feed: Arc<TransactionFeed>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            transaction_feed: state.transaction_feed.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything an export may include.
struct ExportData {
    transactions: Vec<Transaction>,
    settings: Settings,
    categories: Vec<Category>,
    today: Date,
}

/// A rendered export ready to send as an attachment.
struct Download {
    content_type: &'static str,
    file_name: String,
    body: Vec<u8>,
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.content_type.to_owned()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.file_name),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

fn load_export_data(
    state: &ExportState,
    user_id: UserID,
    query: &TransactionListQuery,
) -> Result<ExportData, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let snapshot = state
        .transaction_feed
        .snapshot(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let settings = get_settings(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve settings: {error}"))?;
    let categories = list_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(ExportData {
        transactions: query.apply(&snapshot),
        settings,
        categories,
        today,
    })
}

/// Render an export and answer with either the file or, for htmx, a redirect to it.
fn export_response(
    state: &ExportState,
    user_id: UserID,
    query: &TransactionListQuery,
    is_htmx: bool,
    endpoint: &str,
    render: impl FnOnce(ExportData) -> Result<Download, Error>,
) -> Response {
    let download = load_export_data(state, user_id, query).and_then(render);

    match (download, is_htmx) {
        (Ok(_), true) => (
            HxRedirect(query.url_for(endpoint)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        (Ok(download), false) => {
            tracing::info!("User {user_id} downloaded {}", download.file_name);
            download.into_response()
        }
        (Err(error), true) => error.into_alert_response(),
        (Err(error), false) => error.into_response(),
    }
}

/// A route handler for downloading the filtered transactions as CSV.
pub async fn export_csv(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    HxRequest(is_htmx): HxRequest,
    Query(query): Query<TransactionListQuery>,
) -> Response {
    export_response(
        &state,
        user_id,
        &query,
        is_htmx,
        endpoints::EXPORT_CSV,
        |data| {
            Ok(Download {
                content_type: "text/csv; charset=utf-8",
                file_name: format!("transactions_{}.csv", data.today),
                body: render_csv(&data.transactions).into_bytes(),
            })
        },
    )
}

/// A route handler for downloading the filtered transactions, settings and
/// categories as a JSON backup.
pub async fn export_json(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    HxRequest(is_htmx): HxRequest,
    Query(query): Query<TransactionListQuery>,
) -> Response {
    export_response(
        &state,
        user_id,
        &query,
        is_htmx,
        endpoints::EXPORT_JSON,
        |data| {
            let body = render_json(&data.transactions, &data.settings, &data.categories)?;

            Ok(Download {
                content_type: "application/json",
                file_name: format!("finance_backup_{}.json", data.today),
                body: body.into_bytes(),
            })
        },
    )
}

/// A route handler for downloading the filtered transactions as a PDF report.
pub async fn export_pdf(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    HxRequest(is_htmx): HxRequest,
    Query(query): Query<TransactionListQuery>,
) -> Response {
    export_response(
        &state,
        user_id,
        &query,
        is_htmx,
        endpoints::EXPORT_PDF,
        |data| {
            Ok(Download {
                content_type: "application/pdf",
                file_name: format!("transactions_{}.pdf", data.today),
                body: render_pdf(&data.transactions, data.today)?,
            })
        },
    )
}
