//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    category::list_categories,
    timezone::local_today,
    transaction::{
        TransactionFeed, create_page::new_transaction_form, create_transaction,
        form::{TransactionForm, invalid_transaction_markup},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Notified after the transaction is saved.
    pub transaction_feed: Arc<TransactionFeed>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            transaction_feed: state.transaction_feed.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Responds with a blank form and a notice on success. An invalid form is
/// answered with the validation message and status 422, and nothing is saved.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let builder = match form.into_builder() {
        Ok(builder) => builder,
        Err(error) => {
            tracing::debug!("Rejected new transaction: {error}");
            return (StatusCode::UNPROCESSABLE_ENTITY, invalid_transaction_markup()).into_response();
        }
    };

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = match create_transaction(user_id, builder, &connection) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!("User {user_id} added transaction {}", transaction.id);

    if let Err(error) = state.transaction_feed.refresh(user_id, &connection) {
        tracing::error!("could not publish transactions for user {user_id}: {error}");
    }

    let categories = match list_categories(&connection) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Failed to retrieve categories: {error}");
            return error.into_alert_response();
        }
    };

    let alert = Alert::SuccessSimple {
        message: "Transaction added".to_owned(),
    };

    html! {
        (new_transaction_form(today, &categories))
        (alert.into_html())
    }
    .into_response()
}
