//! Defines the endpoint for updating a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    transaction::{
        TransactionFeed,
        form::{TransactionForm, invalid_transaction_markup},
        update_transaction,
    },
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Notified after the transaction is saved.
    pub transaction_feed: Arc<TransactionFeed>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            transaction_feed: state.transaction_feed.clone(),
        }
    }
}

/// A route handler for updating a transaction, redirects to the transactions view on success.
///
/// An invalid form is answered with the validation message and status 422.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let builder = match form.into_builder() {
        Ok(builder) => builder,
        Err(error) => {
            tracing::debug!("Rejected update to transaction {transaction_id}: {error}");
            return (StatusCode::UNPROCESSABLE_ENTITY, invalid_transaction_markup()).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_transaction(user_id, transaction_id, builder, &connection) {
        tracing::error!("could not update transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    tracing::info!("User {user_id} updated transaction {transaction_id}");

    if let Err(error) = state.transaction_feed.refresh(user_id, &connection) {
        tracing::error!("could not publish transactions for user {user_id}: {error}");
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        endpoints,
        test_utils::{assert_hx_redirect, create_test_user, get_test_connection, lunch},
        transaction::{
            INCOME_CATEGORY, TransactionFeed, TransactionKind, create_transaction,
            form::TransactionForm, get_transaction,
        },
    };

    use super::{UpdateTransactionState, update_transaction_endpoint};

    fn salary_form() -> TransactionForm {
        TransactionForm {
            kind: TransactionKind::Income,
            amount: "500".to_owned(),
            category: "Food".to_owned(),
            date: Some(date!(2024 - 01 - 10)),
            description: "Salary".to_owned(),
            recurring: Some("on".to_owned()),
        }
    }

    #[tokio::test]
    async fn can_update_transaction() {
        let connection = get_test_connection();
        let user_id = create_test_user("test@example.com", &connection);
        let original = create_transaction(user_id, lunch(), &connection).unwrap();
        let state = UpdateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            transaction_feed: Arc::new(TransactionFeed::new()),
        };

        let response = update_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(original.id),
            Form(salary_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let updated = get_transaction(user_id, original.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(updated.kind, TransactionKind::Income);
        assert_eq!(updated.amount, 500.0);
        assert_eq!(updated.category, INCOME_CATEGORY);
        assert_eq!(updated.description, "Salary");
        assert!(updated.recurring);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn invalid_form_does_not_change_transaction() {
        let connection = get_test_connection();
        let user_id = create_test_user("test@example.com", &connection);
        let original = create_transaction(user_id, lunch(), &connection).unwrap();
        let state = UpdateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            transaction_feed: Arc::new(TransactionFeed::new()),
        };
        let mut form = salary_form();
        form.amount = "0".to_owned();

        let response = update_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(original.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let unchanged = get_transaction(user_id, original.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(unchanged, original);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let connection = get_test_connection();
        let user_id = create_test_user("test@example.com", &connection);
        let state = UpdateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            transaction_feed: Arc::new(TransactionFeed::new()),
        };

        let response =
            update_transaction_endpoint(State(state), Extension(user_id), Path(42), Form(salary_form()))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
