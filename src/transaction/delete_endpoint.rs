//! Defines the endpoint for deleting a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    database_id::TransactionId,
    transaction::{TransactionFeed, delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Notified after the transaction is removed.
    pub transaction_feed: Arc<TransactionFeed>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            transaction_feed: state.transaction_feed.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(user_id, transaction_id, &connection) {
        Ok(0) => Error::DeleteMissingTransaction.into_alert_response(),
        Ok(_) => {
            tracing::info!("User {user_id} deleted transaction {transaction_id}");

            if let Err(error) = state.transaction_feed.refresh(user_id, &connection) {
                tracing::error!("could not publish transactions for user {user_id}: {error}");
            }

            // The status code has to be 200 OK or HTMX will not delete the table row.
            Alert::SuccessSimple {
                message: "Transaction deleted".to_owned(),
            }
            .into_html()
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        test_utils::{create_test_user, get_test_connection, lunch},
        transaction::{TransactionFeed, create_transaction, get_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn can_delete_transaction() {
        let connection = get_test_connection();
        let user_id = create_test_user("test@example.com", &connection);
        let transaction = create_transaction(user_id, lunch(), &connection).unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            transaction_feed: Arc::new(TransactionFeed::new()),
        };

        let response =
            delete_transaction_endpoint(State(state.clone()), Extension(user_id), Path(transaction.id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_transaction(user_id, transaction.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn cannot_delete_other_users_transaction() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection);
        let someone_else = create_test_user("someone@example.com", &connection);
        let transaction = create_transaction(owner, lunch(), &connection).unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            transaction_feed: Arc::new(TransactionFeed::new()),
        };

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(someone_else),
            Path(transaction.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(get_transaction(owner, transaction.id, &state.db_connection.lock().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn delete_publishes_snapshot() {
        let connection = get_test_connection();
        let user_id = create_test_user("test@example.com", &connection);
        let transaction = create_transaction(user_id, lunch(), &connection).unwrap();
        let feed = Arc::new(TransactionFeed::new());
        let mut receiver = feed.subscribe(user_id, &connection).unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            transaction_feed: feed.clone(),
        };

        delete_transaction_endpoint(State(state), Extension(user_id), Path(transaction.id)).await;

        assert!(receiver.has_changed().unwrap());
        assert!(receiver.borrow_and_update().is_empty());
    }
}
