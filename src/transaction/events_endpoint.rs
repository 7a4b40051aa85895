//! Server-sent events that tell open pages when the user's transactions change.

use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt, stream};
use rusqlite::Connection;
use tokio::sync::watch;

use crate::{
    AppState, Error,
    auth::UserID,
    transaction::{TransactionFeed, feed::Snapshot},
};

/// The name of the event sent after every change, see [crate::html::live_content].
pub const TRANSACTIONS_EVENT: &str = "transactions";

/// The state needed to stream transaction events.
#[derive(Debug, Clone)]
pub struct TransactionEventsState {
    /// The database connection for loading the first snapshot.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The latest transactions of each user.
    pub transaction_feed: Arc<TransactionFeed>,
}

impl FromRef<AppState> for TransactionEventsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            transaction_feed: state.transaction_feed.clone(),
        }
    }
}

/// The number of transactions in each new snapshot.
///
/// The stream ends when the snapshot is dropped from the feed, e.g. when the
/// user logs out.
fn snapshot_sizes(receiver: watch::Receiver<Snapshot>) -> impl Stream<Item = usize> {
    stream::unfold(receiver, |mut receiver| async move {
        receiver.changed().await.ok()?;
        let size = receiver.borrow_and_update().len();

        Some((size, receiver))
    })
}

/// Stream a `transactions` event, carrying the number of transactions, each
/// time the user's transactions change.
pub async fn get_transaction_events(
    State(state): State<TransactionEventsState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let receiver = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match state.transaction_feed.subscribe(user_id, &connection) {
            Ok(receiver) => receiver,
            Err(error) => {
                tracing::error!("could not subscribe to transactions for user {user_id}: {error}");
                return error.into_response();
            }
        }
    };

    tracing::debug!("User {user_id} subscribed to transaction events");

    let events = snapshot_sizes(receiver).map(|size| {
        Ok::<_, Infallible>(Event::default().event(TRANSACTIONS_EVENT).data(size.to_string()))
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
