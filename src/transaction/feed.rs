//! Keeps the latest snapshot of each user's transactions and notifies
//! subscribers when it changes.
//!
//! Every write to the transaction table must be followed by [TransactionFeed::refresh]
//! while the database lock is still held, so that subscribers never see a
//! snapshot older than a completed write.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;
use tokio::sync::watch;

use crate::{
    Error,
    auth::UserID,
    transaction::{Transaction, list_transactions},
};

/// All of a user's transactions ordered by date, newest first.
pub type Snapshot = Arc<Vec<Transaction>>;

/// Per-user snapshots of transactions with change notification.
#[derive(Debug, Default)]
pub struct TransactionFeed {
    channels: Mutex<HashMap<UserID, watch::Sender<Snapshot>>>,
}

impl TransactionFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_channels(&self) -> Result<MutexGuard<'_, HashMap<UserID, watch::Sender<Snapshot>>>, Error> {
        self.channels
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire transaction feed lock: {error}"))
            .map_err(|_| Error::FeedLockError)
    }

    /// Replace the snapshot for `user_id` and notify its subscribers.
    ///
    /// # Errors
    /// Returns [Error::FeedLockError] if the feed lock is poisoned.
    pub fn publish(&self, user_id: UserID, snapshot: Snapshot) -> Result<(), Error> {
        let mut channels = self.lock_channels()?;

        match channels.get(&user_id) {
            Some(sender) => {
                sender.send_replace(snapshot);
            }
            None => {
                let (sender, _) = watch::channel(snapshot);
                channels.insert(user_id, sender);
            }
        }

        Ok(())
    }

    /// Reload the transactions for `user_id` from the database and publish them.
    ///
    /// If the transactions cannot be read the cached snapshot is dropped, so
    /// the next read goes back to the database instead of serving stale data.
    ///
    /// # Errors
    /// Returns an error if the transactions could not be read or the feed lock is poisoned.
    pub fn refresh(&self, user_id: UserID, connection: &Connection) -> Result<Snapshot, Error> {
        let transactions = list_transactions(user_id, connection).inspect_err(|error| {
            tracing::warn!("dropping cached transactions for user {user_id}: {error}");
            self.forget(user_id);
        })?;
        let snapshot = Arc::new(transactions);
        self.publish(user_id, snapshot.clone())?;

        tracing::debug!(
            "published {} transactions for user {user_id}",
            snapshot.len()
        );

        Ok(snapshot)
    }

    /// Get the current snapshot for `user_id`, loading it from the database on first use.
    ///
    /// # Errors
    /// Returns an error if the transactions could not be read or the feed lock is poisoned.
    pub fn snapshot(&self, user_id: UserID, connection: &Connection) -> Result<Snapshot, Error> {
        if let Some(sender) = self.lock_channels()?.get(&user_id) {
            return Ok(sender.borrow().clone());
        }

        self.refresh(user_id, connection)
    }

    /// Subscribe to changes to the snapshot for `user_id`.
    ///
    /// The receiver starts with the current snapshot marked as seen.
    ///
    /// # Errors
    /// Returns an error if the transactions could not be read or the feed lock is poisoned.
    pub fn subscribe(
        &self,
        user_id: UserID,
        connection: &Connection,
    ) -> Result<watch::Receiver<Snapshot>, Error> {
        if let Some(sender) = self.lock_channels()?.get(&user_id) {
            return Ok(sender.subscribe());
        }

        self.refresh(user_id, connection)?;

        self.lock_channels()?
            .get(&user_id)
            .map(|sender| sender.subscribe())
            .ok_or(Error::FeedLockError)
    }

    /// Drop the snapshot for `user_id`, e.g. when they log out.
    ///
    /// Open subscriptions end once the snapshot is dropped.
    pub fn forget(&self, user_id: UserID) {
        match self.channels.lock() {
            Ok(mut channels) => {
                channels.remove(&user_id);
            }
            Err(error) => {
                tracing::error!("could not acquire transaction feed lock: {error}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserID, create_user},
        db::initialize,
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    use super::TransactionFeed;

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (conn, user.id)
    }

    fn create_lunch(user_id: UserID, conn: &Connection) {
        create_transaction(
            user_id,
            Transaction::build(TransactionKind::Expense, 12.5, date!(2024 - 01 - 05))
                .category("Food"),
            conn,
        )
        .unwrap();
    }

    #[test]
    fn snapshot_loads_from_database() {
        let (conn, user_id) = get_test_connection();
        create_lunch(user_id, &conn);
        let feed = TransactionFeed::new();

        let snapshot = feed.snapshot(user_id, &conn).unwrap();

        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn snapshot_is_cached_until_refreshed() {
        let (conn, user_id) = get_test_connection();
        let feed = TransactionFeed::new();
        assert!(feed.snapshot(user_id, &conn).unwrap().is_empty());

        create_lunch(user_id, &conn);
        assert!(feed.snapshot(user_id, &conn).unwrap().is_empty());

        feed.refresh(user_id, &conn).unwrap();
        assert_eq!(feed.snapshot(user_id, &conn).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_refreshed_snapshot() {
        let (conn, user_id) = get_test_connection();
        let feed = TransactionFeed::new();
        let mut receiver = feed.subscribe(user_id, &conn).unwrap();
        assert!(!receiver.has_changed().unwrap());

        create_lunch(user_id, &conn);
        feed.refresh(user_id, &conn).unwrap();

        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow_and_update().len(), 1);
    }

    #[test]
    fn failed_refresh_drops_stale_snapshot() {
        let (conn, user_id) = get_test_connection();
        let feed = TransactionFeed::new();
        assert!(feed.snapshot(user_id, &conn).unwrap().is_empty());
        create_lunch(user_id, &conn);

        conn.execute("ALTER TABLE \"transaction\" RENAME TO moved", ())
            .unwrap();
        assert!(feed.refresh(user_id, &conn).is_err());
        conn.execute("ALTER TABLE moved RENAME TO \"transaction\"", ())
            .unwrap();

        assert_eq!(feed.snapshot(user_id, &conn).unwrap().len(), 1);
    }

    #[test]
    fn publish_replaces_snapshot_wholesale() {
        let (conn, user_id) = get_test_connection();
        create_lunch(user_id, &conn);
        let feed = TransactionFeed::new();
        feed.snapshot(user_id, &conn).unwrap();

        feed.publish(user_id, Arc::new(Vec::new())).unwrap();

        assert!(feed.snapshot(user_id, &conn).unwrap().is_empty());
    }

    #[tokio::test]
    async fn forget_ends_subscriptions() {
        let (conn, user_id) = get_test_connection();
        let feed = TransactionFeed::new();
        let mut receiver = feed.subscribe(user_id, &conn).unwrap();

        feed.forget(user_id);

        assert!(receiver.changed().await.is_err());
    }

    #[test]
    fn users_have_separate_snapshots() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            "other@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        create_lunch(user_id, &conn);
        let feed = TransactionFeed::new();

        assert_eq!(feed.snapshot(user_id, &conn).unwrap().len(), 1);
        assert!(feed.snapshot(other_user.id, &conn).unwrap().is_empty());
    }
}
