use rusqlite::Connection;
use time::macros::date;

use crate::{
    auth::{PasswordHash, UserID, create_user},
    db::initialize,
    transaction::{Transaction, TransactionBuilder, TransactionKind},
};

/// An in-memory database with all tables and the default categories.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user with the email `email` and a placeholder password hash.
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> UserID {
    create_user(
        email.parse().expect("Invalid test email"),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
    .id
}

/// A $12.50 food expense on 2024-01-05.
pub(crate) fn lunch() -> TransactionBuilder {
    Transaction::build(TransactionKind::Expense, 12.5, date!(2024 - 01 - 05))
        .category("Food")
        .description("Lunch")
}
