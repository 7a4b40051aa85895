//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID, database_id::TransactionId};

/// The category every income transaction is filed under.
pub const INCOME_CATEGORY: &str = "Income";

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was spent or earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was spent.
    Expense,
    /// Money that was earned.
    Income,
}

impl TransactionKind {
    /// The lowercase name used in forms, exports and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            _ => Err(Error::InvalidTransaction),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is always positive, the direction of the money is given by
/// `kind`. Income transactions always have the category [INCOME_CATEGORY].
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is an expense or an income.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// The name of the category the transaction belongs to.
    ///
    /// This may refer to a category that has since been removed.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Informational flag for transactions that happen on a schedule.
    pub recurring: bool,
    /// When the transaction was first saved.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: TransactionKind, amount: f64, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            category: String::new(),
            date,
            description: String::new(),
            recurring: false,
        }
    }
}

/// A builder for creating and updating [Transaction] instances.
///
/// The builder is checked when it is written to the database, see
/// [TransactionBuilder::validate].
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::{Transaction, TransactionKind};
///
/// let lunch = Transaction::build(TransactionKind::Expense, 12.5, date!(2024-01-05))
///     .category("Food")
///     .description("Lunch");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the transaction is an expense or an income.
    pub kind: TransactionKind,
    /// The amount of money, must be a positive, finite number.
    pub amount: f64,
    /// The category name, ignored for income.
    pub category: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub description: String,
    /// Whether the transaction repeats on a schedule.
    pub recurring: bool,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        category.clone_into(&mut self.category);
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        description.clone_into(&mut self.description);
        self
    }

    /// Set whether the transaction is recurring.
    pub fn recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Check the amount and category, and file income under [INCOME_CATEGORY].
    ///
    /// # Errors
    /// Returns [Error::InvalidTransaction] if the amount is not a positive,
    /// finite number or if an expense has no category.
    pub fn validate(mut self) -> Result<Self, Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidTransaction);
        }

        match self.kind {
            TransactionKind::Income => INCOME_CATEGORY.clone_into(&mut self.category),
            TransactionKind::Expense => {
                let category = self.category.trim();

                if category.is_empty() {
                    return Err(Error::InvalidTransaction);
                }

                self.category = category.to_owned();
            }
        }

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, kind, amount, category, date, description, recurring, created_at";

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTransaction] if the builder fails validation,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\"
                (user_id, kind, amount, category, date, description, recurring, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                builder.kind,
                builder.amount,
                builder.category,
                builder.date,
                builder.description,
                builder.recurring,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Replace the fields of the transaction `id` owned by `user_id`.
///
/// The creation timestamp is kept as is.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTransaction] if the builder fails validation,
/// - [Error::UpdateMissingTransaction] if the user has no transaction with `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET kind = ?1, amount = ?2, category = ?3, date = ?4, description = ?5, recurring = ?6
             WHERE id = ?7 AND user_id = ?8
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.kind,
                builder.amount,
                builder.category,
                builder.date,
                builder.description,
                builder.recurring,
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// The number of rows removed by a delete query.
pub type RowsAffected = usize;

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )
        .map_err(|error| error.into())
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)?;

    Ok(transaction)
}

/// Get all of the transactions owned by `user_id`, newest first.
///
/// Transactions on the same date are ordered by descending ID, i.e. the most
/// recently created transaction comes first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
             WHERE user_id = ?1
             ORDER BY date DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                recurring INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // The snapshot query filters by user and sorts by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in the same order as `TRANSACTION_COLUMNS`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        recurring: row.get(6)?,
        created_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        auth::{PasswordHash, UserID, create_user},
        db::initialize,
        transaction::{
            INCOME_CATEGORY, Transaction, TransactionKind, create_transaction, delete_transaction,
            get_transaction, list_transactions, update_transaction,
        },
    };

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

    fn lunch() -> crate::transaction::TransactionBuilder {
        Transaction::build(TransactionKind::Expense, 12.5, date!(2024 - 01 - 05))
            .category("Food")
            .description("Lunch \"special\"")
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_test_connection();

        let transaction = create_transaction(user_id, lunch(), &conn).unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.date, date!(2024 - 01 - 05));
        assert_eq!(transaction.description, "Lunch \"special\"");
        assert!(!transaction.recurring);
        assert!(
            (OffsetDateTime::now_utc() - transaction.created_at).abs() < time::Duration::minutes(1)
        );
    }

    #[test]
    fn create_files_income_under_income_category() {
        let (conn, user_id) = get_test_connection();

        let transaction = create_transaction(
            user_id,
            Transaction::build(TransactionKind::Income, 500.0, date!(2024 - 01 - 10))
                .category("Shopping"),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.category, INCOME_CATEGORY);
    }

    #[test]
    fn create_fails_on_invalid_amount() {
        let (conn, user_id) = get_test_connection();

        let result = create_transaction(
            user_id,
            Transaction::build(TransactionKind::Expense, -5.0, date!(2024 - 01 - 05))
                .category("Food"),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidTransaction));
        assert_eq!(list_transactions(user_id, &conn).unwrap(), []);
    }

    #[test]
    fn get_returns_created_transaction() {
        let (conn, user_id) = get_test_connection();
        let want = create_transaction(user_id, lunch(), &conn).unwrap();

        let got = get_transaction(user_id, want.id, &conn).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn get_fails_for_other_user() {
        let (conn, user_id) = get_test_connection();
        let transaction = create_transaction(user_id, lunch(), &conn).unwrap();

        let result = get_transaction(UserID::new(user_id.as_i64() + 1), transaction.id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_fields_and_keeps_created_at() {
        let (conn, user_id) = get_test_connection();
        let original = create_transaction(user_id, lunch(), &conn).unwrap();

        let updated = update_transaction(
            user_id,
            original.id,
            Transaction::build(TransactionKind::Expense, 20.0, date!(2024 - 02 - 01))
                .category("Transport")
                .description("Bus")
                .recurring(true),
            &conn,
        )
        .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.category, "Transport");
        assert_eq!(updated.date, date!(2024 - 02 - 01));
        assert_eq!(updated.description, "Bus");
        assert!(updated.recurring);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (conn, user_id) = get_test_connection();

        let result = update_transaction(user_id, 42, lunch(), &conn);

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let (conn, user_id) = get_test_connection();
        let transaction = create_transaction(user_id, lunch(), &conn).unwrap();

        let rows_affected = delete_transaction(user_id, transaction.id, &conn).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            get_transaction(user_id, transaction.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_ignores_other_users_transactions() {
        let (conn, user_id) = get_test_connection();
        let transaction = create_transaction(user_id, lunch(), &conn).unwrap();

        let rows_affected =
            delete_transaction(UserID::new(user_id.as_i64() + 1), transaction.id, &conn).unwrap();

        assert_eq!(rows_affected, 0);
        assert!(get_transaction(user_id, transaction.id, &conn).is_ok());
    }

    #[test]
    fn list_orders_by_date_descending() {
        let (conn, user_id) = get_test_connection();
        let dates = [
            date!(2024 - 01 - 05),
            date!(2024 - 03 - 01),
            date!(2024 - 02 - 10),
            date!(2024 - 03 - 01),
        ];
        for date in dates {
            create_transaction(
                user_id,
                Transaction::build(TransactionKind::Expense, 1.0, date).category("Food"),
                &conn,
            )
            .unwrap();
        }

        let transactions = list_transactions(user_id, &conn).unwrap();

        let got: Vec<_> = transactions.iter().map(|t| (t.date, t.id)).collect();
        assert_eq!(
            got,
            [
                (date!(2024 - 03 - 01), 4),
                (date!(2024 - 03 - 01), 2),
                (date!(2024 - 02 - 10), 3),
                (date!(2024 - 01 - 05), 1),
            ]
        );
    }

    #[test]
    fn list_only_returns_own_transactions() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            "other@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        create_transaction(user_id, lunch(), &conn).unwrap();
        create_transaction(other_user.id, lunch(), &conn).unwrap();

        let transactions = list_transactions(user_id, &conn).unwrap();

        assert_eq!(transactions.len(), 1);
    }
}
