//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    auth::{create_provider_sign_in_table, create_user_table},
    category::{create_category_table, seed_default_categories},
    settings::create_settings_table,
    transaction::create_transaction_table,
};

/// Create the application's tables if they do not exist, and add the default
/// categories to a new database.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
/// No changes are made in that case.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_provider_sign_in_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_settings_table(&transaction)?;
    create_category_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}
