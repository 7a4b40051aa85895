//! The per-user settings document: the monthly budget and colour theme.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID};

/// The monthly budget for users that have not set one.
pub const DEFAULT_BUDGET: f64 = 1000.0;

/// The colour scheme of the user interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on a light background.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl Theme {
    /// The lowercase name used in forms, exports and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme \"{other}\"")),
        }
    }
}

impl ToSql for Theme {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Theme {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A user's settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The colour scheme.
    pub theme: Theme,
    /// The spending ceiling for a month, in dollars.
    pub budget: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            budget: DEFAULT_BUDGET,
        }
    }
}

/// A partial update to [Settings].
///
/// Fields that are `None` keep their stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsPatch {
    /// The new colour scheme, if it should change.
    pub theme: Option<Theme>,
    /// The new monthly budget, if it should change.
    pub budget: Option<f64>,
}

/// Create the settings table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            user_id INTEGER PRIMARY KEY,
            theme TEXT NOT NULL CHECK (theme IN ('light', 'dark')),
            budget REAL NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Get the settings for `user_id`, or the defaults if the user has never saved any.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_settings(user_id: UserID, connection: &Connection) -> Result<Settings, Error> {
    let settings = connection
        .query_row(
            "SELECT theme, budget FROM settings WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| {
                Ok(Settings {
                    theme: row.get(0)?,
                    budget: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(settings.unwrap_or_default())
}

/// Merge `patch` into the stored settings for `user_id` and return the result.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn save_settings(
    user_id: UserID,
    patch: SettingsPatch,
    connection: &Connection,
) -> Result<Settings, Error> {
    let defaults = Settings::default();

    let settings = connection
        .prepare(
            "INSERT INTO settings (user_id, theme, budget)
             VALUES (?1, COALESCE(?2, ?4), COALESCE(?3, ?5))
             ON CONFLICT(user_id) DO UPDATE SET
                theme = COALESCE(?2, theme),
                budget = COALESCE(?3, budget)
             RETURNING theme, budget",
        )?
        .query_row(
            (
                user_id.as_i64(),
                patch.theme,
                patch.budget,
                defaults.theme,
                defaults.budget,
            ),
            |row| {
                Ok(Settings {
                    theme: row.get(0)?,
                    budget: row.get(1)?,
                })
            },
        )?;

    Ok(settings)
}
