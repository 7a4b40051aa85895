//! Defines the category model and the database queries for categories.
//!
//! Categories are shared by every user of the installation. A transaction
//! stores the category *name*, so removing a category never changes the
//! transactions filed under it.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId, transaction::INCOME_CATEGORY};

/// Alias for the ID of a row in the category table.
pub type CategoryId = DatabaseId;

/// The icon suggested for a new category.
pub const DEFAULT_NEW_CATEGORY_ICON: &str = "🏷️";
/// The colour suggested for a new category.
pub const DEFAULT_NEW_CATEGORY_COLOR: &str = "#A3A3A3";

/// The categories every installation starts with, as `(name, colour, icon)`.
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 7] = [
    ("Food", "#FF6384", "🍔"),
    ("Transport", "#36A2EB", "🚗"),
    ("Shopping", "#FFCE56", "🛍️"),
    ("Utilities", "#4BC0C0", "💡"),
    ("Entertainment", "#9966FF", "🎬"),
    ("Health", "#FF9F40", "❤️"),
    ("Other", "#C9CBCF", "❓"),
];

/// How a category is drawn: its name, colour and icon.
///
/// This is what the views use, since a transaction may name a category that
/// has since been removed, see [category_style].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    /// The category name.
    pub name: String,
    /// A CSS hex colour, e.g. "#FF6384".
    pub color: String,
    /// A short glyph, usually an emoji.
    pub icon: String,
}

impl CategoryStyle {
    /// How income transactions are displayed.
    pub fn income() -> Self {
        Self {
            name: INCOME_CATEGORY.to_owned(),
            color: "#22C55E".to_owned(),
            icon: "💰".to_owned(),
        }
    }

    /// How transactions with an unknown category are displayed.
    pub fn fallback() -> Self {
        Self {
            name: "Other".to_owned(),
            color: "#CCCCCC".to_owned(),
            icon: "❓".to_owned(),
        }
    }
}

/// A named, coloured label for expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    #[serde(skip)]
    pub id: CategoryId,
    /// The category name, unique ignoring case.
    pub name: String,
    /// A CSS hex colour, e.g. "#FF6384".
    pub color: String,
    /// A short glyph, usually an emoji.
    pub icon: String,
}

impl Category {
    /// The colour and icon used when displaying this category.
    pub fn style(&self) -> CategoryStyle {
        CategoryStyle {
            name: self.name.clone(),
            color: self.color.clone(),
            icon: self.icon.clone(),
        }
    }
}

/// Look up how the category called `name` should be displayed.
///
/// The income category always uses [CategoryStyle::income], and names that
/// are not in `categories` use [CategoryStyle::fallback].
pub fn category_style(name: &str, categories: &[Category]) -> CategoryStyle {
    if name == INCOME_CATEGORY {
        return CategoryStyle::income();
    }

    categories
        .iter()
        .find(|category| category.name == name)
        .map(Category::style)
        .unwrap_or_else(CategoryStyle::fallback)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the category table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            color TEXT NOT NULL,
            icon TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert [DEFAULT_CATEGORIES] if the category table is empty.
///
/// Categories the user has removed are not added back on the next start
/// unless every category has been removed.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM category", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    let mut statement =
        connection.prepare("INSERT INTO category (name, color, icon) VALUES (?1, ?2, ?3)")?;

    for (name, color, icon) in DEFAULT_CATEGORIES {
        statement.execute((name, color, icon))?;
    }

    Ok(())
}

/// Add a category.
///
/// Surrounding whitespace is removed from each field.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the name is empty or another category has
///   the same name, ignoring case,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: &str,
    color: &str,
    icon: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::InvalidCategory(name.to_owned()));
    }

    connection
        .prepare(
            "INSERT INTO category (name, color, icon) VALUES (?1, ?2, ?3)
             RETURNING id, name, color, icon",
        )?
        .query_row((name, color.trim(), icon.trim()), map_category_row)
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 2067 => {
                Error::InvalidCategory(name.to_owned())
            }
            error => error.into(),
        })
}

/// Get all categories in the order they were added.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, color, icon FROM category ORDER BY id ASC")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Remove the category `id`.
///
/// Transactions filed under the category keep its name.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if there is no category with `id`,
/// - [Error::ProtectedCategory] if the category is the income category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let name: String = connection
        .query_row("SELECT name FROM category WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingCategory,
            error => error.into(),
        })?;

    if name == INCOME_CATEGORY {
        return Err(Error::ProtectedCategory);
    }

    connection.execute("DELETE FROM category WHERE id = ?1", [id])?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
    })
}

#[cfg(test)]
mod category_style_tests {
    use crate::category::{Category, CategoryStyle, category_style};

    fn food() -> Category {
        Category {
            id: 1,
            name: "Food".to_owned(),
            color: "#FF6384".to_owned(),
            icon: "🍔".to_owned(),
        }
    }

    #[test]
    fn known_category_uses_its_style() {
        let style = category_style("Food", &[food()]);

        assert_eq!(style, food().style());
    }

    #[test]
    fn unknown_category_uses_fallback() {
        let style = category_style("Gifts", &[food()]);

        assert_eq!(
            style,
            CategoryStyle {
                name: "Other".to_owned(),
                color: "#CCCCCC".to_owned(),
                icon: "❓".to_owned(),
            }
        );
    }

    #[test]
    fn income_uses_income_style() {
        let style = category_style("Income", &[]);

        assert_eq!(style.color, "#22C55E");
        assert_eq!(style.icon, "💰");
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            DEFAULT_CATEGORIES, create_category, create_category_table, delete_category,
            list_categories, seed_default_categories,
        },
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).unwrap();
        connection
    }

    #[test]
    fn seed_inserts_defaults_in_order() {
        let connection = get_test_connection();

        seed_default_categories(&connection).unwrap();

        let names: Vec<String> = list_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();
        let want: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names, want);
    }

    #[test]
    fn seed_does_not_duplicate_defaults() {
        let connection = get_test_connection();

        seed_default_categories(&connection).unwrap();
        seed_default_categories(&connection).unwrap();

        assert_eq!(
            list_categories(&connection).unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();

        let category = create_category(" Gifts ", "#123456", "🎁", &connection).unwrap();

        assert_eq!(category.name, "Gifts");
        assert_eq!(category.color, "#123456");
        assert_eq!(category.icon, "🎁");
        assert_eq!(list_categories(&connection).unwrap(), [category]);
    }

    #[test]
    fn create_category_rejects_duplicate_name_ignoring_case() {
        let connection = get_test_connection();
        seed_default_categories(&connection).unwrap();

        let result = create_category("food", "#000000", "🍕", &connection);

        assert_eq!(result, Err(Error::InvalidCategory("food".to_owned())));
        assert_eq!(
            list_categories(&connection).unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }

    #[test]
    fn create_category_rejects_empty_name() {
        let connection = get_test_connection();

        let result = create_category("   ", "#000000", "🍕", &connection);

        assert_eq!(result, Err(Error::InvalidCategory(String::new())));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_connection();
        let category = create_category("Gifts", "#123456", "🎁", &connection).unwrap();

        delete_category(category.id, &connection).unwrap();

        assert_eq!(list_categories(&connection).unwrap(), []);
    }

    #[test]
    fn delete_missing_category_fails() {
        let connection = get_test_connection();

        let result = delete_category(42, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn delete_income_category_fails() {
        let connection = get_test_connection();
        let income = create_category("Income", "#22C55E", "💰", &connection).unwrap();

        let result = delete_category(income.id, &connection);

        assert_eq!(result, Err(Error::ProtectedCategory));
        assert_eq!(list_categories(&connection).unwrap(), [income]);
    }
}
