//! Renders a backup of the user's data as JSON.

use serde::Serialize;

use crate::{Error, category::Category, settings::Settings, transaction::Transaction};

/// The document written by the JSON export.
#[derive(Debug, Serialize)]
pub struct Backup<'a> {
    /// The exported transactions.
    pub transactions: &'a [Transaction],
    /// The user's settings at the time of the export.
    pub settings: &'a Settings,
    /// The categories available at the time of the export.
    pub categories: &'a [Category],
}

/// Render `transactions`, `settings` and `categories` as pretty-printed JSON.
///
/// # Errors
/// Returns [Error::NothingToExport] if `transactions` is empty, or
/// [Error::JSONSerializationError] if the document could not be serialized.
pub fn render_json(
    transactions: &[Transaction],
    settings: &Settings,
    categories: &[Category],
) -> Result<String, Error> {
    if transactions.is_empty() {
        return Err(Error::NothingToExport);
    }

    let backup = Backup {
        transactions,
        settings,
        categories,
    };

    serde_json::to_string_pretty(&backup)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        Error,
        category::Category,
        settings::{Settings, Theme},
        transaction::{Transaction, TransactionKind},
    };

    use super::render_json;

    fn lunch() -> Transaction {
        Transaction {
            id: 1,
            kind: TransactionKind::Expense,
            amount: 12.5,
            category: "Food".to_owned(),
            date: date!(2024 - 01 - 05),
            description: "Lunch".to_owned(),
            recurring: false,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn food() -> Category {
        Category {
            id: 1,
            name: "Food".to_owned(),
            color: "#FF6384".to_owned(),
            icon: "🍔".to_owned(),
        }
    }

    #[test]
    fn refuses_empty_list() {
        let result = render_json(&[], &Settings::default(), &[food()]);

        assert_eq!(result, Err(Error::NothingToExport));
    }

    #[test]
    fn contains_transactions_settings_and_categories() {
        let settings = Settings {
            theme: Theme::Dark,
            budget: 1500.0,
        };

        let rendered = render_json(&[lunch()], &settings, &[food()]).unwrap();

        assert!(rendered.contains('\n'), "want pretty-printed JSON");
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["settings"], json!({ "theme": "dark", "budget": 1500.0 }));
        assert_eq!(
            value["categories"],
            json!([{ "name": "Food", "color": "#FF6384", "icon": "🍔" }])
        );

        let transaction = &value["transactions"][0];
        assert_eq!(transaction["type"], "expense");
        assert_eq!(transaction["amount"], 12.5);
        assert_eq!(transaction["category"], "Food");
        assert_eq!(transaction["date"], "2024-01-05");
        assert_eq!(transaction["description"], "Lunch");
        assert_eq!(transaction["recurring"], false);
    }
}
