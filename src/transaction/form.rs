//! The entry form shared by the new and edit transaction pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::Category,
    error::INVALID_TRANSACTION_MESSAGE,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::{Transaction, TransactionBuilder, TransactionKind},
};

/// The ID of the element that validation errors are swapped into.
pub const FORM_ERROR_ID: &str = "form-error";

/// The values the form fields start with.
pub struct TransactionFormDefaults<'a> {
    pub kind: TransactionKind,
    pub amount: Option<f64>,
    pub category: &'a str,
    pub date: Date,
    pub description: &'a str,
    pub recurring: bool,
}

impl<'a> TransactionFormDefaults<'a> {
    /// An empty expense dated `today`.
    pub fn new(today: Date) -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount: None,
            category: "",
            date: today,
            description: "",
            recurring: false,
        }
    }

    /// The values of an existing transaction.
    pub fn from_transaction(transaction: &'a Transaction) -> Self {
        Self {
            kind: transaction.kind,
            amount: Some(transaction.amount),
            category: &transaction.category,
            date: transaction.date,
            description: &transaction.description,
            recurring: transaction.recurring,
        }
    }
}

fn kind_option(kind: TransactionKind, label: &str, checked: bool) -> Markup {
    let id = format!("transaction-type-{kind}");

    html! {
        div class="flex items-center gap-3"
        {
            input
                name="type"
                id=(id)
                type="radio"
                value=(kind)
                checked[checked]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label
                for=(id)
                class=(FORM_RADIO_LABEL_STYLE)
            {
                (label)
            }
        }
    }
}

/// The inputs for a transaction, without the surrounding form element.
///
/// `categories` fill the category select. A category that has since been
/// removed is kept as an option so that editing does not silently change it.
pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
) -> Markup {
    let is_expense = defaults.kind == TransactionKind::Expense;
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));
    let is_orphan_category = !defaults.category.is_empty()
        && !categories
            .iter()
            .any(|category| category.name == defaults.category);

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                (kind_option(TransactionKind::Expense, "Expense", is_expense))
                (kind_option(TransactionKind::Income, "Income", !is_expense))
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="text"
                    inputmode="decimal"
                    placeholder="0.00"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a category" }

                @for category in categories {
                    option
                        value=(category.name)
                        selected[category.name == defaults.category]
                    {
                        (category.icon) " " (category.name)
                    }
                }

                @if is_orphan_category {
                    option value=(defaults.category) selected { (defaults.category) }
                }
            }

            p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
            {
                "Income is always filed under Income."
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=(defaults.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div class="flex items-center gap-2"
        {
            input
                name="recurring"
                id="recurring"
                type="checkbox"
                checked[defaults.recurring]
                class="w-4 h-4 rounded border-gray-300";

            label for="recurring" class="text-sm text-gray-900 dark:text-white" { "Recurring" }
        }

        (form_error(None))
    }
}

/// The placeholder for validation errors, or the error itself.
pub fn form_error(message: Option<&str>) -> Markup {
    html! {
        p id=(FORM_ERROR_ID) class="text-red-500 text-base"
        {
            @if let Some(message) = message {
                (message)
            }
        }
    }
}

/// The form data for creating or updating a transaction.
///
/// Fields are kept as entered so that every problem is reported with the
/// same message instead of a deserialization error.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Either "expense" or "income".
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount as typed by the user.
    #[serde(default)]
    pub amount: String,
    /// The category name, ignored for income.
    #[serde(default)]
    pub category: String,
    /// The date of the transaction, `None` if the field was left empty.
    #[serde(default)]
    pub date: Option<Date>,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
    /// Present when the recurring checkbox is ticked.
    #[serde(default)]
    pub recurring: Option<String>,
}

impl TransactionForm {
    /// Parse and check the form.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransaction] if the amount is not a positive
    /// number, the date is missing or an expense has no category.
    pub fn into_builder(self) -> Result<TransactionBuilder, Error> {
        let amount: f64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| Error::InvalidTransaction)?;
        let date = self.date.ok_or(Error::InvalidTransaction)?;

        Transaction::build(self.kind, amount, date)
            .category(&self.category)
            .description(self.description.trim())
            .recurring(self.recurring.is_some())
            .validate()
    }
}

/// The inline validation message as a response body.
pub fn invalid_transaction_markup() -> Markup {
    form_error(Some(INVALID_TRANSACTION_MESSAGE))
}

#[cfg(test)]
mod form_tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{INCOME_CATEGORY, TransactionKind},
    };

    use super::TransactionForm;

    fn form(kind: TransactionKind, amount: &str, category: &str) -> TransactionForm {
        TransactionForm {
            kind,
            amount: amount.to_owned(),
            category: category.to_owned(),
            date: Some(date!(2024 - 01 - 05)),
            description: " Lunch ".to_owned(),
            recurring: None,
        }
    }

    #[test]
    fn parses_valid_expense() {
        let builder = form(TransactionKind::Expense, " 12.50 ", "Food")
            .into_builder()
            .unwrap();

        assert_eq!(builder.amount, 12.5);
        assert_eq!(builder.category, "Food");
        assert_eq!(builder.description, "Lunch");
        assert!(!builder.recurring);
    }

    #[test]
    fn checkbox_sets_recurring() {
        let mut form = form(TransactionKind::Expense, "40", "Food");
        form.recurring = Some("on".to_owned());

        assert!(form.into_builder().unwrap().recurring);
    }

    #[test]
    fn income_ignores_category() {
        let builder = form(TransactionKind::Income, "500", "")
            .into_builder()
            .unwrap();

        assert_eq!(builder.category, INCOME_CATEGORY);
    }

    #[test]
    fn rejects_bad_amounts() {
        for amount in ["", "abc", "0", "-5", "NaN", "inf"] {
            assert_eq!(
                form(TransactionKind::Expense, amount, "Food").into_builder(),
                Err(Error::InvalidTransaction),
                "amount {amount:?}"
            );
        }
    }

    #[test]
    fn rejects_missing_date() {
        let mut form = form(TransactionKind::Expense, "12.5", "Food");
        form.date = None;

        assert_eq!(form.into_builder(), Err(Error::InvalidTransaction));
    }

    #[test]
    fn rejects_expense_without_category() {
        assert_eq!(
            form(TransactionKind::Expense, "12.5", "").into_builder(),
            Err(Error::InvalidTransaction)
        );
    }
}
