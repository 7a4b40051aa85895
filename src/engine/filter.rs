//! Filtering and sorting for the transactions list.

use std::cmp::Ordering;

use crate::transaction::Transaction;

/// The name of the category filter that lets every transaction through.
pub const ALL_CATEGORIES: &str = "All";

/// Which categories to keep in the transactions list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Keep every transaction.
    #[default]
    All,
    /// Keep transactions whose category is exactly this name.
    Only(String),
}

impl CategoryFilter {
    /// Parse a category filter, where "All" or an empty string keeps everything.
    pub fn parse(name: &str) -> Self {
        if name.is_empty() || name == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(name.to_owned())
        }
    }

    /// The value used for this filter in query strings.
    pub fn as_query_value(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Only(name) => name,
        }
    }

    fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => transaction.category == *name,
        }
    }
}

/// The order of the transactions list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Oldest first.
    DateAsc,
    /// Newest first.
    #[default]
    DateDesc,
    /// Smallest amount first.
    AmountAsc,
    /// Largest amount first.
    AmountDesc,
}

impl SortKey {
    /// All sort keys in the order they are offered to the user.
    pub const ALL: [SortKey; 4] = [
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::AmountDesc,
        SortKey::AmountAsc,
    ];

    /// Parse a sort key, returning `None` for unknown keys.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "date-asc" => Some(SortKey::DateAsc),
            "date-desc" => Some(SortKey::DateDesc),
            "amount-asc" => Some(SortKey::AmountAsc),
            "amount-desc" => Some(SortKey::AmountDesc),
            _ => None,
        }
    }

    /// The value used for this sort key in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortKey::DateAsc => "date-asc",
            SortKey::DateDesc => "date-desc",
            SortKey::AmountAsc => "amount-asc",
            SortKey::AmountDesc => "amount-desc",
        }
    }

    /// The text shown to the user for this sort key.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::DateAsc => "Date (oldest)",
            SortKey::DateDesc => "Date (newest)",
            SortKey::AmountAsc => "Amount (lowest)",
            SortKey::AmountDesc => "Amount (highest)",
        }
    }

    fn compare(self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            SortKey::DateAsc => a.date.cmp(&b.date),
            SortKey::DateDesc => b.date.cmp(&a.date),
            SortKey::AmountAsc => a.amount.total_cmp(&b.amount),
            SortKey::AmountDesc => b.amount.total_cmp(&a.amount),
        }
    }
}

/// Filter `transactions` by category and description, then sort them.
///
/// The search term is matched case-insensitively anywhere in the description,
/// an empty term matches everything. The sort is stable so transactions that
/// compare equal keep their input order. With no sort key the filtered
/// transactions keep their input order.
pub fn filter_and_sort(
    transactions: &[Transaction],
    category_filter: &CategoryFilter,
    search_term: &str,
    sort_key: Option<SortKey>,
) -> Vec<Transaction> {
    let search_term = search_term.to_lowercase();

    let mut filtered: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| category_filter.matches(transaction))
        .filter(|transaction| {
            search_term.is_empty() || transaction.description.to_lowercase().contains(&search_term)
        })
        .cloned()
        .collect();

    if let Some(sort_key) = sort_key {
        filtered.sort_by(|a, b| sort_key.compare(a, b));
    }

    filtered
}

#[cfg(test)]
mod tests {
    use time::{Date, OffsetDateTime, macros::date};

    use crate::transaction::{Transaction, TransactionKind};

    use super::{CategoryFilter, SortKey, filter_and_sort};

    fn transaction(id: i64, amount: f64, category: &str, description: &str, date: Date) -> Transaction {
        Transaction {
            id,
            kind: TransactionKind::Expense,
            amount,
            category: category.to_owned(),
            date,
            description: description.to_owned(),
            recurring: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction(1, 12.5, "Food", "Lunch \"special\"", date!(2024 - 01 - 05)),
            transaction(2, 40.0, "Transport", "Train ticket", date!(2024 - 01 - 03)),
            transaction(3, 12.5, "Food", "Dinner", date!(2024 - 01 - 07)),
            transaction(4, 3.0, "Food", "LUNCH snack", date!(2024 - 01 - 05)),
            transaction(5, 99.0, "Shopping", "", date!(2024 - 01 - 01)),
        ]
    }

    fn ids(transactions: &[Transaction]) -> Vec<i64> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    #[test]
    fn all_filter_with_empty_search_keeps_everything() {
        let got = filter_and_sort(&sample(), &CategoryFilter::All, "", None);

        assert_eq!(got, sample());
    }

    #[test]
    fn category_filter_is_exact() {
        let got = filter_and_sort(&sample(), &CategoryFilter::parse("Food"), "", None);
        assert_eq!(ids(&got), [1, 3, 4]);

        let got = filter_and_sort(&sample(), &CategoryFilter::parse("food"), "", None);
        assert!(got.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let got = filter_and_sort(&sample(), &CategoryFilter::All, "lunch", None);
        assert_eq!(ids(&got), [1, 4]);

        let got = filter_and_sort(&sample(), &CategoryFilter::All, "TICK", None);
        assert_eq!(ids(&got), [2]);
    }

    #[test]
    fn search_applies_after_category_filter() {
        let got = filter_and_sort(&sample(), &CategoryFilter::parse("Transport"), "lunch", None);

        assert!(got.is_empty());
    }

    #[test]
    fn sorts_by_date() {
        let got = filter_and_sort(&sample(), &CategoryFilter::All, "", Some(SortKey::DateAsc));
        assert_eq!(ids(&got), [5, 2, 1, 4, 3]);

        let got = filter_and_sort(&sample(), &CategoryFilter::All, "", Some(SortKey::DateDesc));
        assert_eq!(ids(&got), [3, 1, 4, 2, 5]);
    }

    #[test]
    fn amount_ascending_is_a_true_ascending_sort() {
        let got = filter_and_sort(&sample(), &CategoryFilter::All, "", Some(SortKey::AmountAsc));

        assert_eq!(ids(&got), [4, 1, 3, 2, 5]);
    }

    #[test]
    fn amount_descending_keeps_ties_in_input_order() {
        let got = filter_and_sort(&sample(), &CategoryFilter::All, "", Some(SortKey::AmountDesc));

        assert_eq!(ids(&got), [5, 2, 1, 3, 4]);
    }

    #[test]
    fn unknown_sort_key_leaves_order_unchanged() {
        let sort_key = SortKey::parse("category-asc");
        assert_eq!(sort_key, None);

        let got = filter_and_sort(&sample(), &CategoryFilter::All, "", sort_key);

        assert_eq!(ids(&got), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn filter_and_sort_is_idempotent() {
        let filter = CategoryFilter::parse("Food");

        for sort_key in SortKey::ALL.map(Some).into_iter().chain([None]) {
            let once = filter_and_sort(&sample(), &filter, "l", sort_key);
            let twice = filter_and_sort(&once, &filter, "l", sort_key);

            assert_eq!(once, twice, "sort key {sort_key:?}");
        }
    }

    #[test]
    fn category_filter_parse() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Food"),
            CategoryFilter::Only("Food".to_owned())
        );
    }
}
