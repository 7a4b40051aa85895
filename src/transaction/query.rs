//! The filter and sort criteria shared by the transactions page and the exports.

use serde::{Deserialize, Serialize};

use crate::{
    engine::{CategoryFilter, SortKey, filter_and_sort},
    transaction::Transaction,
};

/// The query string of the transactions page, e.g. `?category=Food&search=lunch&sort=amount-asc`.
///
/// Missing parameters select every category, match every description and
/// sort by date, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionListQuery {
    /// The category to show, "All" or empty for every category.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Text to look for in the description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
    /// One of "date-asc", "date-desc", "amount-asc" or "amount-desc".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sort: String,
}

impl TransactionListQuery {
    /// The category filter selected by the query.
    pub fn category_filter(&self) -> CategoryFilter {
        CategoryFilter::parse(&self.category)
    }

    /// The sort key selected by the query.
    ///
    /// An empty sort parameter selects the default order, while an unknown
    /// one selects no sorting at all.
    pub fn sort_key(&self) -> Option<SortKey> {
        if self.sort.is_empty() {
            Some(SortKey::default())
        } else {
            SortKey::parse(&self.sort)
        }
    }

    /// Filter and sort `transactions` by the criteria in the query.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        filter_and_sort(
            transactions,
            &self.category_filter(),
            &self.search,
            self.sort_key(),
        )
    }

    /// Append the query to `path`, e.g. "/transactions?category=Food".
    pub fn url_for(&self, path: &str) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{path}?{query}"),
            Ok(_) => path.to_owned(),
            Err(error) => {
                tracing::error!("could not encode transaction list query {self:?}: {error}");
                path.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{CategoryFilter, SortKey};

    use super::TransactionListQuery;

    #[test]
    fn empty_query_uses_defaults() {
        let query = TransactionListQuery::default();

        assert_eq!(query.category_filter(), CategoryFilter::All);
        assert_eq!(query.sort_key(), Some(SortKey::DateDesc));
        assert_eq!(query.url_for("/transactions"), "/transactions");
    }

    #[test]
    fn unknown_sort_key_disables_sorting() {
        let query = TransactionListQuery {
            sort: "alphabetical".to_owned(),
            ..Default::default()
        };

        assert_eq!(query.sort_key(), None);
    }

    #[test]
    fn url_carries_criteria() {
        let query = TransactionListQuery {
            category: "Food".to_owned(),
            search: "fish & chips".to_owned(),
            sort: "amount-asc".to_owned(),
        };

        assert_eq!(
            query.url_for("/api/export/csv"),
            "/api/export/csv?category=Food&search=fish+%26+chips&sort=amount-asc"
        );
    }

    #[test]
    fn parses_query_string() {
        let query: TransactionListQuery =
            serde_urlencoded::from_str("category=Food&search=lunch").unwrap();

        assert_eq!(query.category_filter(), CategoryFilter::Only("Food".to_owned()));
        assert_eq!(query.search, "lunch");
        assert_eq!(query.sort_key(), Some(SortKey::DateDesc));
    }
}
