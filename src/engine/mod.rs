//! Pure functions that derive the dashboard figures and the transactions list
//! from a snapshot of a user's transactions.
//!
//! Nothing in this module touches the database or any shared state, callers
//! pass in the snapshot and today's date.

mod filter;
mod range;
mod series;
mod summary;

pub use filter::{ALL_CATEGORIES, CategoryFilter, SortKey, filter_and_sort};
pub use range::{RangeKind, select_range};
pub use series::{MonthBucket, monthly_series};
pub use summary::{CategoryTotal, Summary, budget_progress, summarize};
