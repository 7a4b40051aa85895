//! Monthly income and expense totals for the bar chart.

use time::{Date, Month};

use crate::transaction::{Transaction, TransactionKind};

/// The totals for a single calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    /// The year the month belongs to.
    pub year: i32,
    /// The calendar month.
    pub month: Month,
    /// The three letter name of the month, e.g. "Jan".
    pub label: &'static str,
    /// The sum of expense amounts in the month.
    pub expenses: f64,
    /// The sum of income amounts in the month.
    pub income: f64,
}

/// Build `month_count` consecutive monthly buckets ending at the month of `today`.
///
/// Buckets are ordered oldest first. Months without transactions have zero
/// totals, and transactions outside the buckets are ignored.
pub fn monthly_series(
    transactions: &[Transaction],
    month_count: usize,
    today: Date,
) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = Vec::with_capacity(month_count);
    let mut year = today.year();
    let mut month = today.month();

    for _ in 0..month_count {
        buckets.push(MonthBucket {
            year,
            month,
            label: month_abbrev(month),
            expenses: 0.0,
            income: 0.0,
        });

        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    buckets.reverse();

    for transaction in transactions {
        let bucket = buckets.iter_mut().find(|bucket| {
            bucket.year == transaction.date.year() && bucket.month == transaction.date.month()
        });

        if let Some(bucket) = bucket {
            match transaction.kind {
                TransactionKind::Expense => bucket.expenses += transaction.amount,
                TransactionKind::Income => bucket.income += transaction.amount,
            }
        }
    }

    buckets
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
