//! Calendar ranges used to pick the transactions that the dashboard summarises.

use std::{fmt::Display, ops::RangeInclusive};

use serde::{Deserialize, Deserializer};
use time::{Date, Duration, Month};

use crate::transaction::Transaction;

/// The time window the dashboard summarises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeKind {
    /// Sunday to Saturday of the current week.
    Week,
    /// The current calendar month.
    #[default]
    Month,
    /// The current calendar year.
    Year,
    /// Every transaction, regardless of date.
    All,
}

impl RangeKind {
    /// All range kinds in the order they are offered to the user.
    pub const ALL: [RangeKind; 4] = [
        RangeKind::Week,
        RangeKind::Month,
        RangeKind::Year,
        RangeKind::All,
    ];

    /// Parse a range name, falling back to [RangeKind::Month] for unknown names.
    pub fn parse(name: &str) -> Self {
        match name {
            "week" => RangeKind::Week,
            "month" => RangeKind::Month,
            "year" => RangeKind::Year,
            "all" => RangeKind::All,
            _ => RangeKind::default(),
        }
    }

    /// The value used for this range in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            RangeKind::Week => "week",
            RangeKind::Month => "month",
            RangeKind::Year => "year",
            RangeKind::All => "all",
        }
    }

    /// The text shown to the user for this range.
    pub fn label(self) -> &'static str {
        match self {
            RangeKind::Week => "This Week",
            RangeKind::Month => "This Month",
            RangeKind::Year => "This Year",
            RangeKind::All => "All Time",
        }
    }

    /// The first and last dates of the range containing `today`, inclusive.
    ///
    /// Returns `None` for [RangeKind::All] since it has no bounds.
    pub fn bounds(self, today: Date) -> Option<RangeInclusive<Date>> {
        match self {
            RangeKind::Week => Some(week_bounds(today)),
            RangeKind::Month => Some(month_bounds(today.year(), today.month())),
            RangeKind::Year => Some(year_bounds(today.year())),
            RangeKind::All => None,
        }
    }
}

impl Display for RangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query_value())
    }
}

impl<'de> Deserialize<'de> for RangeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(RangeKind::parse(&name))
    }
}

/// Keep the transactions whose date falls in the `kind` range around `today`.
///
/// The input order is preserved. [RangeKind::All] returns every transaction.
pub fn select_range(transactions: &[Transaction], kind: RangeKind, today: Date) -> Vec<Transaction> {
    match kind.bounds(today) {
        Some(bounds) => transactions
            .iter()
            .filter(|transaction| bounds.contains(&transaction.date))
            .cloned()
            .collect(),
        None => transactions.to_vec(),
    }
}

fn week_bounds(anchor_date: Date) -> RangeInclusive<Date> {
    let days_since_sunday = anchor_date.weekday().number_days_from_sunday() as i64;
    let start = anchor_date - Duration::days(days_since_sunday);
    let end = start + Duration::days(6);

    start..=end
}

pub(crate) fn month_bounds(year: i32, month: Month) -> RangeInclusive<Date> {
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    start..=end
}

fn year_bounds(year: i32) -> RangeInclusive<Date> {
    let start = Date::from_calendar_date(year, Month::January, 1).expect("invalid year start date");
    let end = Date::from_calendar_date(year, Month::December, 31).expect("invalid year end date");

    start..=end
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
