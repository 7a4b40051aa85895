//! Totals and the expense breakdown for a set of transactions.

use std::collections::HashMap;

use crate::transaction::{Transaction, TransactionKind};

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category name as written on the transactions.
    pub category: String,
    /// The sum of the expense amounts in the category.
    pub amount: f64,
}

/// Totals over a set of transactions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub net_balance: f64,
    /// Expense totals per category, in the order each category was first seen.
    pub expense_by_category: Vec<CategoryTotal>,
}

/// Sum the income and expenses in `transactions` and group the expenses by category.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut expense_by_category: Vec<CategoryTotal> = Vec::new();
    let mut category_index: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => {
                total_expenses += transaction.amount;

                match category_index.get(transaction.category.as_str()) {
                    Some(&index) => expense_by_category[index].amount += transaction.amount,
                    None => {
                        category_index.insert(&transaction.category, expense_by_category.len());
                        expense_by_category.push(CategoryTotal {
                            category: transaction.category.clone(),
                            amount: transaction.amount,
                        });
                    }
                }
            }
        }
    }

    Summary {
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses,
        expense_by_category,
    }
}

/// The share of `budget` that `total_expenses` uses, as a percentage.
///
/// The result is not clamped, spending over budget gives a value over 100.
/// A budget of zero or less gives zero.
pub fn budget_progress(total_expenses: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        total_expenses / budget * 100.0
    } else {
        0.0
    }
}
