//! Aggregate figures derived from a control's transaction list.
//!
//! Everything here is computed on the fly from the full list. Nothing is
//! cached or stored, so the figures can never drift from the records.

use std::collections::BTreeMap;

use time::{Date, Month};

use crate::transaction::{Category, Transaction, TransactionKind};

/// The headline figures shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts, as a positive number.
    pub expense: f64,
    /// Income minus expenses. Negative when more was spent than earned.
    pub balance: f64,
}

/// Sum the incomes and expenses of `transactions`.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut result = Totals::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => result.income += transaction.amount,
            TransactionKind::Expense => result.expense += transaction.amount,
        }
    }

    result.balance = result.income - result.expense;

    result
}

/// Sum expense amounts per category, in the order categories first appear in
/// `transactions`. Income records and categories with no expenses are left
/// out.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<(Category, f64)> {
    let mut sums: Vec<(Category, f64)> = Vec::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        match sums
            .iter_mut()
            .find(|(category, _)| *category == transaction.category)
        {
            Some((_, sum)) => *sum += transaction.amount,
            None => sums.push((transaction.category, transaction.amount)),
        }
    }

    sums
}

/// The income and expense totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlySummary {
    /// The calendar year.
    pub year: i32,
    /// The month within the year.
    pub month: Month,
    /// The income earned during the month.
    pub income: f64,
    /// The expenses paid during the month, as a positive number.
    pub expense: f64,
}

impl MonthlySummary {
    /// Income minus expenses for the month.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }

    /// A short label for chart axes, e.g. `Jan 2024`.
    pub fn label(&self) -> String {
        format!("{} {}", &self.month.to_string()[..3], self.year)
    }
}

fn month_key(date: Date) -> (i32, u8) {
    (date.year(), date.month() as u8)
}

/// Bucket `transactions` by calendar month, in chronological order. Months
/// with no transactions are skipped rather than zero-filled.
pub fn monthly_summaries(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut buckets: BTreeMap<(i32, u8), (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let bucket = buckets.entry(month_key(transaction.date)).or_default();

        match transaction.kind {
            TransactionKind::Income => bucket.0 += transaction.amount,
            TransactionKind::Expense => bucket.1 += transaction.amount,
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlySummary {
            year,
            // The key was produced from a valid Month above.
            month: Month::try_from(month).unwrap_or(Month::January),
            income,
            expense,
        })
        .collect()
}
