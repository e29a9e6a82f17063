//! Filtering and sorting of transaction lists for display.
//!
//! Both operations produce a new list and leave the stored order untouched.

use std::{cmp::Ordering, str::FromStr};

use super::{Category, Transaction, TransactionKind};

/// The field to sort a transaction list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Sort by calendar date.
    #[default]
    Date,
    /// Sort by amount, ignoring whether it is income or expense.
    Amount,
    /// Sort by description text.
    Description,
    /// Sort by category label.
    Category,
}

impl SortKey {
    /// The identifier used in query strings.
    pub fn slug(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Amount => "amount",
            SortKey::Description => "description",
            SortKey::Category => "category",
        }
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "date" => Ok(SortKey::Date),
            "amount" => Ok(SortKey::Amount),
            "description" => Ok(SortKey::Description),
            "category" => Ok(SortKey::Category),
            _ => Err(()),
        }
    }
}

/// The direction to sort in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

impl SortDirection {
    /// The identifier used in query strings.
    pub fn slug(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// The opposite direction, used for the column header toggle links.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(()),
        }
    }
}

/// The predicate applied to a transaction list before display.
///
/// A record matches when its description or category label contains the
/// search text (case-insensitive), and the category and kind filters are
/// either unset or equal to the record's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive substring to look for in the description or category
    /// label. An empty string matches everything.
    pub search: String,
    /// Only include transactions with this category.
    pub category: Option<Category>,
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    /// Whether `transaction` passes this filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || transaction.description.to_lowercase().contains(&search)
            || transaction
                .category
                .label()
                .to_lowercase()
                .contains(&search);

        let matches_category = self
            .category
            .is_none_or(|category| category == transaction.category);
        let matches_kind = self.kind.is_none_or(|kind| kind == transaction.kind);

        matches_search && matches_category && matches_kind
    }
}

/// Return the transactions that pass `filter`, preserving their order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect()
}

fn compare_by_key(a: &Transaction, b: &Transaction, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Amount => a.amount.total_cmp(&b.amount),
        SortKey::Description => a
            .description
            .to_lowercase()
            .cmp(&b.description.to_lowercase()),
        SortKey::Category => a
            .category
            .label()
            .to_lowercase()
            .cmp(&b.category.label().to_lowercase()),
    }
}

/// Return `transactions` sorted by `key` in `direction`.
///
/// The sort is stable: records with equal keys keep their relative order
/// from the input. There is no secondary sort key.
pub fn sort_transactions(
    mut transactions: Vec<Transaction>,
    key: SortKey,
    direction: SortDirection,
) -> Vec<Transaction> {
    transactions.sort_by(|a, b| {
        let ordering = compare_by_key(a, b, key);

        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    transactions
}


#[cfg(test)]
mod sort_tests {
    use time::macros::date;

    use crate::transaction::{Category, Transaction, TransactionKind};

    use super::{SortDirection, SortKey, sort_transactions};

    fn transaction(id: &str, description: &str, amount: f64, date: time::Date) -> Transaction {
        Transaction {
            id: id.to_owned(),
            description: description.to_owned(),
            amount,
            category: Category::Other,
            kind: TransactionKind::Expense,
            date,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction("a", "Cinema", 30.0, date!(2024 - 02 - 10)),
            transaction("b", "Apples", 10.0, date!(2024 - 01 - 05)),
            transaction("c", "Bread", 20.0, date!(2024 - 03 - 20)),
        ]
    }

    #[test]
    fn sorts_by_date_ascending() {
        let got = sort_transactions(sample(), SortKey::Date, SortDirection::Ascending);

        let ids: Vec<&str> = got.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn sorts_by_amount_descending() {
        let got = sort_transactions(sample(), SortKey::Amount, SortDirection::Descending);

        let ids: Vec<&str> = got.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[test]
    fn sorts_by_description_lexicographically() {
        let got = sort_transactions(sample(), SortKey::Description, SortDirection::Ascending);

        let descriptions: Vec<&str> = got.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, ["Apples", "Bread", "Cinema"]);
    }

    #[test]
    fn descending_is_reverse_of_ascending_without_ties() {
        let ascending = sort_transactions(sample(), SortKey::Amount, SortDirection::Ascending);
        let descending = sort_transactions(sample(), SortKey::Amount, SortDirection::Descending);

        let mut reversed = ascending;
        reversed.reverse();
        assert_eq!(reversed, descending);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let transactions = vec![
            transaction("first", "Same day", 1.0, date!(2024 - 01 - 01)),
            transaction("second", "Same day too", 2.0, date!(2024 - 01 - 01)),
            transaction("third", "Earlier", 3.0, date!(2023 - 12 - 31)),
        ];

        let got = sort_transactions(transactions, SortKey::Date, SortDirection::Ascending);

        let ids: Vec<&str> = got.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["third", "first", "second"]);
    }
}
