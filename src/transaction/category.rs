//! The closed set of transaction categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A category tag for a transaction.
///
/// The set is closed so that stored records are validated at the boundary
/// instead of carrying free-form strings through the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Food and groceries.
    Groceries,
    /// Buses, trains, fuel, parking.
    Transport,
    /// Rent, mortgage, utilities.
    Housing,
    /// Entertainment and hobbies.
    Leisure,
    /// Doctors, pharmacies, insurance.
    Health,
    /// Courses, books, tuition.
    Education,
    /// Wages and salary payments.
    Salary,
    /// Dividends, interest, asset purchases.
    Investments,
    /// Everything else.
    Other,
}

/// All categories in display order.
pub const ALL_CATEGORIES: [Category; 9] = [
    Category::Groceries,
    Category::Transport,
    Category::Housing,
    Category::Leisure,
    Category::Health,
    Category::Education,
    Category::Salary,
    Category::Investments,
    Category::Other,
];

impl Category {
    /// The lowercase identifier used in stored records and query strings.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Groceries => "groceries",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Leisure => "leisure",
            Category::Health => "health",
            Category::Education => "education",
            Category::Salary => "salary",
            Category::Investments => "investments",
            Category::Other => "other",
        }
    }

    /// The human-readable label shown in tables and forms.
    pub fn label(self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Transport => "Transport",
            Category::Housing => "Housing",
            Category::Leisure => "Leisure",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Salary => "Salary",
            Category::Investments => "Investments",
            Category::Other => "Other",
        }
    }

    /// The color used for this category's slice of the expenses chart.
    pub fn chart_color(self) -> &'static str {
        match self {
            Category::Groceries => "#FF6384",
            Category::Transport => "#36A2EB",
            Category::Housing => "#FFCE56",
            Category::Leisure => "#4BC0C0",
            Category::Health => "#9966FF",
            Category::Education => "#FF9F40",
            Category::Salary => "#32CD32",
            Category::Investments => "#1E90FF",
            Category::Other => "#A9A9A9",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ALL_CATEGORIES
            .into_iter()
            .find(|category| category.slug() == value)
            .ok_or(())
    }
}
