//! Filtering and ordering of expense records.
//!
//! [`apply`] runs the fixed pipeline: search, category, date range, sort.
//! Stages only narrow or reorder; they never mutate records, so applying
//! the same criteria twice yields the same sequence.

use api_types::Category;
use api_types::expense::Expense;
use chrono::NaiveDate;

/// Ordering applied after filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first (the reset ordering).
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::DateDesc => "Newest First",
            Self::DateAsc => "Oldest First",
            Self::AmountDesc => "Highest Amount",
            Self::AmountAsc => "Lowest Amount",
        }
    }

    /// The next key in the cycle used by the sort hotkey.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::DateDesc => Self::DateAsc,
            Self::DateAsc => Self::AmountDesc,
            Self::AmountDesc => Self::AmountAsc,
            Self::AmountAsc => Self::DateDesc,
        }
    }

    /// The same cycle walked backwards.
    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Self::DateDesc => Self::AmountAsc,
            Self::DateAsc => Self::DateDesc,
            Self::AmountDesc => Self::DateAsc,
            Self::AmountAsc => Self::AmountDesc,
        }
    }
}

/// Category dimension of the criteria: a single category or no restriction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Categories",
            Self::Only(category) => category.as_str(),
        }
    }

    /// Cycles All -> Food -> ... -> Other -> All.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Only(Category::ALL[0]),
            Self::Only(category) => {
                let idx = Category::ALL.iter().position(|c| *c == category);
                match idx {
                    Some(i) if i + 1 < Category::ALL.len() => Self::Only(Category::ALL[i + 1]),
                    _ => Self::All,
                }
            }
        }
    }

    /// The same cycle walked backwards.
    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Self::All => Self::Only(Category::ALL[Category::ALL.len() - 1]),
            Self::Only(category) => {
                let idx = Category::ALL.iter().position(|c| *c == category);
                match idx {
                    Some(0) | None => Self::All,
                    Some(i) => Self::Only(Category::ALL[i - 1]),
                }
            }
        }
    }
}

/// The full set of view criteria. Every dimension is always present;
/// "no restriction" is expressed by the dimension's default, never by a
/// missing value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against title and description.
    pub search: String,
    pub category: CategoryFilter,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
    pub sort: SortKey,
}

impl FilterCriteria {
    /// Whether any narrowing dimension deviates from the reset state.
    /// The sort key alone does not count: it reorders, it never hides.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self.category != CategoryFilter::All
            || self.date_from.is_some()
            || self.date_to.is_some()
    }
}

/// Applies criteria to a record snapshot and returns the view sequence.
///
/// Pipeline order: search, category, date range, sort. The sort is stable,
/// so records that compare equal keep their snapshot order.
#[must_use]
pub fn apply<'a>(records: &'a [Expense], criteria: &FilterCriteria) -> Vec<&'a Expense> {
    let needle = criteria.search.trim().to_lowercase();
    let mut view: Vec<&Expense> = records
        .iter()
        .filter(|e| matches_search(e, &needle))
        .filter(|e| criteria.category.matches(e.category))
        .filter(|e| criteria.date_from.is_none_or(|from| e.date >= from))
        .filter(|e| criteria.date_to.is_none_or(|to| e.date <= to))
        .collect();

    match criteria.sort {
        SortKey::DateDesc => view.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::DateAsc => view.sort_by(|a, b| a.date.cmp(&b.date)),
        SortKey::AmountDesc => view.sort_by(|a, b| b.amount.cmp(&a.amount)),
        SortKey::AmountAsc => view.sort_by(|a, b| a.amount.cmp(&b.amount)),
    }

    view
}

fn matches_search(expense: &Expense, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if expense.title.to_lowercase().contains(needle) {
        return true;
    }
    expense
        .description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(needle))
}
