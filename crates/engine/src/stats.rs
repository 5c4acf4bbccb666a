//! Aggregates over the full (unfiltered) record snapshot.

use api_types::expense::Expense;
use api_types::{Category, MoneyCents};
use chrono::{Datelike, NaiveDate};

/// The values shown on the stats row, computed in one pass over a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: MoneyCents,
    pub count: usize,
    pub average: MoneyCents,
    pub this_month: MoneyCents,
    pub top_category: Option<Category>,
}

impl Stats {
    #[must_use]
    pub fn compute(records: &[Expense], reference: NaiveDate) -> Self {
        Self {
            total: total(records),
            count: records.len(),
            average: average_per_expense(records),
            this_month: this_month_total(records, reference),
            top_category: top_category(records),
        }
    }
}

/// Sum of all record amounts. Zero for an empty snapshot.
#[must_use]
pub fn total(records: &[Expense]) -> MoneyCents {
    records
        .iter()
        .fold(MoneyCents::ZERO, |acc, e| acc + e.amount)
}

/// Mean amount per record, truncated to whole cents. Zero for an empty
/// snapshot rather than a division error.
#[must_use]
pub fn average_per_expense(records: &[Expense]) -> MoneyCents {
    if records.is_empty() {
        return MoneyCents::ZERO;
    }
    MoneyCents::new(total(records).cents() / records.len() as i64)
}

/// Sum of amounts whose date falls in the reference date's calendar month.
///
/// The reference is a parameter so callers control "now" and the result
/// stays reproducible.
#[must_use]
pub fn this_month_total(records: &[Expense], reference: NaiveDate) -> MoneyCents {
    records
        .iter()
        .filter(|e| e.date.year() == reference.year() && e.date.month() == reference.month())
        .fold(MoneyCents::ZERO, |acc, e| acc + e.amount)
}

/// The category with the highest summed amount, `None` for an empty
/// snapshot.
///
/// Ties resolve to the category listed first in [`Category::ALL`], so the
/// winner never depends on record order.
#[must_use]
pub fn top_category(records: &[Expense]) -> Option<Category> {
    if records.is_empty() {
        return None;
    }

    let mut totals = [MoneyCents::ZERO; Category::ALL.len()];
    for expense in records {
        totals[category_index(expense.category)] += expense.amount;
    }

    let mut best = 0;
    for (idx, sum) in totals.iter().enumerate() {
        if *sum > totals[best] {
            best = idx;
        }
    }
    Some(Category::ALL[best])
}

fn category_index(category: Category) -> usize {
    Category::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or(Category::ALL.len() - 1)
}
