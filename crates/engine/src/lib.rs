//! Pure derived-view logic over expense records.
//!
//! Everything here is a total function over a snapshot of records: no I/O,
//! no caching, no shared state. Callers pass the full record set in and get
//! a new value back, so recomputing a view after any change is always safe.

pub use filter::{CategoryFilter, FilterCriteria, SortKey, apply};
pub use stats::{Stats, average_per_expense, this_month_total, top_category, total};

mod filter;
mod stats;
