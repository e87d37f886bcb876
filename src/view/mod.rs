//! Derived views over the collections.
//!
//! Views are recomputed from the full collection every time: filter,
//! then sort, then truncate. Nothing here mutates a store.
//!
//! # Submodules
//!
//! - [`filter`] - Conjunctive record filters and date buckets
//! - [`sort`] - Single-field sort keys
//! - [`stats`] - Aggregate counts and the dashboard summary
//! - [`export`] - Client CSV export

pub mod export;
pub mod filter;
pub mod sort;
pub mod stats;

pub use filter::{
    BusinessFilter, ClientFilter, Filter, ProjectBucket, ProjectFilter, TaskBucket, TaskFilter,
};
pub use sort::{BusinessSort, ClientSort, ProjectSort, SortKey, SortOrder, TaskSort};

use chrono::NaiveDate;

/// Filter `items`, sort the survivors by `key` and keep at most `limit`.
pub fn query<'a, T, K: SortKey<T>>(
    items: &'a [T],
    filter: &impl Filter<T>,
    key: K,
    order: SortOrder,
    limit: Option<usize>,
    today: NaiveDate,
) -> Vec<&'a T> {
    let mut view = filter::apply(items, filter, today);
    sort::sort(&mut view, key, order);
    if let Some(limit) = limit {
        view.truncate(limit);
    }
    view
}
