use rayon::prelude::*;
use tracing::trace;

use crate::college::{College, compare_values};
use crate::domain::{SortConfig, Toast};

pub const SEARCH_RESULT_FOUND: &str = "Search result found";
pub const NO_SEARCH_RESULT_FOUND: &str = "No search result found";

/// Rows the table currently shows, as indices into the source collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedView {
    pub rows: Vec<usize>,
    // Number of records matching the query, loaded or not
    pub matches: usize,
}

impl DerivedView {
    pub fn has_more(&self) -> bool {
        self.rows.len() < self.matches
    }
}

fn name_matches(college: &College, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    college
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(needle))
}

/// Indices of all records whose name contains `query`, ignoring case, in source order.
pub fn filter_colleges(source: &[College], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    (0..source.len())
        .into_par_iter()
        .filter(|&idx| name_matches(&source[idx], &needle))
        .collect()
}

/// Stable sort of `rows` by the configured field. Without a sort key the order is kept.
pub fn sort_colleges(source: &[College], rows: &mut [usize], sort: &SortConfig) {
    if let Some(key) = sort.key {
        rows.sort_by(|&a, &b| {
            compare_values(source[a].value(key), source[b].value(key), sort.direction)
        });
    }
}

pub fn paginate(rows: &mut Vec<usize>, page: usize, items_per_page: usize) {
    rows.truncate(page.saturating_mul(items_per_page));
}

/// Filter, sort and paginate the source from scratch.
pub fn derive_view(
    source: &[College],
    query: &str,
    sort: &SortConfig,
    page: usize,
    items_per_page: usize,
) -> DerivedView {
    let mut rows = filter_colleges(source, query);
    let matches = rows.len();
    sort_colleges(source, &mut rows, sort);
    paginate(&mut rows, page, items_per_page);
    trace!(
        "Derived view: query \"{query}\", {sort:?}, page {page}, {} of {matches} matches",
        rows.len()
    );
    DerivedView { rows, matches }
}

/// Notification for a search. An empty query never produces one.
pub fn search_toast(query: &str, matches: usize) -> Option<Toast> {
    match (query.is_empty(), matches) {
        (true, _) => None,
        (false, 0) => Some(Toast::error(NO_SEARCH_RESULT_FOUND)),
        (false, _) => Some(Toast::success(SEARCH_RESULT_FOUND)),
    }
}
