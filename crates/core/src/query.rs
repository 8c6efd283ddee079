//! Query state and page-window arithmetic
//!
//! A [`QueryState`] is rebuilt from the view on every interaction. From it we
//! derive exactly one [`RetrievalMode`] and, for the modes that paginate
//! client-side, the visible window of ids.

use serde::Serialize;

use crate::error::CatalogError;
use crate::pokemon::ListItemRef;

/// Rows per page when the caller does not choose one.
pub const PAGE_SIZE: usize = 20;

/// Search results are capped before pagination is applied.
pub const SEARCH_MATCH_CAP: usize = 100;

/// `limit` used to pull the complete unpaged name index in one request.
pub const SEARCH_INDEX_LIMIT: usize = 10_000;

/// Current page and filters.
///
/// `page` is 1-based and deliberately not validated: the view clamps it, and
/// everything downstream tolerates out-of-range values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryState {
    pub page: i64,
    pub name_filter: Option<String>,
    pub category_filter: Option<String>,
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState {
            page: 1,
            name_filter: None,
            category_filter: None,
        }
    }
}

impl QueryState {
    pub fn new(page: i64, name_filter: Option<&str>, category_filter: Option<&str>) -> Self {
        QueryState {
            page,
            name_filter: normalize_filter(name_filter),
            category_filter: normalize_filter(category_filter),
        }
    }

    pub fn with_page(&self, page: i64) -> Self {
        QueryState {
            page,
            ..self.clone()
        }
    }

    /// Changing a filter always returns to the first page.
    pub fn with_name_filter(&self, name_filter: Option<&str>) -> Self {
        QueryState {
            page: 1,
            name_filter: normalize_filter(name_filter),
            category_filter: self.category_filter.clone(),
        }
    }

    pub fn with_category_filter(&self, category_filter: Option<&str>) -> Self {
        QueryState {
            page: 1,
            name_filter: self.name_filter.clone(),
            category_filter: normalize_filter(category_filter),
        }
    }

    pub fn cleared() -> Self {
        QueryState::default()
    }

    pub fn has_filters(&self) -> bool {
        self.name_filter.is_some() || self.category_filter.is_some()
    }
}

/// Trim and lower-case a filter. Blank input means "no filter".
pub fn normalize_filter(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Which id source feeds the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetrievalMode {
    /// One server page. `offset` is `None` when `page < 1`; nothing is fetched.
    Default { offset: Option<usize>, limit: usize },
    /// Substring match over the complete name index.
    Search { query: String },
    /// Membership of one category. A name filter, if present, is applied to
    /// the resolved rows.
    Category {
        name: String,
        name_filter: Option<String>,
    },
}

/// Category beats search, search beats the default list.
pub fn select_mode(state: &QueryState, page_size: usize) -> RetrievalMode {
    if let Some(category) = &state.category_filter {
        return RetrievalMode::Category {
            name: category.clone(),
            name_filter: state.name_filter.clone(),
        };
    }

    if let Some(query) = &state.name_filter {
        return RetrievalMode::Search {
            query: query.clone(),
        };
    }

    RetrievalMode::Default {
        offset: default_offset(state.page, page_size),
        limit: page_size,
    }
}

/// `(page - 1) * page_size`, or `None` for pages below 1 or on overflow.
pub fn default_offset(page: i64, page_size: usize) -> Option<usize> {
    if page < 1 {
        return None;
    }
    usize::try_from(page - 1).ok()?.checked_mul(page_size)
}

/// The visible slice `seq[(page-1)*page_size .. page*page_size]`.
///
/// Out-of-range pages (including `page < 1`) yield an empty slice.
pub fn page_window<T>(seq: &[T], page: i64, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }

    let Some(start) = default_offset(page, page_size) else {
        return &[];
    };

    if start >= seq.len() {
        return &[];
    }

    let end = start.saturating_add(page_size).min(seq.len());
    &seq[start..end]
}

/// Case-insensitive substring match. `query` is expected lower-cased.
pub fn name_matches(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(query)
}

/// Ids of index entries whose name contains `query`, in index order, capped
/// at [`SEARCH_MATCH_CAP`].
pub fn search_match_ids(index: &[ListItemRef], query: &str) -> Result<Vec<u32>, CatalogError> {
    let query = query.to_lowercase();

    index
        .iter()
        .filter(|item| name_matches(&item.name, &query))
        .take(SEARCH_MATCH_CAP)
        .map(ListItemRef::id)
        .collect()
}

pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}
