//! Result assembly
//!
//! Combines the outcome of the id-source query with the outcomes of the
//! per-id detail fetches into one displayable page. Inputs are plain
//! snapshots, so the same function describes a page while fetches are still
//! in flight and after they all settle.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CatalogError;
use crate::pokemon::{DisplayRow, EntityDetail};
use crate::query::{name_matches, select_mode, total_pages, QueryState, RetrievalMode};

/// Outcome of one request as seen at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus<T> {
    Pending,
    Ready(T),
    Failed(CatalogError),
}

impl<T> QueryStatus<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryStatus::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            QueryStatus::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            QueryStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> From<Result<T, CatalogError>> for QueryStatus<T> {
    fn from(result: Result<T, CatalogError>) -> Self {
        match result {
            Ok(value) => QueryStatus::Ready(value),
            Err(err) => QueryStatus::Failed(err),
        }
    }
}

/// The resolved id-source query: the visible id window plus the count the
/// pagination control is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdSource {
    pub ids: Vec<u32>,
    pub total_count: usize,
}

impl IdSource {
    pub fn new(ids: Vec<u32>, total_count: usize) -> Self {
        IdSource { ids, total_count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Default,
    Search,
    Category,
}

impl From<&RetrievalMode> for ModeKind {
    fn from(mode: &RetrievalMode) -> Self {
        match mode {
            RetrievalMode::Default { .. } => ModeKind::Default,
            RetrievalMode::Search { .. } => ModeKind::Search,
            RetrievalMode::Category { .. } => ModeKind::Category,
        }
    }
}

/// One page ready for the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledPage {
    pub mode: ModeKind,
    pub rows: Vec<DisplayRow>,
    /// In category mode with a name filter this is still the unfiltered
    /// membership size.
    pub total_count: usize,
    pub is_loading: bool,
    pub is_error: bool,
    /// The id-source query failed, so the window itself is unknown. Detail
    /// failures only drop their rows and never set this.
    pub source_failed: bool,
    pub error_cause: Option<CatalogError>,
}

/// Merge an id source and detail outcomes into a page.
///
/// `details` may be in any order (typically completion order) and may
/// contain entries for ids outside the current window; those are ignored.
/// Window ids with no entry count as pending.
pub fn assemble(
    state: &QueryState,
    source: &QueryStatus<IdSource>,
    details: &[(u32, QueryStatus<EntityDetail>)],
) -> AssembledPage {
    let mode = select_mode(state, 1);
    let by_id: HashMap<u32, &QueryStatus<EntityDetail>> =
        details.iter().map(|(id, status)| (*id, status)).collect();

    let window: &[u32] = source.ready().map(|s| s.ids.as_slice()).unwrap_or(&[]);

    let mut rows = Vec::with_capacity(window.len());
    let mut details_pending = false;
    let mut first_detail_error: Option<&CatalogError> = None;

    for id in window {
        match by_id.get(id) {
            Some(QueryStatus::Ready(detail)) => rows.push(DisplayRow::from(detail)),
            Some(QueryStatus::Failed(err)) => {
                if first_detail_error.is_none() {
                    first_detail_error = Some(err);
                }
            }
            Some(QueryStatus::Pending) | None => details_pending = true,
        }
    }

    if let RetrievalMode::Category {
        name_filter: Some(query),
        ..
    } = &mode
    {
        rows.retain(|row| name_matches(&row.name, query));
    }

    let error_cause = source.error().or(first_detail_error).cloned();

    AssembledPage {
        mode: ModeKind::from(&mode),
        rows,
        total_count: source.ready().map(|s| s.total_count).unwrap_or(0),
        is_loading: source.is_pending() || details_pending,
        is_error: error_cause.is_some(),
        source_failed: source.error().is_some(),
        error_cause,
    }
}

/// Pagination metadata for list output
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: usize,
    pub total_items: usize,
    pub limit: usize,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// Complete list output with rows, status and pagination
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ListOutput {
    pub query: QueryState,
    #[serde(flatten)]
    pub page: AssembledPage,
    pub pagination: Pagination,
}

/// Single-quote `value` for a POSIX shell when it would otherwise split or
/// expand.
fn shell_arg(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':'));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// CLI invocation that reproduces `state` at `page`.
pub fn list_command(state: &QueryState, page: i64) -> String {
    let mut command = format!("pokecat list --page {page}");
    if let Some(search) = &state.name_filter {
        command.push_str(&format!(" --search {}", shell_arg(search)));
    }
    if let Some(category) = &state.category_filter {
        command.push_str(&format!(" --type {}", shell_arg(category)));
    }
    command
}

/// Build pagination metadata with navigation commands.
pub fn paginate(state: &QueryState, total_count: usize, page_size: usize) -> Pagination {
    let total_pages = total_pages(total_count, page_size);
    let page = state.page;

    let next_page = if usize::try_from(page).is_ok_and(|p| p < total_pages) {
        Some(list_command(state, page + 1))
    } else {
        None
    };

    let prev_page = if page > 1 {
        Some(list_command(state, page - 1))
    } else {
        None
    };

    Pagination {
        current_page: page,
        total_pages,
        total_items: total_count,
        limit: page_size,
        next_page_command: next_page,
        prev_page_command: prev_page,
    }
}

pub fn build_list_output(state: &QueryState, page: AssembledPage, page_size: usize) -> ListOutput {
    let pagination = paginate(state, page.total_count, page_size);
    ListOutput {
        query: state.clone(),
        page,
        pagination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::parse_entity_id;
    use crate::query::{page_window, search_match_ids, PAGE_SIZE};

    fn detail(id: u32, name: &str) -> EntityDetail {
        EntityDetail {
            id,
            name: name.to_string(),
            categories: vec!["fire".to_string()],
            image_url: Some(format!("https://img/{id}.png")),
            artwork_url: None,
            height: 6,
            weight: 85,
            stats: vec![],
            abilities: vec![],
        }
    }

    fn ready(pairs: &[(u32, &str)]) -> Vec<(u32, QueryStatus<EntityDetail>)> {
        pairs
            .iter()
            .map(|(id, name)| (*id, QueryStatus::Ready(detail(*id, name))))
            .collect()
    }

    fn row_ids(page: &AssembledPage) -> Vec<u32> {
        page.rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_rows_follow_window_order_not_arrival_order() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![1, 2, 3, 4], 1302));

        // Arrival order 3, 1, 4, 2
        let details = ready(&[(3, "venusaur"), (1, "bulbasaur"), (4, "charmander"), (2, "ivysaur")]);
        let page = assemble(&state, &source, &details);

        assert_eq!(row_ids(&page), vec![1, 2, 3, 4]);
        assert!(!page.is_loading);
        assert!(!page.is_error);
        assert_eq!(page.total_count, 1302);
        assert_eq!(page.mode, ModeKind::Default);
    }

    #[test]
    fn test_every_completion_order_yields_same_rows() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![7, 8, 9], 3));
        let orders = [[7, 8, 9], [7, 9, 8], [8, 7, 9], [8, 9, 7], [9, 7, 8], [9, 8, 7]];

        for order in orders {
            let details: Vec<_> = order
                .iter()
                .map(|id| (*id, QueryStatus::Ready(detail(*id, "x"))))
                .collect();
            assert_eq!(row_ids(&assemble(&state, &source, &details)), vec![7, 8, 9]);
        }
    }

    #[test]
    fn test_pending_source_is_loading_with_no_rows() {
        let state = QueryState::default();
        let page = assemble(&state, &QueryStatus::Pending, &[]);

        assert!(page.is_loading);
        assert!(!page.is_error);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn test_partial_details_keep_loading() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![1, 2, 3], 3));
        let mut details = ready(&[(2, "ivysaur")]);
        details.push((3, QueryStatus::Pending));

        let page = assemble(&state, &source, &details);

        assert!(page.is_loading);
        assert_eq!(row_ids(&page), vec![2]);
    }

    #[test]
    fn test_failed_detail_is_dropped_and_flags_error() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![1, 2, 3], 3));
        let mut details = ready(&[(1, "bulbasaur"), (3, "venusaur")]);
        details.push((2, QueryStatus::Failed(CatalogError::not_found("pokemon/2"))));

        let page = assemble(&state, &source, &details);

        assert_eq!(row_ids(&page), vec![1, 3]);
        assert!(page.is_error);
        assert!(!page.is_loading);
        assert_eq!(
            page.error_cause,
            Some(CatalogError::not_found("pokemon/2"))
        );
    }

    #[test]
    fn test_source_error_preferred_over_detail_error() {
        let state = QueryState::default();
        let source: QueryStatus<IdSource> =
            QueryStatus::Failed(CatalogError::network("https://pokeapi.co", "HTTP 503"));
        let details = vec![(1, QueryStatus::Failed(CatalogError::not_found("pokemon/1")))];

        let page = assemble(&state, &source, &details);

        assert!(page.is_error);
        assert!(matches!(
            page.error_cause,
            Some(CatalogError::NetworkFailure { .. })
        ));
    }

    #[test]
    fn test_detail_failures_do_not_fail_the_source() {
        let state = QueryState::new(1, Some("zzz"), Some("fire"));
        let source = QueryStatus::Ready(IdSource::new(vec![4], 1));
        let details = vec![(4, QueryStatus::Failed(CatalogError::not_found("pokemon/4")))];

        let page = assemble(&state, &source, &details);

        assert!(page.rows.is_empty());
        assert!(page.is_error);
        assert!(!page.source_failed);

        let failed = assemble(&state, &QueryStatus::Failed(CatalogError::not_found("type/fire")), &[]);
        assert!(failed.source_failed);
    }

    #[test]
    fn test_first_detail_error_in_window_order() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![1, 2], 2));
        let details = vec![
            (2, QueryStatus::Failed(CatalogError::not_found("pokemon/2"))),
            (1, QueryStatus::Failed(CatalogError::not_found("pokemon/1"))),
        ];

        let page = assemble(&state, &source, &details);
        assert_eq!(page.error_cause, Some(CatalogError::not_found("pokemon/1")));
    }

    #[test]
    fn test_details_outside_window_are_ignored() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![21, 22], 40));
        let mut details = ready(&[(21, "a"), (22, "b")]);
        details.push((1, QueryStatus::Failed(CatalogError::not_found("pokemon/1"))));

        let page = assemble(&state, &source, &details);
        assert!(!page.is_error);
        assert_eq!(row_ids(&page), vec![21, 22]);
    }

    #[test]
    fn test_no_error_means_is_error_false() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![], 1302));
        let page = assemble(&state, &source, &[]);
        assert!(!page.is_error);
        assert_eq!(page.error_cause, None);
    }

    #[test]
    fn test_out_of_range_default_page_is_empty_without_error() {
        let state = QueryState::new(67, None, None);
        assert_eq!(total_pages(1302, PAGE_SIZE), 66);

        // The server answers an out-of-range offset with the count and no results.
        let source = QueryStatus::Ready(IdSource::new(vec![], 1302));
        let page = assemble(&state, &source, &[]);

        assert!(page.rows.is_empty());
        assert!(!page.is_error);
        assert!(!page.is_loading);
        assert_eq!(page.total_count, 1302);
    }

    #[test]
    fn test_search_scenario_char() {
        let names = ["bulbasaur", "charmander", "charmeleon", "charizard", "squirtle"];
        let index: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, n)| crate::pokemon::ListItemRef {
                name: n.to_string(),
                url: format!("https://pokeapi.co/api/v2/pokemon/{}/", i + 3),
            })
            .collect();
        let state = QueryState::new(1, Some("char"), None);

        let matches = search_match_ids(&index, "char").unwrap();
        let window = page_window(&matches, state.page, PAGE_SIZE).to_vec();
        let source = QueryStatus::Ready(IdSource::new(window, matches.len()));
        let details = ready(&[(6, "charizard"), (4, "charmander"), (5, "charmeleon")]);

        let page = assemble(&state, &source, &details);

        assert_eq!(page.mode, ModeKind::Search);
        assert_eq!(page.total_count, 3);
        let names: Vec<&str> = page.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["charmander", "charmeleon", "charizard"]);
    }

    #[test]
    fn test_combined_filter_keeps_unfiltered_total() {
        let state = QueryState::new(1, Some("char"), Some("fire"));
        let source = QueryStatus::Ready(IdSource::new(vec![4, 5, 6, 37, 38], 96));
        let details = ready(&[
            (4, "charmander"),
            (5, "charmeleon"),
            (6, "charizard"),
            (37, "vulpix"),
            (38, "ninetales"),
        ]);

        let page = assemble(&state, &source, &details);

        assert_eq!(page.mode, ModeKind::Category);
        assert_eq!(row_ids(&page), vec![4, 5, 6]);
        assert!(page.rows.iter().all(|r| r.name.contains("char")));
        assert_eq!(page.total_count, 96);
    }

    #[test]
    fn test_category_without_name_filter_keeps_all_rows() {
        let state = QueryState::new(1, None, Some("fire"));
        let source = QueryStatus::Ready(IdSource::new(vec![4, 37], 96));
        let details = ready(&[(37, "vulpix"), (4, "charmander")]);

        let page = assemble(&state, &source, &details);
        assert_eq!(row_ids(&page), vec![4, 37]);
    }

    #[test]
    fn test_malformed_id_source_propagates() {
        let state = QueryState::default();
        let err = parse_entity_id("https://pokeapi.co/api/v2/pokemon/").unwrap_err();
        let page = assemble(&state, &QueryStatus::Failed(err), &[]);

        assert!(page.is_error);
        assert!(matches!(
            page.error_cause,
            Some(CatalogError::MalformedId { .. })
        ));
    }

    // ============================================================================
    // pagination tests
    // ============================================================================

    #[test]
    fn test_paginate_first_page() {
        let state = QueryState::default();
        let pagination = paginate(&state, 1302, 20);

        assert_eq!(pagination.total_pages, 66);
        assert!(pagination.prev_page_command.is_none());
        assert_eq!(
            pagination.next_page_command.as_deref(),
            Some("pokecat list --page 2")
        );
    }

    #[test]
    fn test_paginate_last_page_keeps_filters() {
        let state = QueryState::new(5, Some("a"), Some("water"));
        let pagination = paginate(&state, 100, 20);

        assert!(pagination.next_page_command.is_none());
        assert_eq!(
            pagination.prev_page_command.as_deref(),
            Some("pokecat list --page 4 --search a --type water")
        );
    }

    #[test]
    fn test_paginate_quotes_multi_word_search() {
        let state = QueryState::new(1, Some("mr mime"), None);
        let pagination = paginate(&state, 100, 20);

        assert_eq!(
            pagination.next_page_command.as_deref(),
            Some("pokecat list --page 2 --search 'mr mime'")
        );
        assert_eq!(
            list_command(&QueryState::new(1, Some("farfetch'd"), None), 1),
            "pokecat list --page 1 --search 'farfetch'\\''d'"
        );
    }

    #[test]
    fn test_paginate_negative_page() {
        let state = QueryState::new(-2, None, None);
        let pagination = paginate(&state, 100, 20);

        assert!(pagination.next_page_command.is_none());
        assert!(pagination.prev_page_command.is_none());
    }

    #[test]
    fn test_list_output_serializes_flat() {
        let state = QueryState::default();
        let source = QueryStatus::Ready(IdSource::new(vec![1], 1));
        let page = assemble(&state, &source, &ready(&[(1, "bulbasaur")]));
        let output = build_list_output(&state, page, 20);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["rows"][0]["name"], "bulbasaur");
        assert_eq!(json["mode"], "default");
        assert_eq!(json["pagination"]["total_pages"], 1);
        assert_eq!(json["query"]["page"], 1);
    }
}
