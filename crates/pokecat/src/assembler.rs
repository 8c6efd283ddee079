use crate::catalog::Catalog;
use crate::client::DataSource;
use futures::stream::{FuturesUnordered, StreamExt};
use pokecat_core::assemble::{assemble, AssembledPage, IdSource, QueryStatus};
use pokecat_core::pokemon::{EntityDetail, EntityRef};
use pokecat_core::query::{page_window, search_match_ids, select_mode, QueryState, RetrievalMode};
use pokecat_core::CatalogError;
use std::collections::HashSet;

/// Resolve the ids visible on the current page and the count pagination is
/// built from.
pub async fn resolve_id_source<S: DataSource + 'static>(
    catalog: &Catalog<S>,
    state: &QueryState,
    page_size: usize,
) -> Result<IdSource, CatalogError> {
    match select_mode(state, page_size) {
        RetrievalMode::Default { offset: None, .. } => {
            log::debug!("Page {} is before the first page; nothing to fetch", state.page);
            Ok(IdSource::default())
        }
        RetrievalMode::Default {
            offset: Some(offset),
            limit,
        } => {
            let page = catalog.list_page(offset, limit).await?;
            Ok(IdSource::new(page.ids()?, page.total_count))
        }
        RetrievalMode::Search { query } => {
            let index = catalog.search_index().await?;
            let matches = search_match_ids(&index.items, &query)?;
            log::debug!("Search '{}' matched {} entries", query, matches.len());
            let window = page_window(&matches, state.page, page_size).to_vec();
            Ok(IdSource::new(window, matches.len()))
        }
        RetrievalMode::Category { name, .. } => {
            let membership = catalog.category(&name).await?;
            let ids = membership.ids()?;
            let window = page_window(&ids, state.page, page_size).to_vec();
            Ok(IdSource::new(window, ids.len()))
        }
    }
}

/// Build the page for `state`, reporting a snapshot after every settled
/// request.
///
/// Detail fetches for the window run concurrently and settle in any order;
/// every snapshot is still in window order. The returned page is the final
/// snapshot.
pub async fn assemble_page<S, F>(
    catalog: &Catalog<S>,
    state: &QueryState,
    page_size: usize,
    mut on_progress: F,
) -> AssembledPage
where
    S: DataSource + 'static,
    F: FnMut(&AssembledPage),
{
    on_progress(&assemble(state, &QueryStatus::Pending, &[]));

    let source: QueryStatus<IdSource> = resolve_id_source(catalog, state, page_size).await.into();
    if let Some(err) = source.error() {
        log::warn!("Failed to resolve page ids: {}", err);
    }

    let mut details: Vec<(u32, QueryStatus<EntityDetail>)> = Vec::new();
    let mut page = assemble(state, &source, &details);

    let ids = match source.ready() {
        Some(id_source) if !id_source.ids.is_empty() => id_source.ids.clone(),
        _ => {
            on_progress(&page);
            return page;
        }
    };
    on_progress(&page);

    let mut seen = HashSet::new();
    let mut in_flight: FuturesUnordered<_> = ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| async move { (id, catalog.entity(&EntityRef::Id(id)).await) })
        .collect();

    while let Some((id, result)) = in_flight.next().await {
        if let Err(err) = &result {
            log::warn!("Dropping #{} from the page: {}", id, err);
        }
        details.push((id, result.map(|detail| (*detail).clone()).into()));
        page = assemble(state, &source, &details);
        on_progress(&page);
    }

    page
}
