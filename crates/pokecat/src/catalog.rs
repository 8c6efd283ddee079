use crate::cache::{CachePolicy, QueryCache};
use crate::client::DataSource;
use pokecat_core::pokemon::{CategoryMembership, EntityDetail, EntityRef, ListPage};
use pokecat_core::query::SEARCH_INDEX_LIMIT;
use pokecat_core::CatalogError;
use std::sync::Arc;

/// Cached, deduplicated access to a [`DataSource`].
///
/// Built once at startup and shared by every command.
pub struct Catalog<S> {
    source: Arc<S>,
    list_pages: QueryCache<(usize, usize), ListPage>,
    entities: QueryCache<EntityRef, EntityDetail>,
    search_index: QueryCache<(), ListPage>,
    categories: QueryCache<String, CategoryMembership>,
    category_names: QueryCache<(), Vec<String>>,
}

impl<S: DataSource + 'static> Catalog<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            list_pages: QueryCache::new("list_page", CachePolicy::LIST_PAGE),
            entities: QueryCache::new("entity", CachePolicy::ENTITY),
            search_index: QueryCache::new("search_index", CachePolicy::STATIC),
            categories: QueryCache::new("category", CachePolicy::STATIC),
            category_names: QueryCache::new("category_names", CachePolicy::STATIC),
        }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn list_page(&self, offset: usize, limit: usize) -> Result<Arc<ListPage>, CatalogError> {
        let source = Arc::clone(&self.source);
        self.list_pages
            .get_or_fetch((offset, limit), move || async move {
                source.list_page(offset, limit).await
            })
            .await
    }

    pub async fn entity(&self, entity: &EntityRef) -> Result<Arc<EntityDetail>, CatalogError> {
        let source = Arc::clone(&self.source);
        let key = entity.clone();
        self.entities
            .get_or_fetch(entity.clone(), move || async move { source.entity(&key).await })
            .await
    }

    /// Every entity name in one request; the basis for substring search.
    pub async fn search_index(&self) -> Result<Arc<ListPage>, CatalogError> {
        let source = Arc::clone(&self.source);
        self.search_index
            .get_or_fetch((), move || async move {
                source.list_page(0, SEARCH_INDEX_LIMIT).await
            })
            .await
    }

    pub async fn category(&self, name: &str) -> Result<Arc<CategoryMembership>, CatalogError> {
        let source = Arc::clone(&self.source);
        let name = name.to_lowercase();
        let key = name.clone();
        self.categories
            .get_or_fetch(key, move || async move { source.category(&name).await })
            .await
    }

    pub async fn category_names(&self) -> Result<Arc<Vec<String>>, CatalogError> {
        let source = Arc::clone(&self.source);
        self.category_names
            .get_or_fetch((), move || async move { source.category_names().await })
            .await
    }
}
