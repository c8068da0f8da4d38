use moviefinder_core::query::{CatalogQuery, DiscoverQuery};
use moviefinder_core::{CatalogResult, Genre, LanguageEntry};

use crate::{CatalogError, MovieDetails, Video};

/// The external movie catalog.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    fn name(&self) -> &str;

    /// Plain popularity listing.
    async fn get_popular(&self, page: u32) -> Result<CatalogResult, CatalogError>;

    /// Free-text title search.
    async fn search_by_text(&self, text: &str, page: u32)
        -> Result<CatalogResult, CatalogError>;

    /// Faceted discovery.
    async fn discover_by_facets(
        &self,
        query: &DiscoverQuery,
    ) -> Result<CatalogResult, CatalogError>;

    async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError>;

    /// Languages sorted by name.
    async fn get_languages(&self) -> Result<Vec<LanguageEntry>, CatalogError>;

    /// `NotFound` when the id does not exist upstream.
    async fn get_details(&self, id: &str) -> Result<MovieDetails, CatalogError>;

    async fn get_videos(&self, id: &str) -> Result<Vec<Video>, CatalogError>;

    /// Dispatches a built query to the matching endpoint.
    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogResult, CatalogError> {
        match query {
            CatalogQuery::Popular { page } => self.get_popular(*page).await,
            CatalogQuery::Search { text, page } => self.search_by_text(text, *page).await,
            CatalogQuery::Discover(q) => self.discover_by_facets(q).await,
        }
    }
}
