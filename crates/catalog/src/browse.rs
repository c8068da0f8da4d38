//! State of one browsing view: filters, the last good result page and the
//! request generation used to drop superseded responses.

use chrono::NaiveDate;
use moviefinder_core::filters::{FilterController, FilterField, FilterState, SharedState};
use moviefinder_core::images::ImageResolver;
use moviefinder_core::languages::{LanguagePartition, fallback_languages, partition};
use moviefinder_core::pagination::{self, PageWindow};
use moviefinder_core::query::{CatalogQuery, Listing, QueryBuilder};
use moviefinder_core::{CatalogResult, GenreLookup, LanguageEntry, NormalizedMovie};
use serde::Serialize;
use tracing::{debug, warn};

use crate::CatalogError;
use crate::provider::Catalog;

/// Identifies the request issued for one generation of filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub query: CatalogQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    /// Last request failed; the previous result is still shown.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result replaced the view's data. `reissue` means the stored page
    /// was clamped to the new total and a fresh request is due.
    Applied { reissue: bool },
    /// A newer request was issued since; the response was dropped.
    Stale,
    /// The catalog failed; the previous result is kept.
    Failed,
}

/// Single-threaded browsing view.
#[derive(Debug)]
pub struct BrowseView<S: SharedState> {
    controller: FilterController<S>,
    builder: QueryBuilder,
    images: ImageResolver,
    genres: GenreLookup,
    languages: Vec<LanguageEntry>,
    generation: u64,
    status: ViewStatus,
    result: Option<CatalogResult>,
    movies: Vec<NormalizedMovie>,
}

impl<S: SharedState> BrowseView<S> {
    pub fn new(shared: S, listing: Listing, images: ImageResolver) -> Self {
        Self {
            controller: FilterController::hydrate(shared),
            builder: QueryBuilder::for_listing(listing),
            images,
            genres: GenreLookup::default(),
            languages: fallback_languages(),
            generation: 0,
            status: ViewStatus::Idle,
            result: None,
            movies: Vec::new(),
        }
    }

    /// Loads the genre and language lookups. Failures are not fatal: genre
    /// names stay empty and the built-in language list is kept.
    pub async fn load_lookups(&mut self, catalog: &dyn Catalog) {
        match catalog.get_genres().await {
            Ok(genres) => self.genres = GenreLookup::new(&genres),
            Err(e) => warn!(error = %e, "failed to load genres"),
        }
        match catalog.get_languages().await {
            Ok(languages) if !languages.is_empty() => self.languages = languages,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "failed to load languages, using fallback list"),
        }
    }

    pub fn set_genres(&mut self, genres: GenreLookup) {
        self.genres = genres;
    }

    pub fn set_languages(&mut self, languages: Vec<LanguageEntry>) {
        self.languages = languages;
    }

    pub fn filters(&self) -> &FilterState {
        self.controller.filters()
    }

    pub fn controller(&self) -> &FilterController<S> {
        &self.controller
    }

    /// Changes a filter. An outstanding request is superseded.
    pub fn set(&mut self, field: FilterField) -> bool {
        let changed = self.controller.set(field);
        if changed {
            self.generation += 1;
        }
        changed
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        self.set(FilterField::Page(page))
    }

    /// Issues a request for the current filters.
    pub fn begin(&mut self, today: NaiveDate) -> PendingRequest {
        self.generation += 1;
        self.status = ViewStatus::Loading;
        let query = self.builder.build(self.controller.filters(), today);
        debug!(generation = self.generation, query = ?query, "issuing catalog request");
        PendingRequest {
            token: RequestToken(self.generation),
            query,
        }
    }

    /// Applies a response unless a newer request has been issued.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<CatalogResult, CatalogError>,
    ) -> Completion {
        if token.0 != self.generation {
            debug!(
                token = token.0,
                generation = self.generation,
                "dropping stale catalog response"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => {
                self.movies = result
                    .items
                    .iter()
                    .map(|raw| NormalizedMovie::from_raw(raw, &self.genres, &self.images))
                    .collect();
                let reissue = self.controller.observe_total_pages(result.total_pages);
                if reissue {
                    self.generation += 1;
                }
                self.result = Some(result);
                self.status = ViewStatus::Ready;
                Completion::Applied { reissue }
            }
            Err(e) => {
                warn!(error = %e, "catalog request failed, keeping previous results");
                self.status = ViewStatus::Failed(match e {
                    CatalogError::NotFound => "No results found".to_string(),
                    CatalogError::Unavailable(_) => "Failed to load movies".to_string(),
                });
                Completion::Failed
            }
        }
    }

    /// Fetches the current filters. When the stored page turns out to be
    /// past the end, fetches once more at the clamped page.
    pub async fn refresh(&mut self, catalog: &dyn Catalog, today: NaiveDate) -> Completion {
        let mut completion = Completion::Stale;
        for _ in 0..2 {
            let pending = self.begin(today);
            let outcome = catalog.fetch(&pending.query).await;
            completion = self.complete(pending.token, outcome);
            if completion != (Completion::Applied { reissue: true }) {
                break;
            }
        }
        completion
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn result(&self) -> Option<&CatalogResult> {
        self.result.as_ref()
    }

    pub fn movies(&self) -> &[NormalizedMovie] {
        &self.movies
    }

    /// Successful load with nothing in it.
    pub fn is_empty(&self) -> bool {
        self.status == ViewStatus::Ready && self.movies.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        self.result.as_ref().map_or(0, |r| r.total_pages)
    }

    pub fn pagination(&self) -> PageWindow {
        pagination::window(self.filters().page, self.total_pages())
    }

    pub fn languages(&self) -> LanguagePartition {
        let items = self.result.as_ref().map_or(&[][..], |r| r.items.as_slice());
        partition(&self.languages, items)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use moviefinder_core::filters::MemoryState;
    use moviefinder_core::query::DiscoverQuery;
    use moviefinder_core::{CountryCode, Genre, LanguageCode, RawMovie};

    use super::*;
    use crate::{MovieDetails, Video};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn view(initial: Option<&str>) -> BrowseView<MemoryState> {
        BrowseView::new(
            MemoryState::new(initial.map(str::to_string)),
            Listing::Newest,
            ImageResolver::default(),
        )
    }

    fn movie(id: u32, lang: &str) -> RawMovie {
        RawMovie {
            id: id.to_string(),
            title: Some(format!("Movie {id}")),
            genre_ids: vec![28],
            original_language: Some(lang.to_string()),
            ..Default::default()
        }
    }

    fn page(ids: &[u32], total: u64) -> CatalogResult {
        CatalogResult::new(ids.iter().map(|id| movie(*id, "fr")).collect(), total)
    }

    /// Serves canned pages and records every query it receives.
    #[derive(Default)]
    struct FakeCatalog {
        total_pages: u64,
        fail: bool,
        queries: Mutex<Vec<CatalogQuery>>,
    }

    impl FakeCatalog {
        fn respond(&self, query: CatalogQuery) -> Result<CatalogResult, CatalogError> {
            let n = query.page();
            self.queries.lock().unwrap().push(query);
            if self.fail {
                return Err(CatalogError::Unavailable("offline".into()));
            }
            let ids: Vec<u32> = if u64::from(n) <= self.total_pages {
                vec![n * 10, n * 10 + 1]
            } else {
                vec![]
            };
            Ok(page(&ids, self.total_pages))
        }
    }

    #[async_trait::async_trait]
    impl Catalog for FakeCatalog {
        fn name(&self) -> &str {
            "fake"
        }
        async fn get_popular(&self, page: u32) -> Result<CatalogResult, CatalogError> {
            self.respond(CatalogQuery::Popular { page })
        }
        async fn search_by_text(
            &self,
            text: &str,
            page: u32,
        ) -> Result<CatalogResult, CatalogError> {
            self.respond(CatalogQuery::Search {
                text: text.to_string(),
                page,
            })
        }
        async fn discover_by_facets(
            &self,
            query: &DiscoverQuery,
        ) -> Result<CatalogResult, CatalogError> {
            self.respond(CatalogQuery::Discover(query.clone()))
        }
        async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError> {
            Ok(vec![Genre {
                id: 28,
                name: "Action".into(),
            }])
        }
        async fn get_languages(&self) -> Result<Vec<LanguageEntry>, CatalogError> {
            Err(CatalogError::Unavailable("offline".into()))
        }
        async fn get_details(&self, _id: &str) -> Result<MovieDetails, CatalogError> {
            Err(CatalogError::NotFound)
        }
        async fn get_videos(&self, _id: &str) -> Result<Vec<Video>, CatalogError> {
            Ok(vec![])
        }
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut v = view(None);
        let first = v.begin(today());
        v.set(FilterField::Country(CountryCode::parse("FR")));
        let second = v.begin(today());

        assert_eq!(v.complete(second.token, Ok(page(&[2], 3))), Completion::Applied { reissue: false });
        assert_eq!(v.complete(first.token, Ok(page(&[1], 9))), Completion::Stale);
        assert_eq!(v.movies()[0].id, "2");
        assert_eq!(v.total_pages(), 3);
    }

    #[test]
    fn filter_change_supersedes_outstanding_request() {
        let mut v = view(None);
        let pending = v.begin(today());
        v.set(FilterField::Query("drac".into()));
        assert_eq!(v.complete(pending.token, Ok(page(&[1], 1))), Completion::Stale);
        assert!(v.result().is_none());
    }

    #[test]
    fn failure_keeps_last_good_state() {
        let mut v = view(Some("country=FR&page=3"));
        let ok = v.begin(today());
        v.complete(ok.token, Ok(page(&[1, 2], 20)));

        let failing = v.begin(today());
        assert_eq!(
            v.complete(failing.token, Err(CatalogError::Unavailable("timeout".into()))),
            Completion::Failed
        );
        assert_eq!(v.status(), &ViewStatus::Failed("Failed to load movies".into()));
        assert_eq!(v.movies().len(), 2);
        assert_eq!(v.filters().page, 3);
        assert_eq!(v.pagination().buttons, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn refresh_normalizes_with_genre_names() {
        let catalog = FakeCatalog {
            total_pages: 20,
            ..Default::default()
        };
        let mut v = view(Some("query=&genre=All&country=FR&lang=Any&page=4"));
        v.load_lookups(&catalog).await;

        assert_eq!(v.refresh(&catalog, today()).await, Completion::Applied { reissue: false });
        assert_eq!(v.movies()[0].id, "40");
        assert_eq!(v.movies()[0].genre_names, vec!["Action"]);

        let w = v.pagination();
        assert_eq!(w.buttons, vec![2, 3, 4, 5, 6]);
        assert!(w.show_first);
        assert!(w.show_trail_ellipsis);
        assert!(w.show_last);

        match &catalog.queries.lock().unwrap()[0] {
            CatalogQuery::Discover(q) => {
                assert_eq!(q.country.as_ref().map(CountryCode::as_str), Some("FR"));
                assert!(q.language.is_none());
            }
            other => panic!("expected discovery, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_search_is_success_without_pagination() {
        let catalog = FakeCatalog::default();
        let mut v = view(Some("query=drac&page=1"));
        v.refresh(&catalog, today()).await;

        assert!(v.is_empty());
        assert_eq!(v.total_pages(), 1);
        assert!(v.pagination().is_empty());
        assert!(catalog.queries.lock().unwrap()[0].is_search());
    }

    #[tokio::test]
    async fn page_past_the_end_is_clamped_and_refetched() {
        let catalog = FakeCatalog {
            total_pages: 4,
            ..Default::default()
        };
        let mut v = view(Some("page=9"));
        assert_eq!(v.refresh(&catalog, today()).await, Completion::Applied { reissue: false });
        assert_eq!(v.filters().page, 4);
        assert_eq!(v.movies()[0].id, "40");
        assert!(v.controller().shared().read().unwrap().ends_with("page=4"));

        let pages: Vec<u32> = catalog.queries.lock().unwrap().iter().map(|q| q.page()).collect();
        assert_eq!(pages, vec![9, 4]);
    }

    #[tokio::test]
    async fn languages_follow_current_page_and_fall_back() {
        let catalog = FakeCatalog {
            total_pages: 2,
            ..Default::default()
        };
        let mut v = view(None);
        v.set(FilterField::Language(LanguageCode::parse("fr")));
        v.load_lookups(&catalog).await;
        v.refresh(&catalog, today()).await;

        let langs = v.languages();
        let avail: Vec<_> = langs.available_now.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(avail, vec!["fr"]);
        assert!(langs.others.iter().any(|l| l.code == "en"));
    }

    #[tokio::test]
    async fn failing_catalog_surfaces_once_without_retry() {
        let catalog = FakeCatalog {
            fail: true,
            ..Default::default()
        };
        let mut v = view(None);
        assert_eq!(v.refresh(&catalog, today()).await, Completion::Failed);
        assert_eq!(catalog.queries.lock().unwrap().len(), 1);
        assert!(!v.is_empty());
    }
}
