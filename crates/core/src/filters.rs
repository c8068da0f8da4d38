//! Filter state of one browsing view and the controller that owns it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::types::{CATALOG_PAGE_CAP, CountryCode, GenreId, LanguageCode};

/// User-selected filters. `None` on a facet means "no filter" and is
/// serialized as the `All`/`Any` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub query: String,
    pub genre: Option<GenreId>,
    pub country: Option<CountryCode>,
    pub language: Option<LanguageCode>,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            genre: None,
            country: None,
            language: None,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn has_facets(&self) -> bool {
        self.genre.is_some() || self.country.is_some() || self.language.is_some()
    }
}

/// A single-field mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterField {
    Query(String),
    Genre(Option<GenreId>),
    Country(Option<CountryCode>),
    Language(Option<LanguageCode>),
    Page(u32),
}

/// Where the serialized filter state lives outside the engine, typically
/// the query string of the current location.
pub trait SharedState {
    fn read(&self) -> Option<String>;

    /// Overwrites the stored representation in place.
    fn replace(&mut self, encoded: String);
}

/// In-memory [`SharedState`].
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    value: Option<String>,
    writes: usize,
}

impl MemoryState {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            value: initial,
            writes: 0,
        }
    }

    /// Number of `replace` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SharedState for MemoryState {
    fn read(&self) -> Option<String> {
        self.value.clone()
    }

    fn replace(&mut self, encoded: String) {
        self.value = Some(encoded);
        self.writes += 1;
    }
}

/// Owns the current [`FilterState`] and keeps the shared representation in
/// step with it.
///
/// Every effective mutation bumps [`revision`](Self::revision); whoever
/// drives the view re-queries the catalog when the revision moves.
#[derive(Debug)]
pub struct FilterController<S: SharedState> {
    state: FilterState,
    shared: S,
    max_known_page: u32,
    revision: u64,
}

impl<S: SharedState> FilterController<S> {
    /// Builds the initial state from `shared` when it holds a decodable
    /// value, otherwise from defaults, and writes the canonical form back.
    pub fn hydrate(shared: S) -> Self {
        let state = match shared.read() {
            Some(raw) => match codec::decode(&raw) {
                Ok(state) => state,
                Err(e) => {
                    debug!(error = %e, "shared filter state unreadable, using defaults");
                    FilterState::default()
                }
            },
            None => FilterState::default(),
        };

        let mut controller = Self {
            state,
            shared,
            max_known_page: CATALOG_PAGE_CAP,
            revision: 0,
        };
        controller.state.page = controller.state.page.clamp(1, CATALOG_PAGE_CAP);
        controller.publish();
        controller
    }

    pub fn filters(&self) -> &FilterState {
        &self.state
    }

    pub fn shared(&self) -> &S {
        &self.shared
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn max_known_page(&self) -> u32 {
        self.max_known_page
    }

    pub fn encoded(&self) -> String {
        codec::encode(&self.state)
    }

    /// Applies one mutation. Any field other than the page resets the page
    /// to 1 and forgets the known page total. Returns `false` when nothing
    /// changed.
    pub fn set(&mut self, field: FilterField) -> bool {
        let mut next = self.state.clone();
        match field {
            FilterField::Page(p) => return self.set_page(p),
            FilterField::Query(q) => next.query = q,
            FilterField::Genre(g) => next.genre = g,
            FilterField::Country(c) => next.country = c,
            FilterField::Language(l) => next.language = l,
        }
        if next == self.state {
            return false;
        }
        next.page = 1;
        // The old total says nothing about the new result set.
        self.max_known_page = CATALOG_PAGE_CAP;
        self.commit(next);
        true
    }

    /// Moves to page `p`, clamped into `[1, max_known_page]`.
    pub fn set_page(&mut self, p: u32) -> bool {
        let page = p.clamp(1, self.max_known_page);
        if page == self.state.page {
            return false;
        }
        let mut next = self.state.clone();
        next.page = page;
        self.commit(next);
        true
    }

    /// Records the newest page total. When the stored page no longer
    /// exists it is clamped, and `true` tells the caller to re-issue.
    pub fn observe_total_pages(&mut self, total_pages: u32) -> bool {
        self.max_known_page = total_pages.clamp(1, CATALOG_PAGE_CAP);
        if self.state.page <= self.max_known_page {
            return false;
        }
        debug!(
            page = self.state.page,
            max = self.max_known_page,
            "stored page beyond result total, clamping"
        );
        let mut next = self.state.clone();
        next.page = self.max_known_page;
        self.commit(next);
        true
    }

    fn commit(&mut self, next: FilterState) {
        self.state = next;
        self.revision += 1;
        self.publish();
    }

    fn publish(&mut self) {
        self.shared.replace(codec::encode(&self.state));
    }
}
