//! Maps a [`FilterState`] to the request submitted to the catalog.
//!
//! Precedence:
//! 1. Query text of two or more characters (after trimming) selects search
//!    mode; facets are ignored.
//! 2. Otherwise discovery mode: sorted, adult titles excluded, released on
//!    or before `today`, with a minimum vote count.
//! 3. Unset facets never appear in the request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filters::FilterState;
use crate::types::{CountryCode, GenreId, LanguageCode};

pub const MIN_SEARCH_CHARS: usize = 2;
pub const DEFAULT_MIN_VOTE_COUNT: u32 = 50;

/// Which listing a browsing view shows when no text search is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    #[default]
    Newest,
    Popular,
}

impl Listing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Popular => "popular",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(Self::Newest),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }

    fn sort(self) -> SortOrder {
        match self {
            Self::Newest => SortOrder::PrimaryReleaseDateDesc,
            Self::Popular => SortOrder::PopularityDesc,
        }
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "primary_release_date.desc")]
    PrimaryReleaseDateDesc,
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryReleaseDateDesc => "primary_release_date.desc",
            Self::PopularityDesc => "popularity.desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Faceted discovery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverQuery {
    pub sort: SortOrder,
    pub include_adult: bool,
    pub min_vote_count: u32,
    pub released_before: NaiveDate,
    pub released_after: Option<NaiveDate>,
    pub genre: Option<GenreId>,
    pub country: Option<CountryCode>,
    pub language: Option<LanguageCode>,
    pub page: u32,
}

/// A request ready to submit to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CatalogQuery {
    Popular { page: u32 },
    Search { text: String, page: u32 },
    Discover(DiscoverQuery),
}

impl CatalogQuery {
    pub fn page(&self) -> u32 {
        match self {
            Self::Popular { page } | Self::Search { page, .. } => *page,
            Self::Discover(q) => q.page,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Self::Search { .. })
    }

    /// Query parameters for the catalog endpoint, in a fixed order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Popular { page } => vec![("page", page.to_string())],
            Self::Search { text, page } => {
                vec![("query", text.clone()), ("page", page.to_string())]
            }
            Self::Discover(q) => {
                let mut params = vec![
                    ("sort_by", q.sort.as_str().to_string()),
                    ("include_adult", q.include_adult.to_string()),
                    ("vote_count.gte", q.min_vote_count.to_string()),
                    ("primary_release_date.lte", q.released_before.to_string()),
                ];
                if let Some(after) = q.released_after {
                    params.push(("primary_release_date.gte", after.to_string()));
                }
                if let Some(genre) = q.genre {
                    params.push(("with_genres", genre.to_string()));
                }
                if let Some(ref country) = q.country {
                    params.push(("with_origin_country", country.to_string()));
                }
                if let Some(ref language) = q.language {
                    params.push(("with_original_language", language.to_string()));
                }
                params.push(("page", q.page.to_string()));
                params
            }
        }
    }
}

/// Builder settings for one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    pub listing: Listing,
    pub min_vote_count: u32,
    pub released_after: Option<NaiveDate>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            listing: Listing::Newest,
            min_vote_count: DEFAULT_MIN_VOTE_COUNT,
            released_after: None,
        }
    }
}

impl QueryBuilder {
    pub fn for_listing(listing: Listing) -> Self {
        Self {
            listing,
            ..Default::default()
        }
    }

    pub fn build(&self, filters: &FilterState, today: NaiveDate) -> CatalogQuery {
        let page = filters.page.max(1);
        let text = filters.query.trim();

        if text.chars().count() >= MIN_SEARCH_CHARS {
            return CatalogQuery::Search {
                text: text.to_string(),
                page,
            };
        }

        if self.listing == Listing::Popular && !filters.has_facets() {
            return CatalogQuery::Popular { page };
        }

        CatalogQuery::Discover(DiscoverQuery {
            sort: self.listing.sort(),
            include_adult: false,
            min_vote_count: self.min_vote_count,
            released_before: today,
            released_after: self.released_after,
            genre: filters.genre,
            country: filters.country.clone(),
            language: filters.language.clone(),
            page,
        })
    }
}

/// [`QueryBuilder::build`] with default settings.
pub fn build(filters: &FilterState, today: NaiveDate) -> CatalogQuery {
    QueryBuilder::default().build(filters, today)
}
