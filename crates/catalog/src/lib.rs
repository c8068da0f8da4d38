pub mod browse;
pub mod provider;
pub mod tmdb;

use moviefinder_core::RawMovie;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use browse::{BrowseView, Completion, PendingRequest, RequestToken, ViewStatus};
pub use provider::Catalog;
pub use tmdb::{TmdbClient, TmdbConfig};

/// Failures surfaced by a catalog. Transport problems of every kind
/// collapse into `Unavailable`; the message is for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("not found")]
    NotFound,
}

impl From<CatalogError> for moviefinder_core::error::ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => Self::NotFound("movie not found".into()),
            CatalogError::Unavailable(msg) => Self::CatalogUnavailable(msg),
        }
    }
}

/// Detail lookup: the list shape plus fields only the detail endpoint has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieDetails {
    pub movie: RawMovie,
    pub tagline: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub site: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
}

impl Video {
    /// Watch URL for sites we know how to link to.
    pub fn watch_url(&self) -> Option<String> {
        match self.site.as_str() {
            "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "Vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}

/// Best trailer: a YouTube trailer, else a YouTube teaser.
pub fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    let youtube = |kind: &'static str| {
        videos
            .iter()
            .find(move |v| v.site == "YouTube" && v.kind == kind && !v.key.is_empty())
    };
    youtube("Trailer").or_else(|| youtube("Teaser"))
}
