use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::images::ImageResolver;
use crate::types::{Genre, RawMovie};

/// Cards and favorites show at most this many genre names.
pub const MAX_GENRE_NAMES: usize = 2;

/// The app-facing movie shape shared by listings, details and favorites.
///
/// Two records describe the same movie exactly when their `id`s are equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMovie {
    pub id: String,
    pub title: String,
    pub year: String,
    pub genre_names: Vec<String>,
    pub rating: f64,
    pub poster_url: String,
    pub overview: String,
}

impl NormalizedMovie {
    pub fn from_raw(raw: &RawMovie, genres: &GenreLookup, images: &ImageResolver) -> Self {
        let title = [&raw.title, &raw.name, &raw.original_title]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .cloned()
            .unwrap_or_default();

        let genre_names: Vec<String> = if raw.genre_ids.is_empty() {
            raw.genres
                .iter()
                .map(|g| g.name.clone())
                .filter(|n| !n.is_empty())
                .take(MAX_GENRE_NAMES)
                .collect()
        } else {
            raw.genre_ids
                .iter()
                .filter_map(|id| genres.name(*id))
                .map(str::to_string)
                .take(MAX_GENRE_NAMES)
                .collect()
        };

        Self {
            id: raw.id.clone(),
            title,
            year: year_of(raw.release_date.as_deref()),
            genre_names,
            rating: raw.vote_average.unwrap_or(0.0),
            poster_url: images.poster(raw.poster_path.as_deref()),
            overview: raw.overview.clone().unwrap_or_default(),
        }
    }
}

/// First four characters of an ISO date, or "" when absent.
pub fn year_of(date: Option<&str>) -> String {
    date.map(str::trim)
        .and_then(|d| d.get(..4))
        .unwrap_or_default()
        .to_string()
}

/// Genre id → name index built from the catalog's genre list.
#[derive(Debug, Clone, Default)]
pub struct GenreLookup {
    by_id: HashMap<u32, String>,
}

impl GenreLookup {
    pub fn new(genres: &[Genre]) -> Self {
        Self {
            by_id: genres.iter().map(|g| (g.id, g.name.clone())).collect(),
        }
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
