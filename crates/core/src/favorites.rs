//! Persisted favorites schema and migration from older shapes.
//!
//! Version 2 is `{ "version": 2, "favorites": [NormalizedMovie, ...] }`.
//! Version 1 was a bare JSON array whose records came from several views,
//! each with its own field naming: `title` or `name`, `genre` string lists
//! or `genres` object lists, `rating` or `vote_average`, an absolute
//! `poster` URL or a `poster_path`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::images::ImageResolver;
use crate::movie::{MAX_GENRE_NAMES, NormalizedMovie, year_of};
use crate::types::id_from_value;

pub const FAVORITES_SCHEMA_VERSION: u32 = 2;

pub type FavoriteRecord = NormalizedMovie;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesDocument {
    pub version: u32,
    pub favorites: Vec<FavoriteRecord>,
}

impl FavoritesDocument {
    pub fn new(favorites: Vec<FavoriteRecord>) -> Self {
        Self {
            version: FAVORITES_SCHEMA_VERSION,
            favorites,
        }
    }
}

/// A stored record that could not be carried forward. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationIssue {
    /// Entry at `index` is not a JSON object.
    NotAnObject { index: usize },
    /// Entry at `index` has no usable id.
    MissingId { index: usize },
    /// The stored document is neither an array nor a versioned envelope.
    UnrecognizedDocument,
}

impl std::fmt::Display for MigrationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { index } => write!(f, "favorite #{index} is not an object"),
            Self::MissingId { index } => write!(f, "favorite #{index} has no id"),
            Self::UnrecognizedDocument => f.write_str("favorites document has an unknown shape"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub records: Vec<FavoriteRecord>,
    pub issues: Vec<MigrationIssue>,
}

/// Migrates any stored favorites document to current records.
///
/// Every record is normalized, whatever version it claims. Records that
/// share an id collapse to the first one.
pub fn migrate_favorites(document: &Value, images: &ImageResolver) -> MigrationReport {
    let entries: &[Value] = match document {
        Value::Null => &[],
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("favorites") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Null) | None if map.is_empty() => &[],
            _ => return unrecognized(),
        },
        _ => return unrecognized(),
    };

    let mut report = MigrationReport::default();
    let mut seen = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let Some(fields) = entry.as_object() else {
            warn!(index, "malformed legacy favorite: not an object");
            report.issues.push(MigrationIssue::NotAnObject { index });
            continue;
        };
        let record = migrate_record(fields, images);
        if record.id.is_empty() {
            warn!(index, "malformed legacy favorite: missing id");
            report.issues.push(MigrationIssue::MissingId { index });
            continue;
        }
        if seen.insert(record.id.clone()) {
            report.records.push(record);
        }
    }

    report
}

fn unrecognized() -> MigrationReport {
    warn!("malformed favorites document, starting empty");
    MigrationReport {
        records: Vec::new(),
        issues: vec![MigrationIssue::UnrecognizedDocument],
    }
}

type Fields = serde_json::Map<String, Value>;

/// Normalizes one record of any known shape. Missing fields become empty.
pub fn migrate_record(fields: &Fields, images: &ImageResolver) -> FavoriteRecord {
    NormalizedMovie {
        id: fields.get("id").map(id_from_value).unwrap_or_default(),
        title: first_string(fields, &["title", "name", "original_title"]),
        year: year_field(fields),
        genre_names: genre_names(fields),
        rating: rating(fields),
        poster_url: poster_url(fields, images),
        overview: first_string(fields, &["overview"]),
    }
}

/// Applies load-time normalization to a record already in the current
/// shape, so a freshly added favorite equals its reloaded copy.
pub fn normalize_record(record: &FavoriteRecord, images: &ImageResolver) -> FavoriteRecord {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => migrate_record(&fields, images),
        _ => record.clone(),
    }
}

fn first_string(fields: &Fields, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn year_field(fields: &Fields) -> String {
    match fields.get("year") {
        Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
        Some(Value::Number(n)) => return n.to_string(),
        _ => {}
    }
    year_of(fields.get("release_date").and_then(Value::as_str))
}

fn genre_names(fields: &Fields) -> Vec<String> {
    ["genre_names", "genreNames", "genre", "genres"]
        .iter()
        .filter_map(|k| fields.get(*k))
        .filter_map(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|g| match g {
                    Value::String(s) => Some(s.trim()),
                    Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::trim),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .take(MAX_GENRE_NAMES)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .find(|names| !names.is_empty())
        .unwrap_or_default()
}

fn rating(fields: &Fields) -> f64 {
    ["rating", "vote_average"]
        .iter()
        .filter_map(|k| fields.get(*k))
        .find_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|r| r.is_finite())
        .unwrap_or(0.0)
}

fn poster_url(fields: &Fields, images: &ImageResolver) -> String {
    let absolute = first_string(fields, &["poster_url", "posterUrl", "poster"]);
    if !absolute.is_empty() {
        return absolute;
    }
    images.poster(fields.get("poster_path").and_then(Value::as_str))
}
