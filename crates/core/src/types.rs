use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::{ALL_SENTINEL, ANY_SENTINEL};

/// Hard limit on how many result pages the catalog will serve.
pub const CATALOG_PAGE_CAP: u32 = 500;

/// Catalog genre identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreId(pub u32);

impl std::fmt::Display for GenreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-3166 country code, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Returns `None` for empty, non-alphanumeric or sentinel input.
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_code(raw).map(|c| Self(c.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO-639-1 language code, always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Returns `None` for empty, non-alphanumeric or sentinel input.
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_code(raw).map(|c| Self(c.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejects blanks, non-alphanumerics and the "no filter" sentinels, which
/// must never name a real facet value.
fn normalize_code(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    if [ALL_SENTINEL, ANY_SENTINEL]
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
    {
        return None;
    }
    Some(trimmed)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
}

/// One movie as the catalog returns it in list, search and detail payloads.
///
/// Every field is optional on the wire; `id` arrives as a number from the
/// catalog and as a string from older persisted data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMovie {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: Option<String>,
    pub original_language: Option<String>,
}

/// One page of catalog results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogResult {
    pub items: Vec<RawMovie>,
    pub total_pages: u32,
}

impl CatalogResult {
    /// Clamps the upstream page total into `[1, CATALOG_PAGE_CAP]`.
    pub fn new(items: Vec<RawMovie>, upstream_total_pages: u64) -> Self {
        let total_pages = upstream_total_pages.clamp(1, u64::from(CATALOG_PAGE_CAP)) as u32;
        Self { items, total_pages }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Coerces a numeric or string id into its string form. Anything else is "".
pub fn id_from_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(|v| v.to_string())
            .or_else(|| n.as_i64().map(|v| v.to_string()))
            .unwrap_or_else(|| n.to_string()),
        _ => String::new(),
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(id_from_value(&value))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
