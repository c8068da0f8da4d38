//! Poster and backdrop URL resolution.

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const PLACEHOLDER_URL: &str = "https://via.placeholder.com/342x513?text=No+Image";

/// Size token used for posters on cards and in favorites.
pub const POSTER_SIZE: &str = "w342";

/// Turns catalog image paths into absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base: String,
    placeholder: String,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(IMAGE_BASE, PLACEHOLDER_URL)
    }
}

impl ImageResolver {
    pub fn new(base: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            placeholder: placeholder.into(),
        }
    }

    /// Absolute URL for `path` at `size`, or the placeholder when the
    /// path is missing or blank.
    pub fn url(&self, path: Option<&str>, size: &str) -> String {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) if p.starts_with('/') => format!("{}/{size}{p}", self.base),
            Some(p) => format!("{}/{size}/{p}", self.base),
            None => self.placeholder.clone(),
        }
    }

    pub fn poster(&self, path: Option<&str>) -> String {
        self.url(path, POSTER_SIZE)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }
}
