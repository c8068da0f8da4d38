//! Shareable form of a [`FilterState`].
//!
//! The canonical encoding is an `application/x-www-form-urlencoded` string
//! with every key present in a fixed order:
//!
//! ```text
//! query=<text>&genre=<id|All>&country=<CC|All>&lang=<code|Any>&page=<n>
//! ```
//!
//! Decoding is lenient about key order, missing keys, unknown keys and a
//! leading `?`. Strings produced by [`encode`] decode back to the same state
//! and re-encode byte for byte.

use thiserror::Error;
use url::form_urlencoded;

use crate::filters::FilterState;
use crate::types::{CountryCode, GenreId, LanguageCode};

pub const ALL_SENTINEL: &str = "All";
pub const ANY_SENTINEL: &str = "Any";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid page: {0:?}")]
    InvalidPage(String),
    #[error("invalid genre: {0:?}")]
    InvalidGenre(String),
    #[error("invalid country: {0:?}")]
    InvalidCountry(String),
    #[error("invalid language: {0:?}")]
    InvalidLanguage(String),
}

pub fn encode(state: &FilterState) -> String {
    let genre = state
        .genre
        .map(|g| g.to_string())
        .unwrap_or_else(|| ALL_SENTINEL.to_string());
    let country = state
        .country
        .as_ref()
        .map_or(ALL_SENTINEL, CountryCode::as_str);
    let language = state
        .language
        .as_ref()
        .map_or(ANY_SENTINEL, LanguageCode::as_str);

    form_urlencoded::Serializer::new(String::new())
        .append_pair("query", &state.query)
        .append_pair("genre", &genre)
        .append_pair("country", country)
        .append_pair("lang", language)
        .append_pair("page", &state.page.to_string())
        .finish()
}

pub fn decode(encoded: &str) -> Result<FilterState, CodecError> {
    let input = encoded.strip_prefix('?').unwrap_or(encoded);
    let mut state = FilterState::default();

    for (key, value) in form_urlencoded::parse(input.as_bytes()) {
        match key.as_ref() {
            "query" | "q" => state.query = value.into_owned(),
            "genre" => state.genre = decode_genre(&value)?,
            "country" => state.country = decode_country(&value)?,
            "lang" | "language" => state.language = decode_language(&value)?,
            "page" => state.page = decode_page(&value)?,
            _ => {}
        }
    }

    Ok(state)
}

fn is_sentinel(value: &str, sentinel: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case(sentinel)
}

fn decode_genre(value: &str) -> Result<Option<GenreId>, CodecError> {
    if is_sentinel(value, ALL_SENTINEL) {
        return Ok(None);
    }
    value
        .trim()
        .parse::<u32>()
        .map(|id| Some(GenreId(id)))
        .map_err(|_| CodecError::InvalidGenre(value.to_string()))
}

fn decode_country(value: &str) -> Result<Option<CountryCode>, CodecError> {
    if is_sentinel(value, ALL_SENTINEL) {
        return Ok(None);
    }
    CountryCode::parse(value)
        .map(Some)
        .ok_or_else(|| CodecError::InvalidCountry(value.to_string()))
}

fn decode_language(value: &str) -> Result<Option<LanguageCode>, CodecError> {
    if is_sentinel(value, ANY_SENTINEL) {
        return Ok(None);
    }
    LanguageCode::parse(value)
        .map(Some)
        .ok_or_else(|| CodecError::InvalidLanguage(value.to_string()))
}

fn decode_page(value: &str) -> Result<u32, CodecError> {
    match value.trim().parse::<u32>() {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(CodecError::InvalidPage(value.to_string())),
    }
}
