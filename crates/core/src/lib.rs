//! Discovery state engine: filter state, query building, pagination,
//! language partitioning and the favorites schema.
//!
//! Everything in this crate is pure. Network access lives in
//! `moviefinder-catalog`, persistence in `moviefinder-db`.

pub mod codec;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod images;
pub mod languages;
pub mod movie;
pub mod pagination;
pub mod query;
pub mod types;

pub use filters::{FilterController, FilterField, FilterState, MemoryState, SharedState};
pub use movie::{GenreLookup, NormalizedMovie};
pub use types::{CatalogResult, CountryCode, Genre, GenreId, LanguageCode, LanguageEntry, RawMovie};
