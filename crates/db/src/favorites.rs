//! Persistent favorites set shared by every browsing view.

use std::collections::HashSet;

use moviefinder_core::NormalizedMovie;
use moviefinder_core::favorites::{
    FavoriteRecord, FavoritesDocument, migrate_favorites, normalize_record,
};
use moviefinder_core::images::ImageResolver;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::StorageError;
use crate::kv::KvStore;

pub const FAVORITES_KEY: &str = "favorites";

/// Published after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoritesEvent {
    pub id: String,
    pub favorite: bool,
}

/// Deduplicated favorites keyed by movie id.
///
/// Every mutation rewrites the whole document in one statement and only
/// then updates the in-memory set. The store does no locking of its own;
/// callers that share it across tasks wrap it in a mutex.
#[derive(Debug)]
pub struct FavoritesStore {
    kv: KvStore,
    images: ImageResolver,
    records: Vec<FavoriteRecord>,
    ids: HashSet<String>,
    events: broadcast::Sender<FavoritesEvent>,
}

impl FavoritesStore {
    /// Reads and migrates the persisted set.
    pub async fn load(kv: KvStore, images: ImageResolver) -> Result<Self, StorageError> {
        let (events, _) = broadcast::channel(64);
        let mut store = Self {
            kv,
            images,
            records: Vec::new(),
            ids: HashSet::new(),
            events,
        };
        store.refresh().await?;
        Ok(store)
    }

    /// Re-reads storage, picking up writes made through another handle.
    pub async fn refresh(&mut self) -> Result<(), StorageError> {
        let stored = self.kv.get(FAVORITES_KEY).await?;
        let document = match stored.as_deref() {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!(error = %e, "stored favorites are not valid JSON, starting empty");
                serde_json::Value::Null
            }),
            None => serde_json::Value::Null,
        };

        let report = migrate_favorites(&document, &self.images);
        if !report.issues.is_empty() {
            warn!(
                dropped = report.issues.len(),
                kept = report.records.len(),
                "favorites migrated with malformed entries"
            );
        }
        debug!(count = report.records.len(), "favorites loaded");

        self.ids = report.records.iter().map(|r| r.id.clone()).collect();
        self.records = report.records;
        Ok(())
    }

    pub fn records(&self) -> &[FavoriteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.contains(id.trim())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesEvent> {
        self.events.subscribe()
    }

    /// Adds the movie when absent, removes it when present. Returns whether
    /// it is a favorite afterwards.
    pub async fn toggle(&mut self, movie: &NormalizedMovie) -> Result<bool, StorageError> {
        let id = movie.id.trim().to_string();
        let mut next = self.records.clone();
        let favorite = if self.ids.contains(&id) {
            next.retain(|r| r.id != id);
            false
        } else {
            next.push(self.normalized_copy(movie));
            true
        };
        self.commit(next, id, favorite).await?;
        Ok(favorite)
    }

    /// Removes by id. Returns `false` when it was not a favorite.
    pub async fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        let id = id.trim().to_string();
        if !self.ids.contains(&id) {
            return Ok(false);
        }
        let next = self.records.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(next, id, false).await?;
        Ok(true)
    }

    /// Pretty-printed records for download.
    pub fn export_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Stored exactly as a reload would produce it.
    fn normalized_copy(&self, movie: &NormalizedMovie) -> FavoriteRecord {
        normalize_record(movie, &self.images)
    }

    async fn commit(
        &mut self,
        next: Vec<FavoriteRecord>,
        id: String,
        favorite: bool,
    ) -> Result<(), StorageError> {
        let document = FavoritesDocument::new(next);
        let encoded = serde_json::to_string(&document)?;
        self.kv.set(FAVORITES_KEY, &encoded).await?;

        info!(id = %id, favorite, count = document.favorites.len(), "favorites saved");
        self.ids = document.favorites.iter().map(|r| r.id.clone()).collect();
        self.records = document.favorites;
        // No subscribers is fine.
        let _ = self.events.send(FavoritesEvent { id, favorite });
        Ok(())
    }
}
