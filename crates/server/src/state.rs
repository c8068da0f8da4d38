use std::sync::Arc;

use moviefinder_catalog::Catalog;
use moviefinder_core::images::ImageResolver;
use moviefinder_db::{FavoritesStore, KvStore};
use tokio::sync::Mutex;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub kv: KvStore,
    pub catalog: Arc<dyn Catalog>,
    pub favorites: Arc<Mutex<FavoritesStore>>,
    pub images: ImageResolver,
}

impl AppState {
    /// Loads the favorites set from `kv` and wires the collaborators.
    pub async fn new(
        kv: KvStore,
        catalog: Arc<dyn Catalog>,
        images: ImageResolver,
    ) -> Result<Self, moviefinder_db::StorageError> {
        let favorites = FavoritesStore::load(kv.clone(), images.clone()).await?;
        Ok(Self {
            kv,
            catalog,
            favorites: Arc::new(Mutex::new(favorites)),
            images,
        })
    }
}
