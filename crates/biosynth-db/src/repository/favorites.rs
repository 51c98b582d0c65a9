//! # Favorites Repository
//!
//! Persists saved product ids as a JSON string array under
//! [`FAVORITES_KEY`], independently of the cart.

use tracing::{debug, warn};

use biosynth_core::Favorites;

use crate::error::{DbError, DbResult};
use crate::repository::storage::ClientStorageRepository;

/// Storage key for the favorites blob.
pub const FAVORITES_KEY: &str = "biosynth_favorites";

/// Repository for saved product ids.
#[derive(Debug, Clone)]
pub struct FavoritesRepository {
    storage: ClientStorageRepository,
}

impl FavoritesRepository {
    /// Creates a new FavoritesRepository.
    pub fn new(storage: ClientStorageRepository) -> Self {
        FavoritesRepository { storage }
    }

    /// Loads the saved ids. Missing blob → empty set.
    pub async fn load(&self) -> DbResult<Favorites> {
        let Some(raw) = self.storage.get(FAVORITES_KEY).await? else {
            return Ok(Favorites::new());
        };

        let ids: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| DbError::corrupt(FAVORITES_KEY, e))?;

        debug!(count = ids.len(), "Loaded favorites");
        Ok(Favorites::from_ids(ids))
    }

    /// Like [`load`](Self::load), but any failure yields an empty set.
    pub async fn load_or_empty(&self) -> Favorites {
        self.load().await.unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable favorites");
            Favorites::new()
        })
    }

    /// Overwrites the stored blob.
    pub async fn save(&self, favorites: &Favorites) -> DbResult<()> {
        let json = serde_json::to_string(favorites)?;
        self.storage.put(FAVORITES_KEY, &json).await
    }
}
