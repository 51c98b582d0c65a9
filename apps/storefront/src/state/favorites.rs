//! Saved products store. Same shape as the cart store: watch channel for
//! readers, background writer for storage.

use tokio::sync::watch;
use tracing::debug;

use biosynth_core::Favorites;
use biosynth_db::FavoritesRepository;

use crate::state::persist::Persister;

#[derive(Debug)]
pub struct FavoritesStore {
    favorites: watch::Sender<Favorites>,
    persister: Persister<Favorites>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        FavoritesStore {
            favorites: watch::Sender::new(Favorites::new()),
            persister: Persister::disabled(),
        }
    }

    /// Restores saved ids; missing or unreadable storage starts empty.
    pub async fn load(repo: FavoritesRepository) -> Self {
        let favorites = repo.load_or_empty().await;
        debug!(count = favorites.len(), "Favorites restored");

        let persister = Persister::spawn("favorites", move |favorites: Favorites| {
            let repo = repo.clone();
            async move { repo.save(&favorites).await }
        });

        FavoritesStore {
            favorites: watch::Sender::new(favorites),
            persister,
        }
    }

    pub fn snapshot(&self) -> Favorites {
        self.favorites.borrow().clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.favorites.borrow().contains(id)
    }

    pub fn subscribe(&self) -> watch::Receiver<Favorites> {
        self.favorites.subscribe()
    }

    /// Returns `true` if `id` is now saved.
    pub fn toggle(&self, id: &str) -> bool {
        let mut favorites = self.snapshot();
        let saved = favorites.toggle(id);
        debug!(product_id = %id, saved, "Favorite toggled");

        self.persister.save(favorites.clone());
        self.favorites.send_replace(favorites);
        saved
    }

    pub async fn flush(&self) {
        self.persister.flush().await;
    }
}

impl Default for FavoritesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosynth_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let store = FavoritesStore::load(db.favorites()).await;
        assert!(store.toggle("KLOW"));
        assert!(store.toggle("TA10"));
        assert!(!store.toggle("KLOW"));
        store.flush().await;

        let restored = FavoritesStore::load(db.favorites()).await;
        assert_eq!(restored.snapshot().list(), ["TA10"]);
        assert!(restored.contains("TA10"));
    }

    #[tokio::test]
    async fn test_subscribers_see_toggles() {
        let store = FavoritesStore::new();
        let mut rx = store.subscribe();

        store.toggle("BB10");
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().contains("BB10"));
    }
}
