//! # Cart Repository
//!
//! Persists the requisition as one JSON array under [`CART_KEY`].
//!
//! The blob holds the flat line-item shape (product fields plus
//! `quantity`). Loading does not re-apply cart rules; callers hand the
//! result to `Cart::from_items`, which merges, clamps and drops
//! zero-quantity lines.

use tracing::{debug, warn};

use biosynth_core::CartLineItem;

use crate::error::{DbError, DbResult};
use crate::repository::storage::ClientStorageRepository;

/// Storage key for the requisition blob.
pub const CART_KEY: &str = "biosynth_cart";

/// Repository for the persisted requisition.
#[derive(Debug, Clone)]
pub struct CartRepository {
    storage: ClientStorageRepository,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(storage: ClientStorageRepository) -> Self {
        CartRepository { storage }
    }

    /// Loads stored line items.
    ///
    /// Missing blob → empty list. Undecodable blob → [`DbError::Corrupt`].
    pub async fn load(&self) -> DbResult<Vec<CartLineItem>> {
        let Some(raw) = self.storage.get(CART_KEY).await? else {
            debug!("No stored cart");
            return Ok(Vec::new());
        };

        let items: Vec<CartLineItem> =
            serde_json::from_str(&raw).map_err(|e| DbError::corrupt(CART_KEY, e))?;

        debug!(lines = items.len(), "Loaded stored cart");
        Ok(items)
    }

    /// Loads stored line items, treating any failure as an empty cart.
    pub async fn load_or_empty(&self) -> Vec<CartLineItem> {
        match self.load().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cart");
                Vec::new()
            }
        }
    }

    /// Overwrites the stored blob with `items`.
    pub async fn save(&self, items: &[CartLineItem]) -> DbResult<()> {
        let json = serde_json::to_string(items)?;
        self.storage.put(CART_KEY, &json).await
    }

    /// Deletes the stored blob.
    pub async fn clear(&self) -> DbResult<()> {
        self.storage.remove(CART_KEY).await?;
        Ok(())
    }
}
