//! # Cart Store
//!
//! Owns the live requisition, publishes changes and persists after every
//! mutation.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Shell Action             Store Method            Effect                │
//! │  ────────────             ────────────            ──────                │
//! │                                                                         │
//! │  add KLOW 2 ─────────────► add_item() ──────────► line += 2 (clamped)   │
//! │                                                                         │
//! │  inc / dec ──────────────► update_quantity() ───► line ± 1 or no-op     │
//! │                                                                         │
//! │  remove ─────────────────► remove_item() ───────► line deleted          │
//! │                                                                         │
//! │  clear ──────────────────► clear() ─────────────► empty                 │
//! │                                                                         │
//! │  Every change: watch::Sender::send_replace → subscribers notified       │
//! │                Persister::save(items)     → written in the background   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::watch;
use tracing::debug;

use biosynth_core::{AddOutcome, Cart, CartLineItem, Money, Product};
use biosynth_db::CartRepository;

use crate::state::persist::Persister;

/// The requisition store.
#[derive(Debug)]
pub struct CartStore {
    cart: watch::Sender<Cart>,
    persister: Persister<Vec<CartLineItem>>,
}

impl CartStore {
    /// An in-memory store with nothing persisted.
    pub fn new(max_per_item: u32) -> Self {
        CartStore {
            cart: watch::Sender::new(Cart::new(max_per_item)),
            persister: Persister::disabled(),
        }
    }

    /// Restores the stored requisition and persists every later change.
    ///
    /// A missing or unreadable blob starts an empty cart. Stored lines are
    /// re-clamped to `max_per_item`.
    pub async fn load(repo: CartRepository, max_per_item: u32) -> Self {
        let items = repo.load_or_empty().await;
        let cart = Cart::from_items(items, max_per_item);
        debug!(lines = cart.items().len(), "Cart restored");

        let persister = Persister::spawn("cart", move |items: Vec<CartLineItem>| {
            let repo = repo.clone();
            async move { repo.save(&items).await }
        });

        CartStore {
            cart: watch::Sender::new(cart),
            persister,
        }
    }

    // ===== Reads =====

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// Runs `f` against the current cart without copying it.
    pub fn with_cart<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        f(&self.cart.borrow())
    }

    pub fn total_item_count(&self) -> u32 {
        self.with_cart(Cart::total_item_count)
    }

    pub fn subtotal(&self) -> Money {
        self.with_cart(Cart::subtotal)
    }

    /// Change notifications; the receiver sees the latest cart.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }

    // ===== Mutations =====

    pub fn add_item(&self, product: &Product, quantity: u32) -> AddOutcome {
        debug!(product_id = %product.id, quantity, "Cart add");
        self.mutate(|cart| {
            let outcome = cart.add_item(product, quantity);
            (outcome, outcome.added > 0)
        })
    }

    /// Steps a line by `delta`. Returns false if out of bounds or missing.
    pub fn update_quantity(&self, product_id: &str, delta: i64) -> bool {
        debug!(product_id = %product_id, delta, "Cart update");
        self.mutate(|cart| {
            let changed = cart.update_quantity(product_id, delta);
            (changed, changed)
        })
    }

    pub fn remove_item(&self, product_id: &str) -> bool {
        debug!(product_id = %product_id, "Cart remove");
        self.mutate(|cart| {
            let removed = cart.remove_item(product_id);
            (removed, removed)
        })
    }

    pub fn clear(&self) {
        debug!("Cart clear");
        self.mutate(|cart| {
            let had_items = !cart.is_empty();
            cart.clear();
            ((), had_items)
        })
    }

    /// Waits for queued writes to finish.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// Applies `f` to a working copy; publishes and persists only if it
    /// reports a change.
    fn mutate<R>(&self, f: impl FnOnce(&mut Cart) -> (R, bool)) -> R {
        let mut cart = self.snapshot();
        let (value, changed) = f(&mut cart);

        if changed {
            self.persister.save(cart.items().to_vec());
            self.cart.send_replace(cart);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosynth_core::Catalog;
    use biosynth_db::{Database, DbConfig, CART_KEY};

    fn product(id: &str) -> &'static Product {
        Catalog::bundled().get(id).unwrap()
    }

    #[tokio::test]
    async fn test_mutations_notify_subscribers() {
        let store = CartStore::new(50);
        let mut rx = store.subscribe();

        store.add_item(product("TA10"), 2);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().total_item_count(), 2);

        // out-of-range step is a no-op and does not notify
        assert!(!store.update_quantity("TA10", -2));
        assert!(!rx.has_changed().unwrap());

        assert!(store.update_quantity("TA10", 1));
        assert_eq!(store.total_item_count(), 3);
        assert_eq!(store.subtotal(), Money::from_cents(3 * 8999));
    }

    #[tokio::test]
    async fn test_add_clamps_to_max() {
        let store = CartStore::new(5);
        let outcome = store.add_item(product("KLOW"), 9);
        assert!(outcome.clamped);
        assert_eq!(outcome.line_quantity, 5);

        let outcome = store.add_item(product("KLOW"), 1);
        assert_eq!(outcome.added, 0);
        assert_eq!(
            outcome.toast_message("KLOW"),
            "Maximum of 5 reached for KLOW"
        );
    }

    #[tokio::test]
    async fn test_persists_and_restores() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let store = CartStore::load(db.cart(), 50).await;
        assert_eq!(store.total_item_count(), 0);

        store.add_item(product("TA10"), 2);
        store.add_item(product("WA3"), 1);
        store.remove_item("WA3");
        store.flush().await;

        let restored = CartStore::load(db.cart(), 50).await;
        let cart = restored.snapshot();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id(), "TA10");
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_corrupt_storage_starts_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.storage().put(CART_KEY, "[{\"id\":").await.unwrap();

        let store = CartStore::load(db.cart(), 50).await;
        assert!(store.snapshot().is_empty());

        // next write replaces the corrupt blob
        store.add_item(product("CU100"), 1);
        store.flush().await;
        assert_eq!(db.cart().load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_reclamps() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let wide = CartStore::load(db.cart(), 50).await;
        wide.add_item(product("TA10"), 40);
        wide.flush().await;

        let narrow = CartStore::load(db.cart(), 10).await;
        assert_eq!(narrow.total_item_count(), 10);
    }
}
