//! # Composition Root
//!
//! Builds every store once and hands them out by reference.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Pricing rules from config ──────── invalid rules abort startup      │
//! │                                                                         │
//! │  2. Open client storage ─────────────── failure → in-memory only        │
//! │     • --db-path, then config, then BIOSYNTH_DB_PATH / data dir          │
//! │                                                                         │
//! │  3. Restore cart + favorites ────────── missing/corrupt → empty         │
//! │                                                                         │
//! │  4. Notifier + checkout session                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use tracing::{info, warn};

use biosynth_core::{Catalog, DocumentGate, PricingEngine, ShippingTable};
use biosynth_db::{Database, DbConfig};

use crate::state::{
    CartStore, CheckoutSession, ConfigError, FavoritesStore, Notifier, StorefrontConfig,
};

/// The running storefront.
#[derive(Debug)]
pub struct App {
    pub config: StorefrontConfig,
    pub catalog: &'static Catalog,
    pub shipping: &'static ShippingTable,
    pub pricing: PricingEngine,
    pub documents: DocumentGate,
    pub cart: CartStore,
    pub favorites: FavoritesStore,
    pub toasts: Notifier,
    pub checkout: CheckoutSession,
    db: Option<Database>,
}

impl App {
    /// Starts with durable storage at `db_path` (or the configured /
    /// platform default).
    ///
    /// Storage problems never stop startup; the app then runs in memory.
    pub async fn start(config: StorefrontConfig, db_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let pricing = config.pricing_engine()?;

        let path = db_path
            .or_else(|| config.database_path.clone())
            .or_else(crate::default_database_path);

        let db = match path {
            Some(path) => {
                info!(?path, "Opening client storage");
                match Database::new(DbConfig::new(path)).await {
                    Ok(db) => Some(db),
                    Err(e) => {
                        warn!(error = %e, "Client storage unavailable; running in memory");
                        None
                    }
                }
            }
            None => {
                warn!("No data directory; running in memory");
                None
            }
        };

        let (cart, favorites) = match &db {
            Some(db) => (
                CartStore::load(db.cart(), config.max_quantity_per_item).await,
                FavoritesStore::load(db.favorites()).await,
            ),
            None => (
                CartStore::new(config.max_quantity_per_item),
                FavoritesStore::new(),
            ),
        };

        Ok(Self::assemble(config, pricing, cart, favorites, db))
    }

    /// An app with no durable storage.
    pub fn in_memory(config: StorefrontConfig) -> Result<Self, ConfigError> {
        let pricing = config.pricing_engine()?;
        let cart = CartStore::new(config.max_quantity_per_item);
        Ok(Self::assemble(config, pricing, cart, FavoritesStore::new(), None))
    }

    fn assemble(
        config: StorefrontConfig,
        pricing: PricingEngine,
        cart: CartStore,
        favorites: FavoritesStore,
        db: Option<Database>,
    ) -> Self {
        let toasts = Notifier::new(config.toast_duration(), config.toast_exit());
        let checkout = CheckoutSession::new(config.submission_delay());
        let documents = config.document_gate();

        info!(
            products = Catalog::bundled().len(),
            countries = ShippingTable::bundled().len(),
            persistent = db.is_some(),
            "Storefront ready"
        );

        App {
            config,
            catalog: Catalog::bundled(),
            shipping: ShippingTable::bundled(),
            pricing,
            documents,
            cart,
            favorites,
            toasts,
            checkout,
            db,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.db.is_some()
    }

    /// Flushes pending writes and closes storage.
    pub async fn shutdown(&self) {
        self.cart.flush().await;
        self.favorites.flush().await;
        if let Some(db) = &self.db {
            db.close().await;
        }
        info!("Storefront stopped");
    }
}
