//! # biosynth-db: Client Storage for the BioSynth Storefront
//!
//! Durable state that must survive a restart: the requisition and the
//! favorites list. Each is an independently keyed JSON blob in a single
//! SQLite table, rewritten whole after every mutation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  storefront CartStore / FavoritesStore                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   biosynth-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ storage / cart │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │  / favorites   │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  client_storage(key, value, updated_at)                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use biosynth_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/biosynth.db")).await?;
//! let items = db.cart().load_or_empty().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::{CartRepository, CART_KEY};
pub use repository::favorites::{FavoritesRepository, FAVORITES_KEY};
pub use repository::storage::ClientStorageRepository;
