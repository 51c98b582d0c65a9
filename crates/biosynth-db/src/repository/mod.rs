//! # Repository Module
//!
//! Storage repositories for the BioSynth storefront.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartStore / FavoritesStore (storefront)                                │
//! │       │                                                                 │
//! │       │  db.cart().save(&items)                                         │
//! │       ▼                                                                 │
//! │  CartRepository / FavoritesRepository   ← typed, JSON (de)serialization │
//! │       │                                                                 │
//! │       │  storage.put("biosynth_cart", json)                             │
//! │       ▼                                                                 │
//! │  ClientStorageRepository                ← raw keyed TEXT blobs          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  client_storage table                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`storage::ClientStorageRepository`] - Keyed blob get/put/remove
//! - [`cart::CartRepository`] - Requisition line items
//! - [`favorites::FavoritesRepository`] - Saved product ids

pub mod cart;
pub mod favorites;
pub mod storage;
