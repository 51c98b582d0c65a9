//! # State Module
//!
//! Stores owned by the [`App`](crate::app::App) composition root and
//! passed to commands by reference. Nothing here is global.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌────────────────┐  ┌──────────┐  ┌──────────────┐  │
//! │  │  CartStore   │  │ FavoritesStore │  │ Notifier │  │  Checkout    │  │
//! │  │              │  │                │  │          │  │  Session     │  │
//! │  │ watch<Cart>  │  │ watch<Favs>    │  │ watch<   │  │ CheckoutFlow │  │
//! │  │ Persister    │  │ Persister      │  │  Toast>  │  │ + delay task │  │
//! │  └──────┬───────┘  └───────┬────────┘  └──────────┘  └──────────────┘  │
//! │         │                  │                                            │
//! │         ▼                  ▼                                            │
//! │     biosynth-db (background writers)                                    │
//! │                                                                         │
//! │  StorefrontConfig: read-only after startup                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each store exposes a narrow surface: read a snapshot, apply a
//! mutation, subscribe to changes.

mod cart;
mod checkout;
mod config;
mod favorites;
mod persist;
mod toast;

pub use cart::CartStore;
pub use checkout::{require_country, CheckoutSession, Handoff};
pub use config::{ConfigError, StorefrontConfig, DEFAULT_CONTACT_PHONE};
pub use favorites::FavoritesStore;
pub use persist::Persister;
pub use toast::{Notifier, Toast, ToastPhase};
