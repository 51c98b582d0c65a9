//! # biosynth-core: Pure Requisition Logic
//!
//! This crate is the **heart** of the BioSynth storefront. It contains the
//! catalog, shipping table, cart, pricing engine, form validation and the
//! checkout state machine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    BioSynth Storefront Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Front-end (pages, shell)                        │   │
//! │  │    Catalog ──► Product ──► Requisition ──► Checkout form       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ biosynth-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │   cart    │  │  pricing  │  │ checkout  │  │   │
//! │  │   │ shipping  │  │ favorites │  │   money   │  │validation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 biosynth-db (Durable Storage)                   │   │
//! │  │              cart + favorites blobs in SQLite                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, discount rules, rates)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`catalog`] - Static product catalog with filter/sort/search
//! - [`shipping`] - Country shipping table and transit estimates
//! - [`validation`] - Input sanitizing and checkout form validation
//! - [`cart`] - Requisition line items and quantity bounds
//! - [`pricing`] - Volume/coupon discounts, shipping and totals
//! - [`checkout`] - Checkout flow state machine
//! - [`order`] - Outbound requisition message and hand-off link
//! - [`favorites`] - Saved product ids
//! - [`access`] - Document download gate
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: pricing is recomputed from its inputs, never cached
//! 2. **No I/O**: storage, timers and redirects live in the app layer
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Input errors are values**: field errors come back as maps, not panics
//!
//! ## Example Usage
//!
//! ```rust
//! use biosynth_core::money::Money;
//! use biosynth_core::types::DiscountRate;
//!
//! let subtotal = Money::from_cents(100_000); // $1000.00
//! let volume = subtotal.discount_amount(DiscountRate::from_bps(1000));
//! assert_eq!(volume.cents(), 10_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod favorites;
pub mod money;
pub mod order;
pub mod pricing;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{AccessError, DocumentGate, DocumentKind};
pub use cart::{AddOutcome, Cart, CartLineItem};
pub use catalog::{Catalog, CatalogQuery, SortOrder};
pub use checkout::{CheckoutFlow, CheckoutState, SubmissionTicket, SubmitOutcome};
pub use error::{CoreError, CoreResult, ValidationError};
pub use favorites::Favorites;
pub use money::Money;
pub use pricing::{CouponSlot, PricingEngine, PricingSnapshot};
pub use shipping::{CountryShippingRecord, ShippingTable};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default maximum quantity of a single product in the requisition.
pub const DEFAULT_MAX_QUANTITY_PER_ITEM: u32 = 50;

/// Default discounted subtotal at which shipping is waived ($300.00).
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(30_000);

/// Default gap to the free-shipping threshold that triggers the checkout nudge ($50.00).
pub const DEFAULT_SHIPPING_WARNING_THRESHOLD: Money = Money::from_cents(5_000);

/// Transit estimate shown for destinations missing from the shipping table.
pub const FALLBACK_SHIPPING_ESTIMATE: &str = "15–30 business days";
