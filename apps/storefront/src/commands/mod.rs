//! # Commands Module
//!
//! Every operation the front-end can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── catalog.rs    ◄─── Browse, search, product detail, sections
//! ├── cart.rs       ◄─── Requisition manipulation + pricing
//! ├── checkout.rs   ◄─── Coupon, checkout state machine, hand-off
//! ├── shipping.rs   ◄─── Country list, region hierarchy, estimates
//! ├── favorites.rs  ◄─── Saved products
//! ├── documents.rs  ◄─── Gated MSDS / CoA downloads
//! └── config.rs     ◄─── Public configuration
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  shell: "add KLOW 2"                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::cart::add_to_cart(&mut app, "KLOW", Some(2))                 │
//! │         │                                                               │
//! │         │  Result<AddToCartResponse, ApiError>                          │
//! │         ▼                                                               │
//! │  shell renders the response (or "error [CODE]: message")                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands take the [`App`](crate::app::App) by reference: `&App` for
//! reads, `&mut App` when a toast or the checkout session changes.
//! Responses are `Serialize` so another front-end can reuse them as-is.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod documents;
pub mod favorites;
pub mod shipping;
