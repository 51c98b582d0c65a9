//! # Cart (Requisition)
//!
//! Ordered line items keyed by product id, with per-item quantity bounds.
//!
//! ## Quantity Bounds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every line: 1 ≤ quantity ≤ max_per_item                                │
//! │                                                                         │
//! │  add_item(p, n)          existing line? → quantity + n, clamped to max  │
//! │                          new line?      → n, clamped to max             │
//! │                          n == 0         → no-op                         │
//! │                                                                         │
//! │  update_quantity(id, δ)  result outside [1, max] → no-op                │
//! │                                                                         │
//! │  remove_item(id)         line deleted regardless of quantity            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart holds no pricing; see [`crate::pricing`] for the derived totals.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Line Item
// =============================================================================

/// One product in the requisition with its quantity.
///
/// Serialized flat (product fields plus `quantity`), which is also the
/// persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub product: Product,

    pub quantity: u32,
}

impl CartLineItem {
    pub fn id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }
}

/// What `add_item` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddOutcome {
    /// Units actually added (may be less than requested).
    pub added: u32,

    /// Line quantity after the add.
    pub line_quantity: u32,

    /// The request hit the per-item maximum.
    pub clamped: bool,
}

impl AddOutcome {
    /// Notification text for this add.
    pub fn toast_message(&self, product_name: &str) -> String {
        if self.added == 0 && self.clamped {
            format!(
                "Maximum of {} reached for {}",
                self.line_quantity, product_name
            )
        } else {
            format!("Added {}x {} to Requisition", self.added, product_name)
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The requisition.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartLineItem>,
    max_per_item: u32,
}

impl Cart {
    /// Creates an empty cart. A `max_per_item` of 0 is treated as 1.
    pub fn new(max_per_item: u32) -> Self {
        Cart {
            items: Vec::new(),
            max_per_item: max_per_item.max(1),
        }
    }

    /// Rebuilds a cart from stored line items, re-applying the bounds.
    ///
    /// Duplicate ids are merged into the first occurrence, quantities are
    /// clamped to the maximum and zero-quantity lines are dropped.
    pub fn from_items(items: Vec<CartLineItem>, max_per_item: u32) -> Self {
        let mut cart = Cart::new(max_per_item);

        for item in items {
            if let Some(existing) = cart.line_mut(item.id()) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                cart.items.push(item);
            }
        }

        let max = cart.max_per_item;
        cart.items.retain(|item| item.quantity > 0);
        for item in &mut cart.items {
            item.quantity = item.quantity.min(max);
        }

        cart
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|item| item.id() == product_id)
    }

    /// Adds `quantity` units of `product`, clamped to the per-item maximum.
    ///
    /// ## Example
    /// ```rust
    /// use biosynth_core::{Cart, Catalog};
    ///
    /// let product = Catalog::bundled().find_by_id("WA3").unwrap();
    /// let mut cart = Cart::new(50);
    ///
    /// cart.add_item(product, 30);
    /// let outcome = cart.add_item(product, 30);
    ///
    /// assert_eq!(outcome.added, 20);
    /// assert!(outcome.clamped);
    /// assert_eq!(cart.total_item_count(), 50);
    /// ```
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> AddOutcome {
        let max = self.max_per_item;

        if quantity == 0 {
            let line_quantity = self
                .items
                .iter()
                .find(|item| item.id() == product.id)
                .map_or(0, |item| item.quantity);
            return AddOutcome {
                added: 0,
                line_quantity,
                clamped: false,
            };
        }

        let current = self.line_mut(&product.id).map_or(0, |item| item.quantity);
        let wanted = current.saturating_add(quantity);
        let line_quantity = wanted.min(max);

        match self.line_mut(&product.id) {
            Some(line) => line.quantity = line_quantity,
            None => self.items.push(CartLineItem {
                product: product.clone(),
                quantity: line_quantity,
            }),
        }

        AddOutcome {
            added: line_quantity - current,
            line_quantity,
            clamped: wanted > max,
        }
    }

    /// Adjusts a line's quantity by `delta`.
    ///
    /// Returns `false` (and changes nothing) for an unknown id or when the
    /// result would leave `[1, max_per_item]`.
    pub fn update_quantity(&mut self, product_id: &str, delta: i64) -> bool {
        let max = i64::from(self.max_per_item);

        let Some(line) = self.line_mut(product_id) else {
            return false;
        };

        let next = i64::from(line.quantity).saturating_add(delta);
        if next < 1 || next > max || delta == 0 {
            return false;
        }

        line.quantity = next as u32;
        true
    }

    /// Deletes a line. Returns whether it existed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all line quantities.
    pub fn total_item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Σ price × quantity.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn get(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id() == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_per_item(&self) -> u32 {
        self.max_per_item
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn product(id: &str) -> Product {
        Catalog::bundled().find_by_id(id).unwrap().clone()
    }

    #[test]
    fn test_add_new_and_existing() {
        let mut cart = Cart::new(50);
        let water = product("WA3");

        let first = cart.add_item(&water, 2);
        assert_eq!(first.added, 2);
        assert_eq!(first.line_quantity, 2);

        let second = cart.add_item(&water, 3);
        assert_eq!(second.line_quantity, 5);
        assert!(!second.clamped);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_item_count(), 5);
    }

    #[test]
    fn test_add_sums_quantities_below_max() {
        for (q1, q2) in [(0, 0), (1, 1), (7, 13), (25, 25), (0, 49)] {
            let mut cart = Cart::new(50);
            let water = product("WA3");
            cart.add_item(&water, q1);
            cart.add_item(&water, q2);
            assert_eq!(cart.get("WA3").map_or(0, |l| l.quantity), q1 + q2);
        }
    }

    #[test]
    fn test_add_clamps_to_max() {
        let mut cart = Cart::new(50);
        let water = product("WA3");

        let outcome = cart.add_item(&water, 80);
        assert_eq!(outcome.added, 50);
        assert!(outcome.clamped);

        let outcome = cart.add_item(&water, 1);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.line_quantity, 50);
        assert!(outcome.clamped);
        assert_eq!(
            outcome.toast_message(&water.name),
            "Maximum of 50 reached for Bacteriostatic Water 3ml"
        );
    }

    #[test]
    fn test_toast_message() {
        let mut cart = Cart::new(50);
        let outcome = cart.add_item(&product("IP5"), 3);
        assert_eq!(
            outcome.toast_message("Ipamorelin 5mg"),
            "Added 3x Ipamorelin 5mg to Requisition"
        );
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new(50);
        let outcome = cart.add_item(&product("WA3"), 0);
        assert_eq!(outcome.added, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_bounds() {
        let mut cart = Cart::new(3);
        cart.add_item(&product("IP5"), 1);

        assert!(!cart.update_quantity("IP5", -1));
        assert_eq!(cart.get("IP5").unwrap().quantity, 1);

        assert!(cart.update_quantity("IP5", 1));
        assert!(cart.update_quantity("IP5", 1));
        assert!(!cart.update_quantity("IP5", 1));
        assert_eq!(cart.get("IP5").unwrap().quantity, 3);

        assert!(!cart.update_quantity("NOPE", 1));
    }

    #[test]
    fn test_update_quantity_never_leaves_range() {
        let mut cart = Cart::new(5);
        cart.add_item(&product("IP5"), 2);

        for delta in [-10, -2, -1, 1, 3, 10, i64::MIN, i64::MAX] {
            cart.update_quantity("IP5", delta);
            let q = cart.get("IP5").unwrap().quantity;
            assert!((1..=5).contains(&q));
        }
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new(50);
        cart.add_item(&product("IP5"), 50);
        cart.add_item(&product("WA3"), 1);

        assert!(cart.remove_item("IP5"));
        assert!(!cart.remove_item("IP5"));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::new(50);
        cart.add_item(&product("WA3"), 2); // 2 × $12.00
        cart.add_item(&product("IP5"), 1); // 1 × $39.99
        assert_eq!(cart.subtotal(), Money::from_cents(6399));
    }

    #[test]
    fn test_from_items_reapplies_bounds() {
        let water = product("WA3");
        let peptide = product("IP5");

        let items = vec![
            CartLineItem { product: water.clone(), quantity: 30 },
            CartLineItem { product: peptide.clone(), quantity: 0 },
            CartLineItem { product: water, quantity: 30 },
        ];

        let cart = Cart::from_items(items, 50);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get("WA3").unwrap().quantity, 50);
        assert!(cart.get("IP5").is_none());
    }

    #[test]
    fn test_line_item_serializes_flat() {
        let line = CartLineItem {
            product: product("WA3"),
            quantity: 4,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "WA3");
        assert_eq!(json["quantity"], 4);
        assert_eq!(json["casNumber"], "7732-18-5");

        let back: CartLineItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }
}
