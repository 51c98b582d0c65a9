//! # Pricing Engine
//!
//! Pure computation of requisition totals from cart + coupon + destination.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal            = Σ price × quantity                            │
//! │  2. total_qty           = Σ quantity                                    │
//! │  3. volume tier         = highest min_qty ≤ total_qty (or none)         │
//! │  4. volume discount     = subtotal × tier.rate                          │
//! │  5. coupon discount     = (subtotal − volume discount) × coupon.rate    │
//! │  6. discounted subtotal = subtotal − volume − coupon                    │
//! │  7. free shipping       = discounted subtotal ≥ threshold               │
//! │  8. shipping            = 0 if free or no destination, else flat cost   │
//! │  9. total               = discounted subtotal + shipping                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Worked example (subtotal $1000, 10 units, tiers 10%@10, coupon 10%):
//! volume $100 → coupon $90 → discounted $810.
//!
//! Snapshots are recomputed from their inputs every time; nothing here is
//! cached, so a snapshot can never drift from the cart that produced it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::ValidationError;
use crate::money::Money;
use crate::shipping::CountryShippingRecord;
use crate::types::{Coupon, DiscountRate, VolumeTier};

/// Message shown when a coupon code is not in the registry.
pub const INVALID_COUPON_MESSAGE: &str = "Invalid discount code";

// =============================================================================
// Snapshot
// =============================================================================

/// Derived pricing for one render of the requisition. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingSnapshot {
    pub subtotal: Money,
    pub total_quantity: u32,
    pub volume_tier: Option<VolumeTier>,
    pub volume_discount_amount: Money,
    pub coupon: Option<Coupon>,
    pub coupon_discount_amount: Money,
    pub discounted_subtotal: Money,
    pub free_shipping_threshold: Money,
    pub is_free_shipping: bool,
    /// Destination the shipping line was priced for, if any.
    pub destination: Option<CountryShippingRecord>,
    pub shipping_cost: Money,
    pub total: Money,
}

impl PricingSnapshot {
    /// Amount still needed to reach free shipping (zero once reached).
    pub fn remaining_for_free_shipping(&self) -> Money {
        self.free_shipping_threshold
            .saturating_sub(self.discounted_subtotal)
    }

    /// `0 < remaining ≤ warning_threshold`.
    pub fn is_close_to_free_shipping(&self, warning_threshold: Money) -> bool {
        let remaining = self.remaining_for_free_shipping();
        remaining.is_positive() && remaining <= warning_threshold
    }

    /// Label for the shipping line: "Waived" when free, else the formatted cost.
    pub fn shipping_label(&self) -> String {
        if self.is_free_shipping {
            "Waived".to_string()
        } else {
            self.shipping_cost.to_string()
        }
    }

    pub fn has_discount(&self) -> bool {
        self.volume_discount_amount.is_positive() || self.coupon_discount_amount.is_positive()
    }
}

/// "Add N more units to unlock {tier}".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VolumeNudge {
    pub units_needed: u32,
    pub tier: VolumeTier,
}

// =============================================================================
// Engine
// =============================================================================

/// Discount rules and the free-shipping threshold.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    /// Sorted by `min_qty` descending, so the first match is the best.
    volume_tiers: Vec<VolumeTier>,
    coupons: HashMap<String, Coupon>,
    free_shipping_threshold: Money,
}

impl PricingEngine {
    /// Builds an engine, sorting tiers and rejecting duplicate coupon codes.
    pub fn new(
        mut volume_tiers: Vec<VolumeTier>,
        coupons: Vec<Coupon>,
        free_shipping_threshold: Money,
    ) -> Result<Self, ValidationError> {
        if free_shipping_threshold.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "free_shipping_threshold".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }

        // stable: equal min_qty keeps configured order, first one wins
        volume_tiers.sort_by(|a, b| b.min_qty.cmp(&a.min_qty));

        let mut registry = HashMap::with_capacity(coupons.len());
        for coupon in coupons {
            let code = coupon.code.trim().to_uppercase();
            if code.is_empty() {
                return Err(ValidationError::Required {
                    field: "coupon code".to_string(),
                });
            }
            if registry.contains_key(&code) {
                return Err(ValidationError::Duplicate {
                    field: "coupon code".to_string(),
                    value: code,
                });
            }
            registry.insert(code, coupon);
        }

        Ok(PricingEngine {
            volume_tiers,
            coupons: registry,
            free_shipping_threshold,
        })
    }

    /// The storefront's stock rules: 10% at 10 units, 5% at 5 units,
    /// RESEARCH10 / WELCOME5 / BULK15, free shipping from $300.
    pub fn standard() -> Self {
        PricingEngine {
            volume_tiers: default_volume_tiers(),
            coupons: default_coupons()
                .into_iter()
                .map(|c| (c.code.clone(), c))
                .collect(),
            free_shipping_threshold: crate::DEFAULT_FREE_SHIPPING_THRESHOLD,
        }
    }

    pub fn volume_tiers(&self) -> &[VolumeTier] {
        &self.volume_tiers
    }

    pub fn free_shipping_threshold(&self) -> Money {
        self.free_shipping_threshold
    }

    /// Case-insensitive exact coupon lookup.
    pub fn find_coupon(&self, code: &str) -> Option<&Coupon> {
        self.coupons.get(&code.trim().to_uppercase())
    }

    /// Best tier for a total quantity.
    pub fn volume_tier_for(&self, total_quantity: u32) -> Option<&VolumeTier> {
        self.volume_tiers
            .iter()
            .find(|tier| total_quantity >= tier.min_qty)
    }

    /// The next tier above the current one, with the units still needed.
    pub fn next_volume_tier(&self, total_quantity: u32) -> Option<VolumeNudge> {
        self.volume_tiers
            .iter()
            .rev()
            .find(|tier| tier.min_qty > total_quantity)
            .map(|tier| VolumeNudge {
                units_needed: tier.min_qty - total_quantity,
                tier: tier.clone(),
            })
    }

    /// Prices a cart.
    ///
    /// An empty cart short-circuits to all-zero pricing with no shipping.
    pub fn quote(
        &self,
        cart: &Cart,
        coupon: Option<&Coupon>,
        destination: Option<&CountryShippingRecord>,
    ) -> PricingSnapshot {
        let subtotal = cart.subtotal();
        let total_quantity = cart.total_item_count();

        if cart.is_empty() || subtotal.is_zero() {
            return PricingSnapshot {
                subtotal: Money::zero(),
                total_quantity,
                volume_tier: None,
                volume_discount_amount: Money::zero(),
                coupon: coupon.cloned(),
                coupon_discount_amount: Money::zero(),
                discounted_subtotal: Money::zero(),
                free_shipping_threshold: self.free_shipping_threshold,
                is_free_shipping: false,
                destination: destination.cloned(),
                shipping_cost: Money::zero(),
                total: Money::zero(),
            };
        }

        let volume_tier = self.volume_tier_for(total_quantity).cloned();
        let volume_rate = volume_tier
            .as_ref()
            .map_or(DiscountRate::zero(), |tier| tier.rate);
        let volume_discount_amount = subtotal.discount_amount(volume_rate);

        let after_volume = subtotal.saturating_sub(volume_discount_amount);
        let coupon_rate = coupon.map_or(DiscountRate::zero(), |c| c.rate);
        let coupon_discount_amount = after_volume.discount_amount(coupon_rate);

        let discounted_subtotal = after_volume.saturating_sub(coupon_discount_amount);
        let is_free_shipping = discounted_subtotal >= self.free_shipping_threshold;

        let shipping_cost = match destination {
            Some(record) if !is_free_shipping => record.cost,
            _ => Money::zero(),
        };

        PricingSnapshot {
            subtotal,
            total_quantity,
            volume_tier,
            volume_discount_amount,
            coupon: coupon.cloned(),
            coupon_discount_amount,
            discounted_subtotal,
            free_shipping_threshold: self.free_shipping_threshold,
            is_free_shipping,
            destination: destination.cloned(),
            shipping_cost,
            total: discounted_subtotal + shipping_cost,
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// 10% at 10+ units, 5% at 5+ units.
pub fn default_volume_tiers() -> Vec<VolumeTier> {
    vec![
        VolumeTier::new(10, DiscountRate::from_bps(1000), "10% off"),
        VolumeTier::new(5, DiscountRate::from_bps(500), "5% off"),
    ]
}

pub fn default_coupons() -> Vec<Coupon> {
    vec![
        Coupon::new("RESEARCH10", DiscountRate::from_bps(1000), "10% Research Discount"),
        Coupon::new("WELCOME5", DiscountRate::from_bps(500), "5% Welcome Discount"),
        Coupon::new("BULK15", DiscountRate::from_bps(1500), "15% Bulk Order Discount"),
    ]
}

// =============================================================================
// Coupon Slot
// =============================================================================

/// The single active coupon plus the last lookup error.
///
/// A failed lookup sets `error` and leaves any applied coupon in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponSlot {
    pub applied: Option<Coupon>,
    pub error: Option<String>,
}

impl CouponSlot {
    /// Looks up `code` and, if found, replaces the applied coupon.
    ///
    /// Returns whether the code was accepted.
    pub fn apply_code(&mut self, engine: &PricingEngine, code: &str) -> bool {
        match engine.find_coupon(code) {
            Some(coupon) => {
                self.applied = Some(coupon.clone());
                self.error = None;
                true
            }
            None => {
                self.error = Some(INVALID_COUPON_MESSAGE.to_string());
                false
            }
        }
    }

    /// Clears the applied coupon and any error.
    pub fn remove(&mut self) {
        self.applied = None;
        self.error = None;
    }

    pub fn applied(&self) -> Option<&Coupon> {
        self.applied.as_ref()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
