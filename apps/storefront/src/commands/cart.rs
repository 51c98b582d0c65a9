//! # Cart Commands
//!
//! Requisition manipulation. Every response carries fresh pricing, which is
//! recomputed from the cart, the coupon and the form's country on each
//! call and never cached.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Requisition Lifecycle                                │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Handed   │       │
//! │  │          │     │          │     │  Form    │     │   Off    │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart      submit_checkout                     │
//! │                   update_item      (checkout.rs)                       │
//! │                   remove_item                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use biosynth_core::pricing::VolumeNudge;
use biosynth_core::{AddOutcome, CartLineItem, PricingSnapshot, ValidationError};

use crate::app::App;
use crate::error::{ApiError, ApiResult};

/// Cart response including items and pricing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub total_item_count: u32,
    pub pricing: PricingSnapshot,
    /// How many more units unlock the next volume tier.
    pub volume_nudge: Option<VolumeNudge>,
    pub free_shipping_close: bool,
}

impl CartResponse {
    pub fn build(app: &App) -> Self {
        let cart = app.cart.snapshot();
        let pricing = app.checkout.quote(&app.pricing, &cart, app.shipping);
        let volume_nudge = app.pricing.next_volume_tier(pricing.total_quantity);
        let free_shipping_close = pricing.total_quantity > 0
            && pricing.is_close_to_free_shipping(app.config.shipping_warning_threshold());

        CartResponse {
            items: cart.items().to_vec(),
            total_item_count: cart.total_item_count(),
            pricing,
            volume_nudge,
            free_shipping_close,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub outcome: AddOutcome,
    /// The toast text that was shown, if any.
    pub notification: Option<String>,
    pub cart: CartResponse,
}

/// Gets the current requisition with pricing.
pub fn get_cart(app: &App) -> CartResponse {
    debug!("get_cart command");
    CartResponse::build(app)
}

/// Adds a product to the requisition.
///
/// ## Behavior
/// - Quantity defaults to 1; 0 is a no-op
/// - The line is clamped to the per-item maximum
/// - A toast describes what was added
///
/// ## Errors
/// - `NOT_FOUND` for an unknown SKU
/// - `VALIDATION_ERROR` for a negative quantity
pub fn add_to_cart(
    app: &mut App,
    product_id: &str,
    quantity: Option<i64>,
) -> ApiResult<AddToCartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    if quantity < 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    let catalog = app.catalog;
    let product = catalog.get(product_id)?;
    let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
    let outcome = app.cart.add_item(product, requested);

    let notification = (outcome.added > 0 || outcome.clamped).then(|| {
        let message = outcome.toast_message(&product.name);
        app.toasts.notify(message.clone());
        message
    });

    Ok(AddToCartResponse {
        outcome,
        notification,
        cart: CartResponse::build(app),
    })
}

/// Steps a line's quantity by `delta` (usually ±1).
///
/// Steps that would leave `[1, max]` are ignored.
pub fn update_cart_item(app: &App, product_id: &str, delta: i64) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, delta, "update_cart_item command");

    if app.cart.with_cart(|cart| cart.get(product_id).is_none()) {
        return Err(ApiError::not_found("Requisition item", product_id));
    }

    app.cart.update_quantity(product_id, delta);
    Ok(CartResponse::build(app))
}

/// Removes a line. Removing an absent product is not an error.
///
/// Removing the last line closes any open checkout.
pub fn remove_from_cart(app: &mut App, product_id: &str) -> CartResponse {
    debug!(product_id = %product_id, "remove_from_cart command");
    app.cart.remove_item(product_id);
    close_checkout_if_empty(app);
    CartResponse::build(app)
}

pub fn clear_cart(app: &mut App) -> CartResponse {
    debug!("clear_cart command");
    app.cart.clear();
    close_checkout_if_empty(app);
    CartResponse::build(app)
}

fn close_checkout_if_empty(app: &mut App) {
    if app.cart.total_item_count() == 0 {
        app.checkout.cart_emptied();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::StorefrontConfig;
    use biosynth_core::Money;

    fn app() -> App {
        App::in_memory(StorefrontConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_add_notifies() {
        let mut app = app();
        let response = add_to_cart(&mut app, "KLOW", Some(2)).unwrap();

        assert_eq!(
            response.notification.as_deref(),
            Some("Added 2x KLOW Blend 80mg to Requisition")
        );
        assert_eq!(
            app.toasts.current().unwrap().message,
            "Added 2x KLOW Blend 80mg to Requisition"
        );
        assert_eq!(response.cart.pricing.subtotal, Money::from_cents(29_998));
    }

    #[tokio::test]
    async fn test_add_zero_is_noop() {
        let mut app = app();
        let response = add_to_cart(&mut app, "KLOW", Some(0)).unwrap();
        assert_eq!(response.outcome.added, 0);
        assert!(response.notification.is_none());
        assert!(app.toasts.current().is_none());
        assert!(response.cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_add_errors() {
        let mut app = app();
        assert_eq!(
            add_to_cart(&mut app, "NOPE", None).unwrap_err().code,
            ErrorCode::NotFound
        );
        assert_eq!(
            add_to_cart(&mut app, "KLOW", Some(-1)).unwrap_err().code,
            ErrorCode::ValidationError
        );
    }

    #[tokio::test]
    async fn test_volume_tier_and_nudge() {
        let mut app = app();
        add_to_cart(&mut app, "WA3", Some(4)).unwrap();

        let cart = get_cart(&app);
        let nudge = cart.volume_nudge.unwrap();
        assert_eq!(nudge.units_needed, 1);
        assert_eq!(nudge.tier.min_qty, 5);

        let cart = update_cart_item(&app, "WA3", 1).unwrap();
        assert_eq!(cart.total_item_count, 5);
        // $60.00 at 5% off
        assert_eq!(cart.pricing.volume_discount_amount, Money::from_cents(300));
    }

    #[tokio::test]
    async fn test_stepper_bounds() {
        let mut app = app();
        add_to_cart(&mut app, "WA3", Some(1)).unwrap();

        let cart = update_cart_item(&app, "WA3", -1).unwrap();
        assert_eq!(cart.items[0].quantity, 1);

        assert_eq!(
            update_cart_item(&app, "WA10", 1).unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_free_shipping_close_flag() {
        let mut app = app();
        // 2 × $129.99 = $259.98
        add_to_cart(&mut app, "LAL1", Some(2)).unwrap();
        assert!(get_cart(&app).free_shipping_close);

        let cart = remove_from_cart(&mut app, "LAL1");
        assert!(!cart.free_shipping_close);
        assert!(clear_cart(&mut app).items.is_empty());
    }
}
