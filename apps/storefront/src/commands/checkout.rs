//! # Checkout Commands
//!
//! Coupon entry and the checkout state machine.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apply_coupon / remove_coupon        (review page, any time)            │
//! │                                                                         │
//! │  begin_checkout ──► FormEntry                                           │
//! │        │                                                                │
//! │        └──────────► ShippingWarningShown ──proceed_anyway──► FormEntry  │
//! │                              └──shop_more──► ReturnedToCatalog          │
//! │                                                                         │
//! │  set_checkout_field × n ──► submit_checkout ──► Submitting              │
//! │                                      │                                  │
//! │                        (delay) complete_submission ──► Submitted        │
//! │                                                                         │
//! │  cancel_checkout: warning/form → Reviewing                              │
//! │  reset_checkout:  anything → Reviewing                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use biosynth_core::validation::{CheckoutForm, FieldErrors, FormField};
use biosynth_core::{CheckoutState, CouponSlot, PricingSnapshot, SubmitOutcome};

use crate::app::App;
use crate::error::{ApiError, ApiResult};
use crate::state::Handoff;

/// Everything the requisition page renders for checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub state: CheckoutState,
    pub form: CheckoutForm,
    pub errors: FieldErrors,
    pub coupon: CouponSlot,
    pub pricing: PricingSnapshot,
}

impl CheckoutResponse {
    pub fn build(app: &App) -> Self {
        let flow = app.checkout.flow();
        let cart = app.cart.snapshot();

        CheckoutResponse {
            state: flow.state(),
            form: flow.form().clone(),
            errors: flow.errors().clone(),
            coupon: flow.coupon().clone(),
            pricing: app.checkout.quote(&app.pricing, &cart, app.shipping),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub accepted: bool,
    /// Set when accepted; the hand-off arrives after the delay.
    pub attempt: Option<Uuid>,
    pub checkout: CheckoutResponse,
}

pub fn get_checkout(app: &App) -> CheckoutResponse {
    debug!("get_checkout command");
    CheckoutResponse::build(app)
}

/// Applies a coupon code.
///
/// An unknown code is not an `Err`: the response carries
/// `coupon.error = "Invalid discount code"` and any previously applied
/// coupon stays.
pub fn apply_coupon(app: &mut App, code: &str) -> CheckoutResponse {
    debug!(code = %code, "apply_coupon command");
    app.checkout.apply_coupon(&app.pricing, code);
    CheckoutResponse::build(app)
}

pub fn remove_coupon(app: &mut App) -> CheckoutResponse {
    debug!("remove_coupon command");
    app.checkout.remove_coupon();
    CheckoutResponse::build(app)
}

/// Starts checkout from the review page.
///
/// ## Errors
/// - `EMPTY_REQUISITION` with nothing in the cart
/// - `INVALID_STATE` outside the review page
pub fn begin_checkout(app: &mut App) -> ApiResult<CheckoutResponse> {
    debug!("begin_checkout command");

    let cart = app.cart.snapshot();
    let warning = app.config.shipping_warning_threshold();
    app.checkout
        .begin_checkout(&app.pricing, &cart, app.shipping, warning)?;

    Ok(CheckoutResponse::build(app))
}

pub fn proceed_anyway(app: &mut App) -> ApiResult<CheckoutResponse> {
    debug!("proceed_anyway command");
    let cart = app.cart.snapshot();
    app.checkout.proceed_anyway(&cart)?;
    Ok(CheckoutResponse::build(app))
}

/// "Shop more" from the shipping warning; the shopper returns to the
/// catalog and the checkout page starts over.
pub fn shop_more(app: &mut App) -> ApiResult<CheckoutResponse> {
    debug!("shop_more command");
    app.checkout.shop_more()?;
    let response = CheckoutResponse::build(app);
    app.checkout.reset();
    Ok(response)
}

/// Sets one form field by key (`firstName`, `first_name`, `country`, ...).
pub fn set_checkout_field(app: &mut App, field: &str, value: &str) -> ApiResult<CheckoutResponse> {
    debug!(field = %field, "set_checkout_field command");

    let field = FormField::parse(field)
        .ok_or_else(|| ApiError::validation(format!("Unknown form field: {}", field)))?;
    app.checkout.set_field(field, value)?;

    Ok(CheckoutResponse::build(app))
}

/// Validates the form and schedules the hand-off.
///
/// Field errors come back with `accepted = false`; they are not `Err`.
pub fn submit_checkout(app: &mut App) -> ApiResult<SubmitResponse> {
    debug!("submit_checkout command");

    let cart = app.cart.snapshot();
    let outcome = app.checkout.submit(
        &app.pricing,
        &cart,
        app.shipping,
        &app.config.contact_phone,
    )?;

    let attempt = match outcome {
        SubmitOutcome::Accepted(ticket) => Some(ticket.attempt),
        SubmitOutcome::Rejected(_) => None,
    };

    Ok(SubmitResponse {
        accepted: attempt.is_some(),
        attempt,
        checkout: CheckoutResponse::build(app),
    })
}

/// Delivers a due submission. `None` for a stale attempt.
pub fn complete_submission(app: &mut App, attempt: Uuid) -> Option<Handoff> {
    debug!(attempt = %attempt, "complete_submission command");
    app.checkout.complete(attempt)
}

/// Closes the warning or the form without submitting.
pub fn cancel_checkout(app: &mut App) -> ApiResult<CheckoutResponse> {
    debug!("cancel_checkout command");
    app.checkout.cancel()?;
    Ok(CheckoutResponse::build(app))
}

/// Leaves checkout entirely, from any state.
pub fn reset_checkout(app: &mut App) -> CheckoutResponse {
    debug!("reset_checkout command");
    app.checkout.reset();
    CheckoutResponse::build(app)
}
