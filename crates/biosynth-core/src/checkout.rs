//! # Checkout Flow
//!
//! The requisition page's checkout state machine.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Reviewing ──begin_checkout──┬──(close to free shipping)──┐            │
//! │       ▲                       │                            ▼            │
//! │       │                       │               ShippingWarningShown      │
//! │       │ cancel                │                  │             │        │
//! │       │                       │   proceed_anyway │             │shop_more
//! │       │                       ▼                  ▼             ▼        │
//! │       ├─────────────────── FormEntry ◄──────────┘     ReturnedToCatalog │
//! │       │                    │      ▲                                     │
//! │       │              submit│      │ field errors / unknown country      │
//! │       │                    ▼      │                                     │
//! │       │                  Validating                                     │
//! │       │                    │                                            │
//! │       │                    ▼                                            │
//! │       │          Submitting { attempt }                                 │
//! │       │                    │ complete_submission(attempt)               │
//! │       │                    ▼                                            │
//! │       └── reset ──── Submitted (hand-off done)                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Validating` is transient: `submit` enters and leaves it in one call.
//! The deferred completion carries the attempt id it was issued with, and is
//! ignored unless the flow is still submitting that same attempt.
//!
//! An empty cart never gets past `Reviewing`. `proceed_anyway` and `submit`
//! recheck it, and `cart_emptied` drops an open checkout back to the review
//! page when the last line is removed.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{CouponSlot, PricingEngine, PricingSnapshot};
use crate::shipping::{CountryShippingRecord, ShippingTable};
use crate::validation::{validate_form, CheckoutForm, FieldErrors, FormField};

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "state", rename_all = "snake_case")]
#[ts(export)]
pub enum CheckoutState {
    Reviewing,
    ShippingWarningShown {
        remaining: Money,
    },
    FormEntry,
    Validating,
    Submitting {
        #[ts(type = "string")]
        attempt: Uuid,
    },
    Submitted,
    ReturnedToCatalog,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckoutState::Reviewing => "reviewing",
            CheckoutState::ShippingWarningShown { .. } => "showing the shipping warning",
            CheckoutState::FormEntry => "collecting details",
            CheckoutState::Validating => "validating",
            CheckoutState::Submitting { .. } => "submitting",
            CheckoutState::Submitted => "submitted",
            CheckoutState::ReturnedToCatalog => "closed",
        };
        f.write_str(label)
    }
}

/// Everything the deferred hand-off needs, captured at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub attempt: Uuid,
    pub form: CheckoutForm,
    pub destination: CountryShippingRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Back in `FormEntry`; errors are also kept on the flow.
    Rejected(FieldErrors),
    /// Now `Submitting` this attempt.
    Accepted(SubmissionTicket),
}

// =============================================================================
// Flow
// =============================================================================

/// Ephemeral checkout state for one requisition page.
///
/// Owns the form, its field errors and the coupon slot. The destination is
/// whatever `form.country` resolves to in the shipping table.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    state: CheckoutState,
    form: CheckoutForm,
    errors: FieldErrors,
    coupon: CouponSlot,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    pub fn new() -> Self {
        CheckoutFlow {
            state: CheckoutState::Reviewing,
            form: CheckoutForm::default(),
            errors: FieldErrors::new(),
            coupon: CouponSlot::default(),
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn coupon(&self) -> &CouponSlot {
        &self.coupon
    }

    fn discard_form(&mut self) {
        self.form = CheckoutForm::default();
        self.errors.clear();
    }

    /// Back to `Reviewing` with `CartEmpty` when there is nothing to order.
    fn require_items(&mut self, cart: &Cart) -> CoreResult<()> {
        if cart.total_item_count() > 0 {
            return Ok(());
        }
        self.discard_form();
        self.state = CheckoutState::Reviewing;
        Err(CoreError::CartEmpty)
    }

    fn require(&self, allowed: bool, action: &str) -> CoreResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(CoreError::transition(self.state.to_string(), action))
        }
    }

    // ===== Pricing inputs =====

    /// The selected destination, if the form's country is a known one.
    pub fn destination<'t>(&self, table: &'t ShippingTable) -> Option<&'t CountryShippingRecord> {
        table.lookup(&self.form.country)
    }

    /// Prices `cart` with this flow's coupon and destination.
    pub fn quote(&self, engine: &PricingEngine, cart: &Cart, table: &ShippingTable) -> PricingSnapshot {
        engine.quote(cart, self.coupon.applied(), self.destination(table))
    }

    pub fn apply_coupon(&mut self, engine: &PricingEngine, code: &str) -> bool {
        self.coupon.apply_code(engine, code)
    }

    pub fn remove_coupon(&mut self) {
        self.coupon.remove();
    }

    // ===== Transitions =====

    /// Starts checkout from the review page.
    ///
    /// Shows the shipping warning when `0 < remaining ≤ warning_threshold`,
    /// otherwise opens the form directly.
    pub fn begin_checkout(
        &mut self,
        snapshot: &PricingSnapshot,
        warning_threshold: Money,
    ) -> CoreResult<CheckoutState> {
        self.require(self.state == CheckoutState::Reviewing, "begin checkout")?;

        if snapshot.total_quantity == 0 {
            return Err(CoreError::CartEmpty);
        }

        self.discard_form();
        self.state = if snapshot.is_close_to_free_shipping(warning_threshold) {
            CheckoutState::ShippingWarningShown {
                remaining: snapshot.remaining_for_free_shipping(),
            }
        } else {
            CheckoutState::FormEntry
        };

        Ok(self.state)
    }

    /// Warning dismissed with "proceed anyway".
    pub fn proceed_anyway(&mut self, cart: &Cart) -> CoreResult<()> {
        self.require(
            matches!(self.state, CheckoutState::ShippingWarningShown { .. }),
            "proceed to the form",
        )?;
        self.require_items(cart)?;
        self.state = CheckoutState::FormEntry;
        Ok(())
    }

    /// Warning dismissed with "shop more". Terminal for this flow instance.
    pub fn shop_more(&mut self) -> CoreResult<()> {
        self.require(
            matches!(self.state, CheckoutState::ShippingWarningShown { .. }),
            "return to the catalog",
        )?;
        self.discard_form();
        self.state = CheckoutState::ReturnedToCatalog;
        Ok(())
    }

    /// Stores a sanitized field value and clears that field's error.
    pub fn set_field(&mut self, field: FormField, value: &str) -> CoreResult<()> {
        self.require(self.state == CheckoutState::FormEntry, "edit the form")?;

        self.form.set(field, value);
        self.errors.remove(&field);
        Ok(())
    }

    /// Validates and, if everything checks out, starts a submission attempt.
    pub fn submit(&mut self, cart: &Cart, table: &ShippingTable) -> CoreResult<SubmitOutcome> {
        self.require(self.state == CheckoutState::FormEntry, "submit")?;
        self.require_items(cart)?;
        self.state = CheckoutState::Validating;

        let mut errors = validate_form(&self.form);
        let destination = self.destination(table).cloned();

        if errors.is_empty() && destination.is_none() {
            errors.insert(FormField::Country, "Please select a country".to_string());
        }

        match destination {
            Some(destination) if errors.is_empty() => {
                let attempt = Uuid::new_v4();
                self.errors.clear();
                self.state = CheckoutState::Submitting { attempt };
                Ok(SubmitOutcome::Accepted(SubmissionTicket {
                    attempt,
                    form: self.form.clone(),
                    destination,
                }))
            }
            _ => {
                self.errors = errors.clone();
                self.state = CheckoutState::FormEntry;
                Ok(SubmitOutcome::Rejected(errors))
            }
        }
    }

    /// Finishes a deferred submission.
    ///
    /// Returns `false` for a stale attempt (the flow moved on since).
    pub fn complete_submission(&mut self, attempt: Uuid) -> bool {
        if self.state != (CheckoutState::Submitting { attempt }) {
            return false;
        }
        self.discard_form();
        self.state = CheckoutState::Submitted;
        true
    }

    /// Closes the warning or the form, discarding the form.
    ///
    /// The chosen country is kept so the review page still prices shipping
    /// to it.
    pub fn cancel(&mut self) -> CoreResult<()> {
        self.require(
            matches!(
                self.state,
                CheckoutState::ShippingWarningShown { .. } | CheckoutState::FormEntry
            ),
            "cancel",
        )?;
        let country = std::mem::take(&mut self.form.country);
        self.discard_form();
        self.form.country = country;
        self.state = CheckoutState::Reviewing;
        Ok(())
    }

    /// The cart just became empty. Any open checkout goes back to
    /// `Reviewing`; returns whether it did.
    pub fn cart_emptied(&mut self) -> bool {
        match self.state {
            CheckoutState::ShippingWarningShown { .. }
            | CheckoutState::FormEntry
            | CheckoutState::Validating
            | CheckoutState::Submitting { .. } => {
                self.discard_form();
                self.state = CheckoutState::Reviewing;
                true
            }
            CheckoutState::Reviewing
            | CheckoutState::Submitted
            | CheckoutState::ReturnedToCatalog => false,
        }
    }

    /// Leaves the page from any state. An in-flight attempt becomes stale.
    ///
    /// The applied coupon survives; it belongs to the review page.
    pub fn reset(&mut self) {
        self.discard_form();
        self.state = CheckoutState::Reviewing;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
