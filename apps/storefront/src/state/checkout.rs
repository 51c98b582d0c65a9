//! # Checkout Session
//!
//! Wraps the core checkout state machine with the deferred hand-off.
//!
//! ## Submission Timeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit() ── form valid, country resolved                               │
//! │     │                                                                   │
//! │     ├── flow → Submitting { attempt }                                   │
//! │     ├── message + hand-off link composed and held as pending            │
//! │     └── timer task: sleep(delay) → completions.send(attempt)            │
//! │                                                                         │
//! │  shell loop: next_completion().await → complete(attempt)                │
//! │     │                                                                   │
//! │     ├── still Submitting this attempt → Some(Handoff), flow Submitted   │
//! │     └── reset/cancelled meanwhile    → None (stale, ignored)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use biosynth_core::order::{compose_message, handoff_url};
use biosynth_core::validation::{is_institutional_email, FieldErrors, FormField};
use biosynth_core::{
    Cart, CheckoutFlow, CheckoutState, CoreError, CoreResult, CountryShippingRecord, Money,
    PricingEngine, PricingSnapshot, ShippingTable, SubmitOutcome,
};

/// A finished submission: the message and where to send it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Handoff {
    pub attempt: Uuid,
    pub message: String,
    pub url: String,
}

#[derive(Debug)]
pub struct CheckoutSession {
    flow: CheckoutFlow,
    delay: Duration,
    pending: Option<Handoff>,
    timer: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Uuid>,
    completions_rx: mpsc::UnboundedReceiver<Uuid>,
}

impl CheckoutSession {
    pub fn new(delay: Duration) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        CheckoutSession {
            flow: CheckoutFlow::new(),
            delay,
            pending: None,
            timer: None,
            completions_tx,
            completions_rx,
        }
    }

    // ===== Reads =====

    pub fn flow(&self) -> &CheckoutFlow {
        &self.flow
    }

    pub fn state(&self) -> CheckoutState {
        self.flow.state()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.flow.errors()
    }

    /// Current pricing for `cart`, with the form's country as destination.
    pub fn quote(&self, engine: &PricingEngine, cart: &Cart, table: &ShippingTable) -> PricingSnapshot {
        self.flow.quote(engine, cart, table)
    }

    // ===== Coupon =====

    pub fn apply_coupon(&mut self, engine: &PricingEngine, code: &str) -> bool {
        self.flow.apply_coupon(engine, code)
    }

    pub fn remove_coupon(&mut self) {
        self.flow.remove_coupon();
    }

    // ===== Transitions =====

    pub fn begin_checkout(
        &mut self,
        engine: &PricingEngine,
        cart: &Cart,
        table: &ShippingTable,
        warning_threshold: Money,
    ) -> CoreResult<CheckoutState> {
        let snapshot = self.quote(engine, cart, table);
        self.flow.begin_checkout(&snapshot, warning_threshold)
    }

    pub fn proceed_anyway(&mut self, cart: &Cart) -> CoreResult<()> {
        self.flow.proceed_anyway(cart)
    }

    pub fn shop_more(&mut self) -> CoreResult<()> {
        self.flow.shop_more()
    }

    pub fn set_field(&mut self, field: FormField, value: &str) -> CoreResult<()> {
        self.flow.set_field(field, value)
    }

    pub fn cancel(&mut self) -> CoreResult<()> {
        self.flow.cancel()
    }

    /// Leaves checkout from any state, dropping an in-flight submission.
    pub fn reset(&mut self) {
        self.abort_timer();
        self.pending = None;
        self.flow.reset();
    }

    /// Called after the cart loses its last line.
    pub fn cart_emptied(&mut self) {
        if self.flow.cart_emptied() {
            self.abort_timer();
            self.pending = None;
            info!("Requisition emptied, checkout closed");
        }
    }

    /// Validates the form and, if accepted, schedules the hand-off.
    ///
    /// Must be called inside a tokio runtime.
    pub fn submit(
        &mut self,
        engine: &PricingEngine,
        cart: &Cart,
        table: &ShippingTable,
        contact_phone: &str,
    ) -> CoreResult<SubmitOutcome> {
        let outcome = self.flow.submit(cart, table)?;

        let SubmitOutcome::Accepted(ticket) = &outcome else {
            debug!(errors = self.flow.errors().len(), "Checkout form rejected");
            return Ok(outcome);
        };

        let pricing = engine.quote(cart, self.flow.coupon().applied(), Some(&ticket.destination));
        let message = compose_message(&ticket.form, cart, &pricing, &ticket.destination);
        let url = match handoff_url(contact_phone, &message) {
            Ok(url) => url.to_string(),
            Err(e) => {
                error!(error = %e, "Could not build hand-off link");
                self.flow.reset();
                return Err(e);
            }
        };

        let attempt = ticket.attempt;
        info!(
            attempt = %attempt,
            country = %ticket.destination.name,
            total = %pricing.total,
            institutional = is_institutional_email(&ticket.form.email),
            "Requisition submitted"
        );

        self.pending = Some(Handoff {
            attempt,
            message,
            url,
        });
        self.schedule_completion(attempt);

        Ok(outcome)
    }

    /// Next attempt whose delay elapsed. Pending forever if none is due.
    pub async fn next_completion(&mut self) -> Option<Uuid> {
        self.completions_rx.recv().await
    }

    /// Finishes `attempt` if it is still the one being submitted.
    pub fn complete(&mut self, attempt: Uuid) -> Option<Handoff> {
        if !self.flow.complete_submission(attempt) {
            debug!(attempt = %attempt, "Ignoring stale submission completion");
            return None;
        }

        self.timer = None;
        let handoff = self.pending.take().filter(|h| h.attempt == attempt);
        if handoff.is_some() {
            info!(attempt = %attempt, "Requisition handed off");
        }
        handoff
    }

    /// Code of the applied coupon, if any.
    pub fn applied_coupon_code(&self) -> Option<&str> {
        self.flow.coupon().applied().map(|c| c.code.as_str())
    }

    fn schedule_completion(&mut self, attempt: Uuid) {
        self.abort_timer();

        let tx = self.completions_tx.clone();
        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(attempt);
        }));
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        self.abort_timer();
    }
}

/// Maps a shipping-table miss to a typed error.
pub fn require_country<'t>(
    table: &'t ShippingTable,
    name: &str,
) -> CoreResult<&'t CountryShippingRecord> {
    table
        .lookup(name)
        .ok_or_else(|| CoreError::UnknownCountry(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosynth_core::Catalog;

    const PHONE: &str = "5522998004156";

    fn cart_with(id: &str, qty: u32) -> Cart {
        let mut cart = Cart::new(50);
        cart.add_item(Catalog::bundled().get(id).unwrap(), qty);
        cart
    }

    fn fill_form(session: &mut CheckoutSession, country: &str) {
        for (field, value) in [
            (FormField::FirstName, "Ada"),
            (FormField::LastName, "Lovelace"),
            (FormField::Email, "ada@lab.org"),
            (FormField::Street, "12 Analytical Row"),
            (FormField::Zip, "10115"),
            (FormField::Country, country),
        ] {
            session.set_field(field, value).unwrap();
        }
    }

    fn session_in_form(cart: &Cart) -> CheckoutSession {
        let engine = PricingEngine::standard();
        let table = ShippingTable::bundled();
        let mut session = CheckoutSession::new(Duration::from_millis(1500));
        let state = session
            .begin_checkout(&engine, cart, table, Money::from_dollars(50))
            .unwrap();
        if state != CheckoutState::FormEntry {
            session.proceed_anyway(cart).unwrap();
        }
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_handoff_after_delay() {
        let engine = PricingEngine::standard();
        let table = ShippingTable::bundled();
        let cart = cart_with("KLOW", 1);

        let mut session = session_in_form(&cart);
        fill_form(&mut session, "Germany");

        let outcome = session.submit(&engine, &cart, table, PHONE).unwrap();
        let SubmitOutcome::Accepted(ticket) = outcome else {
            panic!("expected acceptance");
        };
        assert!(matches!(session.state(), CheckoutState::Submitting { .. }));

        let attempt = session.next_completion().await.unwrap();
        assert_eq!(attempt, ticket.attempt);

        let handoff = session.complete(attempt).unwrap();
        assert_eq!(session.state(), CheckoutState::Submitted);
        assert!(handoff.url.starts_with("https://wa.me/5522998004156?text="));
        assert!(handoff.message.contains("Country: Germany"));
        assert!(handoff.message.contains("Shipping (Europe): $55.00"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_makes_completion_stale() {
        let engine = PricingEngine::standard();
        let table = ShippingTable::bundled();
        let cart = cart_with("KLOW", 1);

        let mut session = session_in_form(&cart);
        fill_form(&mut session, "Japan");
        let SubmitOutcome::Accepted(ticket) =
            session.submit(&engine, &cart, table, PHONE).unwrap()
        else {
            panic!("expected acceptance");
        };

        session.reset();
        assert_eq!(session.state(), CheckoutState::Reviewing);

        // a completion that was already due is ignored
        assert!(session.complete(ticket.attempt).is_none());
        assert_eq!(session.state(), CheckoutState::Reviewing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_country_is_rejected() {
        let engine = PricingEngine::standard();
        let table = ShippingTable::bundled();
        let cart = cart_with("KLOW", 1);

        let mut session = session_in_form(&cart);
        fill_form(&mut session, "Atlantis");

        match session.submit(&engine, &cart, table, PHONE).unwrap() {
            SubmitOutcome::Rejected(errors) => {
                assert_eq!(errors[&FormField::Country], "Please select a country");
            }
            SubmitOutcome::Accepted(_) => panic!("unknown country accepted"),
        }
        assert_eq!(session.state(), CheckoutState::FormEntry);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_to_free_shipping_warns() {
        let engine = PricingEngine::standard();
        let table = ShippingTable::bundled();
        // 2 × $129.99 = $259.98, $40.02 short of $300
        let cart = cart_with("LAL1", 2);

        let mut session = CheckoutSession::new(Duration::from_millis(1500));
        let state = session
            .begin_checkout(&engine, &cart, table, Money::from_dollars(50))
            .unwrap();
        assert_eq!(
            state,
            CheckoutState::ShippingWarningShown {
                remaining: Money::from_cents(4002)
            }
        );

        session.cancel().unwrap();
        assert_eq!(session.state(), CheckoutState::Reviewing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptied_cart_blocks_submission() {
        let engine = PricingEngine::standard();
        let table = ShippingTable::bundled();
        let cart = cart_with("KLOW", 1);

        let mut session = session_in_form(&cart);
        fill_form(&mut session, "Germany");

        let empty = Cart::new(50);
        assert!(matches!(
            session.submit(&engine, &empty, table, PHONE),
            Err(CoreError::CartEmpty)
        ));
        assert_eq!(session.state(), CheckoutState::Reviewing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cart_emptied_drops_pending_handoff() {
        let engine = PricingEngine::standard();
        let table = ShippingTable::bundled();
        let cart = cart_with("KLOW", 1);

        let mut session = session_in_form(&cart);
        fill_form(&mut session, "Germany");
        let SubmitOutcome::Accepted(ticket) =
            session.submit(&engine, &cart, table, PHONE).unwrap()
        else {
            panic!("expected acceptance");
        };

        session.cart_emptied();
        assert_eq!(session.state(), CheckoutState::Reviewing);
        assert!(session.complete(ticket.attempt).is_none());
    }

    #[test]
    fn test_require_country() {
        let table = ShippingTable::bundled();
        assert_eq!(require_country(table, "Fiji").unwrap().cost, Money::from_dollars(70));
        assert!(matches!(
            require_country(table, "Narnia"),
            Err(CoreError::UnknownCountry(_))
        ));
    }
}
