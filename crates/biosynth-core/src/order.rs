//! # Order Hand-off
//!
//! Builds the plain-text requisition message and the outbound messaging link.
//!
//! ```text
//! CheckoutForm + Cart + PricingSnapshot + destination
//!        │
//!        ▼
//! compose_message() ──► "*New Research Requisition Request* ..."
//!        │
//!        ▼
//! handoff_url(phone) ──► https://wa.me/{phone}?text=%2ANew%20Research...
//! ```
//!
//! The link is a one-way hand-off; nothing is awaited or parsed back.

use url::Url;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::pricing::PricingSnapshot;
use crate::shipping::CountryShippingRecord;
use crate::validation::{sanitize, CheckoutForm};

/// Base of the messaging hand-off link.
pub const HANDOFF_BASE: &str = "https://wa.me";

/// Renders the requisition summary sent to the sales contact.
///
/// Form values are sanitized again here, since the message is the last
/// place they are rendered. Discount lines appear only when that discount
/// is non-zero.
pub fn compose_message(
    form: &CheckoutForm,
    cart: &Cart,
    pricing: &PricingSnapshot,
    destination: &CountryShippingRecord,
) -> String {
    let mut lines = vec![
        "*New Research Requisition Request*".to_string(),
        String::new(),
        "*Client Details:*".to_string(),
        format!(
            "Name: {} {}",
            sanitize(&form.first_name),
            sanitize(&form.last_name)
        ),
        format!("Email: {}", sanitize(&form.email)),
        format!("Address: {}, {}", sanitize(&form.street), sanitize(&form.zip)),
        format!("Country: {}", destination.name),
        String::new(),
        "*Requisition Items:*".to_string(),
    ];

    lines.extend(cart.items().iter().enumerate().map(|(idx, item)| {
        format!(
            "{}. {} (Qty: {}) - {}",
            idx + 1,
            item.product.name,
            item.quantity,
            item.line_total()
        )
    }));
    lines.push(String::new());

    lines.push("*Financial Summary:*".to_string());
    lines.push(format!("Subtotal: {}", pricing.subtotal));
    if let Some(tier) = &pricing.volume_tier {
        if pricing.volume_discount_amount.is_positive() {
            lines.push(format!(
                "Volume Discount ({}): -{}",
                tier.label, pricing.volume_discount_amount
            ));
        }
    }
    if let Some(coupon) = &pricing.coupon {
        if pricing.coupon_discount_amount.is_positive() {
            lines.push(format!(
                "Coupon ({}): -{}",
                coupon.code, pricing.coupon_discount_amount
            ));
        }
    }
    lines.push(format!(
        "Shipping ({}): {}",
        destination.region,
        pricing.shipping_label()
    ));
    lines.push(format!("*TOTAL ESTIMATED VALUE:* {}", pricing.total));
    lines.push(String::new());

    let delivery = if destination.time.trim().is_empty() {
        "To be confirmed"
    } else {
        destination.time.as_str()
    };
    lines.push(format!("*Estimated Delivery:* {delivery}"));
    lines.push(String::new());
    lines.push("_This request is for laboratory research use only._".to_string());

    lines.join("\n")
}

/// Percent-encodes `message` into the messaging link for `phone`.
pub fn handoff_url(phone: &str, message: &str) -> CoreResult<Url> {
    let phone = phone.trim();
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::HandoffUrl(format!(
            "contact '{phone}' is not a digits-only phone number"
        )));
    }

    let raw = format!(
        "{}/{}?text={}",
        HANDOFF_BASE,
        phone,
        urlencoding::encode(message)
    );
    Url::parse(&raw).map_err(|e| CoreError::HandoffUrl(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::money::Money;
    use crate::pricing::PricingEngine;
    use crate::shipping::ShippingTable;

    fn form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            street: "12 St James's Square".to_string(),
            zip: "SW1Y 4JH".to_string(),
            country: "United Kingdom".to_string(),
        }
    }

    #[test]
    fn test_message_layout_without_discounts() {
        let catalog = Catalog::bundled();
        let mut cart = Cart::new(50);
        cart.add_item(catalog.find_by_id("IP5").unwrap(), 2); // $79.98
        cart.add_item(catalog.find_by_id("WA3").unwrap(), 1); // $12.00

        let uk = ShippingTable::bundled().lookup("United Kingdom").unwrap();
        let pricing = PricingEngine::standard().quote(&cart, None, Some(uk));
        let message = compose_message(&form(), &cart, &pricing, uk);

        let expected = "\
*New Research Requisition Request*

*Client Details:*
Name: Ada Lovelace
Email: ada@example.org
Address: 12 St James's Square, SW1Y 4JH
Country: United Kingdom

*Requisition Items:*
1. Ipamorelin 5mg (Qty: 2) - $79.98
2. Bacteriostatic Water 3ml (Qty: 1) - $12.00

*Financial Summary:*
Subtotal: $91.98
Shipping (Europe): $55.00
*TOTAL ESTIMATED VALUE:* $146.98

*Estimated Delivery:* 14–19 days

_This request is for laboratory research use only._";

        assert_eq!(message, expected);
    }

    #[test]
    fn test_message_includes_active_discounts_and_waived_shipping() {
        let catalog = Catalog::bundled();
        let engine = PricingEngine::standard();
        let mut cart = Cart::new(50);
        cart.add_item(catalog.find_by_id("TA10").unwrap(), 10); // $899.90

        let japan = ShippingTable::bundled().lookup("Japan").unwrap();
        let coupon = engine.find_coupon("WELCOME5").cloned();
        let pricing = engine.quote(&cart, coupon.as_ref(), Some(japan));
        let message = compose_message(&form(), &cart, &pricing, japan);

        assert!(message.contains("Volume Discount (10% off): -$89.99\n"));
        assert!(message.contains("Coupon (WELCOME5): -$40.50\n"));
        assert!(message.contains("Shipping (Asia): Waived\n"));
        assert!(message.contains(&format!("*TOTAL ESTIMATED VALUE:* {}", pricing.total)));
        assert_eq!(pricing.total, Money::from_cents(76_941));
    }

    #[test]
    fn test_message_resanitizes_form_values() {
        let mut form = form();
        form.first_name = "<Ada>".to_string();

        let catalog = Catalog::bundled();
        let mut cart = Cart::new(50);
        cart.add_item(catalog.find_by_id("WA3").unwrap(), 1);
        let uk = ShippingTable::bundled().lookup("United Kingdom").unwrap();
        let pricing = PricingEngine::standard().quote(&cart, None, Some(uk));

        let message = compose_message(&form, &cart, &pricing, uk);
        assert!(message.contains("Name: Ada Lovelace\n"));
    }

    #[test]
    fn test_handoff_url() {
        let url = handoff_url("5522998004156", "*Hi* & bye").unwrap();
        assert_eq!(url.host_str(), Some("wa.me"));
        assert_eq!(url.path(), "/5522998004156");

        let text: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(text, vec![("text".to_string(), "*Hi* & bye".to_string())]);
        assert!(url.as_str().contains("%26"));
    }

    #[test]
    fn test_handoff_url_rejects_bad_phone() {
        assert!(matches!(
            handoff_url("+55 22", "x"),
            Err(CoreError::HandoffUrl(_))
        ));
    }
}
