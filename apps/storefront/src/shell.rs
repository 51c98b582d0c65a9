//! # Interactive Shell
//!
//! Line-oriented front-end over the command layer.
//!
//! ## Event Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         tokio::select!                                  │
//! │                                                                         │
//! │  stdin line ────────────► Shell::execute() ──► print reply / quit       │
//! │                                                                         │
//! │  checkout completion ───► complete_submission() ──► print hand-off      │
//! │  (after the delay)           stale attempt → nothing                    │
//! │                                                                         │
//! │  toast slot changed ────► print "» message" while Visible               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `execute` is synchronous and returns the text to print, so the whole
//! command surface is testable without a terminal.

use std::fmt::Write as _;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use biosynth_core::{
    CatalogQuery, CheckoutState, Product, ProductCategory, SortOrder,
};

use crate::app::App;
use crate::commands::cart::{self, CartResponse};
use crate::commands::checkout::{self, CheckoutResponse};
use crate::commands::{catalog, config, documents, favorites, shipping};
use crate::error::{ApiError, ApiResult};
use crate::state::{Handoff, ToastPhase};

const PROMPT: &str = "biosynth> ";

const HELP: &str = "\
Catalog
  products                      list products with the current filters
  search [text]                 filter by name, SKU, CAS number (empty clears)
  category <name|all>           filter by category
  sort <featured|name|price-asc|price-desc|purity>
  stock <on|off>                only in-stock products
  purity <min>                  minimum purity percentage
  show <sku>                    product detail
  sections                      products by research area
Requisition
  add <sku> [qty]               add units (default 1)
  inc <sku> | dec <sku>         step a line by one
  remove <sku> | clear          drop a line | empty the requisition
  cart                          show lines and pricing
  coupon <code> | uncoupon      apply | remove a discount code
Checkout
  checkout                      start checkout
  proceed | shop                answer the free-shipping prompt
  set <field> <value>           firstName lastName email street zip country
  form                          show the checkout form
  submit | cancel | reset
Other
  fav <sku> | favs              toggle | list saved products
  countries | regions           destinations
  ship <country>                shipping cost and delivery time
  doc <sku> <msds|coa> <code>   unlock a document
  config                        storefront settings
  help | quit";

/// What the loop should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Shell state that outlives one line: the browse filters.
#[derive(Debug, Default)]
pub struct Shell {
    query: CatalogQuery,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one input line. Errors are rendered, never returned.
    pub fn execute(&mut self, app: &mut App, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Text(String::new());
        }

        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(c, r)| (c, r.trim()));

        debug!(command = %command, "Shell command");

        match self.dispatch(app, &command.to_lowercase(), rest) {
            Ok(reply) => reply,
            Err(e) => Reply::Text(format!("error [{}]: {}", code_label(&e), e.message)),
        }
    }

    fn dispatch(&mut self, app: &mut App, command: &str, rest: &str) -> ApiResult<Reply> {
        let mut args = rest.split_whitespace();

        let text = match command {
            "help" | "?" => HELP.to_string(),
            "quit" | "exit" => return Ok(Reply::Quit),

            // ----- catalog -----
            "products" | "ls" => render_products(&catalog::search_products(app, &self.query)?),
            "search" => {
                self.query.search = rest.to_string();
                render_products(&catalog::search_products(app, &self.query)?)
            }
            "category" => {
                self.query.category = match rest {
                    "" | "all" => None,
                    name => Some(ProductCategory::parse(name).ok_or_else(|| {
                        ApiError::validation(format!("Unknown category: {}", name))
                    })?),
                };
                render_products(&catalog::search_products(app, &self.query)?)
            }
            "sort" => {
                self.query.sort = parse_sort(rest)?;
                render_products(&catalog::search_products(app, &self.query)?)
            }
            "stock" => {
                self.query.in_stock_only = matches!(rest, "on" | "yes" | "true");
                render_products(&catalog::search_products(app, &self.query)?)
            }
            "purity" => {
                let min: f64 = rest
                    .parse()
                    .map_err(|_| ApiError::validation(format!("Not a number: {}", rest)))?;
                self.query.min_purity = min.clamp(0.0, 100.0);
                render_products(&catalog::search_products(app, &self.query)?)
            }
            "show" => {
                let detail = catalog::get_product(app, required(args.next(), "sku")?)?;
                let mut out = render_product(&detail.product);
                let _ = writeln!(out);
                let _ = write!(
                    out,
                    "In requisition: {}{}",
                    detail.in_requisition,
                    if detail.is_favorite { "  ★ saved" } else { "" }
                );
                out
            }
            "sections" => {
                let mut out = String::new();
                for section in catalog::list_sections(app) {
                    let ids: Vec<&str> = section.products.iter().map(|p| p.id.as_str()).collect();
                    let _ = writeln!(out, "{:<30} {}", section.name, ids.join(", "));
                }
                out
            }

            // ----- requisition -----
            "add" => {
                let id = required(args.next(), "sku")?;
                let quantity = args
                    .next()
                    .map(|q| {
                        q.parse::<i64>()
                            .map_err(|_| ApiError::validation(format!("Not a quantity: {}", q)))
                    })
                    .transpose()?;
                let response = cart::add_to_cart(app, id, quantity)?;
                render_cart(&response.cart)
            }
            "inc" => render_cart(&cart::update_cart_item(app, required(args.next(), "sku")?, 1)?),
            "dec" => render_cart(&cart::update_cart_item(app, required(args.next(), "sku")?, -1)?),
            "remove" | "rm" => render_cart(&cart::remove_from_cart(app, required(args.next(), "sku")?)),
            "clear" => render_cart(&cart::clear_cart(app)),
            "cart" => render_cart(&cart::get_cart(app)),
            "coupon" => {
                let response = checkout::apply_coupon(app, required(args.next(), "code")?);
                render_coupon(&response)
            }
            "uncoupon" => render_coupon(&checkout::remove_coupon(app)),

            // ----- checkout -----
            "checkout" => render_checkout(&checkout::begin_checkout(app)?),
            "proceed" => render_checkout(&checkout::proceed_anyway(app)?),
            "shop" => {
                checkout::shop_more(app)?;
                render_products(&catalog::search_products(app, &self.query)?)
            }
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| ApiError::validation("Usage: set <field> <value>"))?;
                checkout::set_checkout_field(app, field, value.trim())?;
                format!("{} set", field)
            }
            "form" => render_checkout(&checkout::get_checkout(app)),
            "submit" => {
                let response = checkout::submit_checkout(app)?;
                if response.accepted {
                    "Preparing your requisition...".to_string()
                } else {
                    render_checkout(&response.checkout)
                }
            }
            "cancel" => render_checkout(&checkout::cancel_checkout(app)?),
            "reset" => render_checkout(&checkout::reset_checkout(app)),

            // ----- other -----
            "fav" => {
                let response = favorites::toggle_favorite(app, required(args.next(), "sku")?)?;
                let verb = if response.is_favorite { "Saved" } else { "Removed" };
                format!("{} {}", verb, response.product_id)
            }
            "favs" => render_products(&favorites::list_favorites(app)),
            "countries" => {
                let mut out = String::new();
                for country in shipping::list_countries(app) {
                    let _ = writeln!(out, "{:<28} {:<14} {:>8}", country.name, country.region, country.cost.to_string());
                }
                out
            }
            "regions" => {
                let mut out = String::new();
                for region in shipping::shipping_regions(app) {
                    let _ = writeln!(out, "{}", region.name);
                    for sub in &region.subregions {
                        let _ = writeln!(out, "  {} ({})", sub.name, sub.countries.len());
                    }
                }
                out
            }
            "ship" => {
                let country = shipping::get_country(app, rest)?;
                format!(
                    "{} ({}): {} flat, {}",
                    country.name,
                    country.region,
                    country.cost,
                    shipping::estimate_delivery(app, &country.name)
                )
            }
            "doc" => {
                let id = required(args.next(), "sku")?;
                let kind = required(args.next(), "document type")?;
                let code = args.next().unwrap_or("");
                documents::request_document(app, id, kind, code)?.notification
            }
            "config" => {
                let view = config::get_config(app);
                format!(
                    "Free shipping from {} · max {} per item · storage: {}",
                    view.free_shipping_threshold,
                    view.max_quantity_per_item,
                    if view.persistent { "saved" } else { "memory only" }
                )
            }
            other => {
                return Err(ApiError::validation(format!(
                    "Unknown command: {} (try `help`)",
                    other
                )))
            }
        };

        Ok(Reply::Text(text))
    }
}

/// Drives the shell until `quit` or end of input.
pub async fn run(app: &mut App) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut toasts = app.toasts.subscribe();
    let mut shell = Shell::new();

    stdout
        .write_all(b"BioSynth research catalog. Type `help` for commands.\n")
        .await?;
    prompt(&mut stdout).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match shell.execute(app, &line) {
                    Reply::Quit => break,
                    Reply::Text(text) => print_block(&mut stdout, &text).await?,
                }
                prompt(&mut stdout).await?;
            }
            Some(attempt) = app.checkout.next_completion() => {
                if let Some(handoff) = checkout::complete_submission(app, attempt) {
                    print_block(&mut stdout, &render_handoff(&handoff)).await?;
                    prompt(&mut stdout).await?;
                }
            }
            Ok(()) = toasts.changed() => {
                let toast = toasts.borrow_and_update().clone();
                if let Some(toast) = toast.filter(|t| t.phase == ToastPhase::Visible) {
                    print_block(&mut stdout, &format!("» {}", toast.message)).await?;
                }
            }
        }
    }

    info!("Shell closed");
    Ok(())
}

async fn prompt(stdout: &mut tokio::io::Stdout) -> io::Result<()> {
    stdout.write_all(PROMPT.as_bytes()).await?;
    stdout.flush().await
}

async fn print_block(stdout: &mut tokio::io::Stdout, text: &str) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    stdout.write_all(text.trim_end().as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

// =============================================================================
// Parsing
// =============================================================================

fn required<'a>(arg: Option<&'a str>, name: &str) -> ApiResult<&'a str> {
    arg.ok_or_else(|| ApiError::validation(format!("Missing {}", name)))
}

fn parse_sort(s: &str) -> ApiResult<SortOrder> {
    match s {
        "" | "featured" => Ok(SortOrder::Featured),
        "name" => Ok(SortOrder::NameAsc),
        "price-asc" | "price" => Ok(SortOrder::PriceAsc),
        "price-desc" => Ok(SortOrder::PriceDesc),
        "purity" => Ok(SortOrder::PurityDesc),
        other => Err(ApiError::validation(format!("Unknown sort order: {}", other))),
    }
}

fn code_label(err: &ApiError) -> String {
    serde_json::to_value(err.code)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", err.code))
}

// =============================================================================
// Rendering
// =============================================================================

fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products match.".to_string();
    }

    let mut out = String::new();
    for p in products {
        let _ = writeln!(
            out,
            "{:<6} {:<34} {:>9}  {:>5.1}%  {}",
            p.id,
            p.name,
            p.price.to_string(),
            p.purity,
            if p.in_stock { "" } else { "out of stock" }
        );
    }
    out
}

fn render_product(p: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}] {}", p.name, p.id, p.price);
    let _ = writeln!(out, "  {}", p.description);
    let _ = writeln!(out, "  Chemical name:  {}", p.chemical_name);
    let _ = writeln!(out, "  CAS:            {}", p.cas_number);
    let _ = writeln!(out, "  Formula:        {}", p.formula);
    let _ = writeln!(out, "  Mol. weight:    {}", p.molecular_weight);
    let _ = writeln!(out, "  Purity:         {:.1}% ({})", p.purity, p.analysis_method);
    if let Some(sequence) = &p.sequence {
        let _ = writeln!(out, "  Sequence:       {}", sequence);
    }
    let _ = writeln!(out, "  Storage:        {}", p.storage);
    let _ = write!(out, "  Solubility:     {}", p.solubility);
    out
}

fn render_cart(cart: &CartResponse) -> String {
    if cart.items.is_empty() {
        return "Your requisition is empty.".to_string();
    }

    let pricing = &cart.pricing;
    let mut out = String::new();
    for item in &cart.items {
        let _ = writeln!(
            out,
            "{:<6} {:<34} x{:<3} {:>10}",
            item.id(),
            item.product.name,
            item.quantity,
            item.line_total().to_string()
        );
    }
    let _ = writeln!(out, "Subtotal:            {}", pricing.subtotal);
    if let Some(tier) = &pricing.volume_tier {
        let _ = writeln!(out, "Volume ({}):    -{}", tier.label, pricing.volume_discount_amount);
    }
    if let Some(coupon) = &pricing.coupon {
        let _ = writeln!(out, "Coupon {}:     -{}", coupon.code, pricing.coupon_discount_amount);
    }
    match &pricing.destination {
        Some(destination) => {
            let _ = writeln!(out, "Shipping ({}): {}", destination.region, pricing.shipping_label());
        }
        None if pricing.is_free_shipping => {
            let _ = writeln!(out, "Shipping:            Waived");
        }
        None => {
            let _ = writeln!(out, "Shipping:            calculated at checkout");
        }
    }
    let _ = writeln!(out, "Total:               {}", pricing.total);

    if let Some(nudge) = &cart.volume_nudge {
        let _ = writeln!(
            out,
            "Add {} more unit(s) to unlock {}",
            nudge.units_needed, nudge.tier.label
        );
    }
    if cart.free_shipping_close {
        let _ = writeln!(
            out,
            "{} away from free shipping",
            pricing.remaining_for_free_shipping()
        );
    }
    out
}

fn render_coupon(response: &CheckoutResponse) -> String {
    match (&response.coupon.error, &response.coupon.applied) {
        (Some(error), _) => error.clone(),
        (None, Some(coupon)) => format!("{} applied: {}", coupon.code, coupon.label),
        (None, None) => "No coupon applied".to_string(),
    }
}

fn render_checkout(response: &CheckoutResponse) -> String {
    let mut out = String::new();
    match response.state {
        CheckoutState::ShippingWarningShown { remaining } => {
            let _ = writeln!(
                out,
                "You are {} away from free shipping. `proceed` or `shop`?",
                remaining
            );
        }
        CheckoutState::FormEntry => {
            let form = &response.form;
            let _ = writeln!(out, "Checkout details:");
            let _ = writeln!(out, "  firstName: {}", form.first_name);
            let _ = writeln!(out, "  lastName:  {}", form.last_name);
            let _ = writeln!(out, "  email:     {}", form.email);
            let _ = writeln!(out, "  street:    {}", form.street);
            let _ = writeln!(out, "  zip:       {}", form.zip);
            let _ = writeln!(out, "  country:   {}", form.country);
            for (field, message) in &response.errors {
                let _ = writeln!(out, "  ! {}: {}", field, message);
            }
            let _ = writeln!(out, "Total: {}", response.pricing.total);
        }
        state => {
            let _ = writeln!(out, "Checkout is {}", state);
        }
    }
    out
}

fn render_handoff(handoff: &Handoff) -> String {
    format!(
        "Requisition ready. Open this link to send it:\n{}\n\n{}",
        handoff.url, handoff.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StorefrontConfig;

    fn app() -> App {
        App::in_memory(StorefrontConfig::default()).unwrap()
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_browse_filters_stick() {
        let mut app = app();
        let mut shell = Shell::new();

        let out = text(shell.execute(&mut app, "category solvents"));
        assert!(out.contains("WA3") && out.contains("WA10"));
        assert!(!out.contains("KLOW"));

        let out = text(shell.execute(&mut app, "search 10ml"));
        assert!(out.contains("WA10"));
        assert!(!out.contains("WA3 "));

        let out = text(shell.execute(&mut app, "category all"));
        assert!(out.contains("LC600"));
    }

    #[tokio::test]
    async fn test_cart_commands() {
        let mut app = app();
        let mut shell = Shell::new();

        let out = text(shell.execute(&mut app, "add WA3 4"));
        assert!(out.contains("x4"));
        assert!(out.contains("Add 1 more unit(s) to unlock 5% off"));

        let out = text(shell.execute(&mut app, "inc WA3"));
        assert!(out.contains("Volume (5% off)"));

        let out = text(shell.execute(&mut app, "coupon nope"));
        assert_eq!(out, "Invalid discount code");

        let out = text(shell.execute(&mut app, "clear"));
        assert_eq!(out, "Your requisition is empty.");
    }

    #[tokio::test]
    async fn test_errors_are_rendered() {
        let mut app = app();
        let mut shell = Shell::new();

        assert_eq!(
            text(shell.execute(&mut app, "add NOPE")),
            "error [NOT_FOUND]: Product not found: NOPE"
        );
        assert!(text(shell.execute(&mut app, "frobnicate")).starts_with("error [VALIDATION_ERROR]"));
        assert!(text(shell.execute(&mut app, "checkout")).starts_with("error [EMPTY_REQUISITION]"));
        assert_eq!(shell.execute(&mut app, "quit"), Reply::Quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_through_shell() {
        let mut app = app();
        let mut shell = Shell::new();

        shell.execute(&mut app, "add NJ500 1");
        let out = text(shell.execute(&mut app, "checkout"));
        assert!(out.contains("Checkout details"));

        for line in [
            "set firstName Marie",
            "set lastName Curie",
            "set email marie@institut.fr",
            "set street 11 Rue Pierre et Marie Curie",
            "set zip 75005",
            "set country France",
        ] {
            shell.execute(&mut app, line);
        }

        let out = text(shell.execute(&mut app, "submit"));
        assert_eq!(out, "Preparing your requisition...");

        let attempt = app.checkout.next_completion().await.unwrap();
        let handoff = checkout::complete_submission(&mut app, attempt).unwrap();
        let rendered = render_handoff(&handoff);
        assert!(rendered.contains("https://wa.me/"));
        assert!(rendered.contains("Address: 11 Rue Pierre et Marie Curie, 75005"));
    }
}
