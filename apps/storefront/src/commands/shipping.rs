//! Shipping destination commands: the country selector, the region
//! hierarchy and delivery estimates.

use tracing::debug;

use biosynth_core::shipping::Region;
use biosynth_core::CountryShippingRecord;

use crate::app::App;
use crate::error::ApiResult;
use crate::state::require_country;

/// Every destination, sorted by name.
pub fn list_countries(app: &App) -> Vec<CountryShippingRecord> {
    debug!("list_countries command");
    app.shipping.list_all_sorted().to_vec()
}

/// The region → sub-region → country hierarchy as declared.
pub fn shipping_regions(app: &App) -> Vec<Region> {
    app.shipping.regions().to_vec()
}

/// One destination by exact name.
pub fn get_country(app: &App, name: &str) -> ApiResult<CountryShippingRecord> {
    debug!(country = %name, "get_country command");
    Ok(require_country(app.shipping, name)?.clone())
}

/// Delivery time for `name`; unknown countries get the generic estimate.
pub fn estimate_delivery(app: &App, name: &str) -> String {
    app.shipping.estimate(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::StorefrontConfig;
    use biosynth_core::{Money, FALLBACK_SHIPPING_ESTIMATE};

    fn app() -> App {
        App::in_memory(StorefrontConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_country_list_is_sorted() {
        let countries = list_countries(&app());
        assert!(countries.len() > 100);
        assert!(countries.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[tokio::test]
    async fn test_lookup_and_estimate() {
        let app = app();
        let canada = get_country(&app, "Canada").unwrap();
        assert_eq!(canada.region, "The Americas");
        assert_eq!(canada.cost, Money::from_dollars(45));

        assert_eq!(estimate_delivery(&app, "Canada"), "7–10 days");
        assert_eq!(estimate_delivery(&app, "Atlantis"), FALLBACK_SHIPPING_ESTIMATE);
        assert_eq!(get_country(&app, "Atlantis").unwrap_err().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_regions_keep_declaration_order() {
        let regions = shipping_regions(&app());
        assert_eq!(regions[0].name, "United States");
        assert_eq!(regions[1].name, "The Americas");
    }
}
