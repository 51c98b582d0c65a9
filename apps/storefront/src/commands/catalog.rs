//! # Catalog Commands
//!
//! Browse page, search and product detail.

use serde::Serialize;
use tracing::debug;

use biosynth_core::validation::validate_search_query;
use biosynth_core::{CatalogQuery, Product};

use crate::app::App;
use crate::error::ApiResult;

/// A product plus the shopper-specific bits the detail page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub is_favorite: bool,
    /// Units of this product already in the requisition.
    pub in_requisition: u32,
}

/// A use-case section with its products.
#[derive(Debug, Clone, Serialize)]
pub struct SectionResponse {
    pub name: String,
    pub products: Vec<Product>,
}

/// Filters, searches and sorts the catalog.
///
/// ## Errors
/// - `VALIDATION_ERROR` if the search text exceeds 100 characters
pub fn search_products(app: &App, query: &CatalogQuery) -> ApiResult<Vec<Product>> {
    debug!(search = %query.search, category = ?query.category, "search_products command");

    let mut query = query.clone();
    query.search = validate_search_query(&query.search)?;

    Ok(app.catalog.query(&query).into_iter().cloned().collect())
}

/// Gets one product by SKU.
pub fn get_product(app: &App, product_id: &str) -> ApiResult<ProductDetail> {
    debug!(product_id = %product_id, "get_product command");

    let product = app.catalog.get(product_id)?;
    let in_requisition = app
        .cart
        .with_cart(|cart| cart.get(product_id).map_or(0, |line| line.quantity));

    Ok(ProductDetail {
        product: product.clone(),
        is_favorite: app.favorites.contains(product_id),
        in_requisition,
    })
}

/// Home page sections in declaration order.
pub fn list_sections(app: &App) -> Vec<SectionResponse> {
    app.catalog
        .sections()
        .into_iter()
        .map(|(name, products)| SectionResponse {
            name: name.to_string(),
            products: products.into_iter().cloned().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::StorefrontConfig;
    use biosynth_core::{ProductCategory, SortOrder};

    fn app() -> App {
        App::in_memory(StorefrontConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_search_and_sort() {
        let app = app();
        let query = CatalogQuery {
            category: Some(ProductCategory::Solvents),
            sort: SortOrder::PriceDesc,
            ..Default::default()
        };

        let ids: Vec<String> = search_products(&app, &query)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["WA10", "WA3"]);
    }

    #[tokio::test]
    async fn test_overlong_search_rejected() {
        let app = app();
        let query = CatalogQuery {
            search: "x".repeat(101),
            ..Default::default()
        };
        let err = search_products(&app, &query).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_product_detail_reflects_cart_and_favorites() {
        let app = app();
        app.cart.add_item(app.catalog.get("MS10").unwrap(), 4);
        app.favorites.toggle("MS10");

        let detail = get_product(&app, "MS10").unwrap();
        assert_eq!(detail.in_requisition, 4);
        assert!(detail.is_favorite);

        assert_eq!(get_product(&app, "NOPE").unwrap_err().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_sections() {
        let sections = list_sections(&app());
        let solvents = sections
            .iter()
            .find(|s| s.name == "Solvents & Accessories")
            .unwrap();
        assert_eq!(solvents.products.len(), 2);
    }
}
