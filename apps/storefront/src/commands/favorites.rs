//! Saved-product commands.

use serde::Serialize;
use tracing::debug;

use biosynth_core::Product;

use crate::app::App;
use crate::error::ApiResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteResponse {
    pub product_id: String,
    pub is_favorite: bool,
}

/// Saves or unsaves a product.
///
/// ## Errors
/// - `NOT_FOUND` for an unknown SKU
pub fn toggle_favorite(app: &App, product_id: &str) -> ApiResult<ToggleFavoriteResponse> {
    debug!(product_id = %product_id, "toggle_favorite command");

    let product = app.catalog.get(product_id)?;
    let is_favorite = app.favorites.toggle(&product.id);

    Ok(ToggleFavoriteResponse {
        product_id: product.id.clone(),
        is_favorite,
    })
}

/// Saved products in the order they were saved.
///
/// Ids that no longer resolve to a catalog entry are skipped.
pub fn list_favorites(app: &App) -> Vec<Product> {
    debug!("list_favorites command");

    app.favorites
        .snapshot()
        .list()
        .iter()
        .filter_map(|id| app.catalog.find_by_id(id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::StorefrontConfig;

    fn app() -> App {
        App::in_memory(StorefrontConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_and_list() {
        let app = app();
        assert!(toggle_favorite(&app, "SK10").unwrap().is_favorite);
        assert!(toggle_favorite(&app, "XA10").unwrap().is_favorite);
        assert!(!toggle_favorite(&app, "SK10").unwrap().is_favorite);

        let ids: Vec<String> = list_favorites(&app).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["XA10"]);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let app = app();
        assert_eq!(toggle_favorite(&app, "ZZ9").unwrap_err().code, ErrorCode::NotFound);
        assert!(app.favorites.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_stale_ids_are_skipped() {
        let app = app();
        // a retired SKU restored from storage
        app.favorites.toggle("RETIRED1");
        app.favorites.toggle("ET10");

        let ids: Vec<String> = list_favorites(&app).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["ET10"]);
    }
}
