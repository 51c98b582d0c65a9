//! # Catalog Store
//!
//! The immutable, ordered product catalog.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  data/products.json ──(include_str!)──► Catalog::from_json              │
//! │                                              │                          │
//! │                               duplicate SKU? price ≤ 0? purity > 100?   │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                   Catalog (read-only forever)           │
//! │                                   ├── all()        declaration order    │
//! │                                   ├── find_by_id() Option<&Product>     │
//! │                                   ├── query()      filter/search/sort   │
//! │                                   └── sections()   use-case groupings   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A miss on `find_by_id` is a plain `None`; callers render a "not found"
//! state rather than failing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, ProductCategory};

static BUNDLED_JSON: &str = include_str!("../data/products.json");

static BUNDLED: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_json(BUNDLED_JSON).expect("Invalid bundled product catalog")
});

// =============================================================================
// Dataset Shape
// =============================================================================

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
    #[serde(default)]
    sections: Vec<CatalogSection>,
}

/// A named use-case grouping of SKUs ("Fat Burn", "Research Blends", ...).
///
/// A product may appear in several sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogSection {
    pub name: String,
    pub ids: Vec<String>,
}

// =============================================================================
// Query
// =============================================================================

/// Result ordering for [`Catalog::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SortOrder {
    /// Declaration order.
    #[default]
    Featured,
    NameAsc,
    PriceAsc,
    PriceDesc,
    PurityDesc,
}

/// Catalog filter as driven by the browse page controls.
///
/// The default query matches every product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogQuery {
    /// `None` means "All".
    pub category: Option<ProductCategory>,

    /// Minimum purity percentage, inclusive.
    pub min_purity: f64,

    /// Case-insensitive substring over name, SKU, CAS number and chemical name.
    pub search: String,

    pub in_stock_only: bool,

    pub sort: SortOrder,
}

impl CatalogQuery {
    fn matches(&self, product: &Product, needle: &str) -> bool {
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }

        if product.purity < self.min_purity {
            return false;
        }

        if self.in_stock_only && !product.in_stock {
            return false;
        }

        needle.is_empty()
            || product.name.to_lowercase().contains(needle)
            || product.id.to_lowercase().contains(needle)
            || product.cas_number.to_lowercase().contains(needle)
            || product.chemical_name.to_lowercase().contains(needle)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Read-only product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
    sections: Vec<CatalogSection>,
}

impl Catalog {
    /// The catalog bundled into the binary.
    pub fn bundled() -> &'static Catalog {
        &BUNDLED
    }

    /// Parses a catalog dataset (`{ "products": [...], "sections": [...] }`).
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| CoreError::Dataset {
            dataset: "catalog".to_string(),
            reason: e.to_string(),
        })?;

        let mut catalog = Self::from_products(file.products)?;

        for section in &file.sections {
            if let Some(missing) = section.ids.iter().find(|id| !catalog.index.contains_key(*id)) {
                return Err(CoreError::Dataset {
                    dataset: "catalog".to_string(),
                    reason: format!("section '{}' references unknown SKU '{}'", section.name, missing),
                });
            }
        }
        catalog.sections = file.sections;

        Ok(catalog)
    }

    /// Builds a catalog from products, preserving their order.
    pub fn from_products(products: Vec<Product>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(products.len());

        for (position, product) in products.iter().enumerate() {
            if product.id.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "id".to_string(),
                }
                .into());
            }
            if !product.price.is_positive() {
                return Err(ValidationError::MustBePositive {
                    field: format!("price of {}", product.id),
                }
                .into());
            }
            if !(0.0..=100.0).contains(&product.purity) {
                return Err(ValidationError::OutOfRange {
                    field: format!("purity of {}", product.id),
                    min: 0,
                    max: 100,
                }
                .into());
            }
            if index.insert(product.id.clone(), position).is_some() {
                return Err(ValidationError::Duplicate {
                    field: "id".to_string(),
                    value: product.id.clone(),
                }
                .into());
            }
        }

        Ok(Catalog {
            products,
            index,
            sections: Vec::new(),
        })
    }

    /// Every product in declaration order.
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a product by SKU.
    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.index.get(id).map(|&position| &self.products[position])
    }

    /// Like [`Catalog::find_by_id`], for callers that propagate with `?`.
    pub fn get(&self, id: &str) -> CoreResult<&Product> {
        self.find_by_id(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    /// Filters, searches and sorts the catalog.
    ///
    /// Sorting is stable, so ties keep declaration order.
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Product> {
        let needle = query.search.trim().to_lowercase();

        let mut results: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| query.matches(p, &needle))
            .collect();

        match query.sort {
            SortOrder::Featured => {}
            SortOrder::NameAsc => {
                results.sort_by_cached_key(|p| p.name.to_lowercase());
            }
            SortOrder::PriceAsc => results.sort_by_key(|p| p.price),
            SortOrder::PriceDesc => results.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::PurityDesc => results.sort_by(|a, b| b.purity.total_cmp(&a.purity)),
        }

        results
    }

    /// Use-case sections with their products resolved.
    pub fn sections(&self) -> Vec<(&str, Vec<&Product>)> {
        self.sections
            .iter()
            .map(|section| {
                let products = section
                    .ids
                    .iter()
                    .filter_map(|id| self.find_by_id(id))
                    .collect();
                (section.name.as_str(), products)
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.all()[0].id, "TA10");
    }

    #[test]
    fn test_find_by_id() {
        let catalog = Catalog::bundled();
        let water = catalog.find_by_id("WA3").unwrap();
        assert_eq!(water.price, Money::from_cents(1200));

        assert!(catalog.find_by_id("NOPE").is_none());
        assert!(matches!(
            catalog.get("NOPE"),
            Err(CoreError::ProductNotFound(id)) if id == "NOPE"
        ));
    }

    #[test]
    fn test_query_default_is_declaration_order() {
        let catalog = Catalog::bundled();
        let ids: Vec<&str> = catalog
            .query(&CatalogQuery::default())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        let expected: Vec<&str> = catalog.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let catalog = Catalog::bundled();

        // CAS number
        let hits = catalog.query(&CatalogQuery {
            search: "53-84-9".to_string(),
            ..Default::default()
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "NJ500");

        // chemical name, mixed case
        let hits = catalog.query(&CatalogQuery {
            search: "THYMALFASIN".to_string(),
            ..Default::default()
        });
        assert_eq!(hits[0].id, "TA10");

        // SKU fragment
        let hits = catalog.query(&CatalogQuery {
            search: "wa".to_string(),
            category: Some(ProductCategory::Solvents),
            ..Default::default()
        });
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_query_filters() {
        let catalog = Catalog::bundled();

        let pure = catalog.query(&CatalogQuery {
            min_purity: 99.5,
            ..Default::default()
        });
        assert!(pure.iter().all(|p| p.purity >= 99.5));
        assert!(!pure.is_empty());

        let in_stock = catalog.query(&CatalogQuery {
            in_stock_only: true,
            ..Default::default()
        });
        assert!(in_stock.iter().all(|p| p.in_stock));
        assert!(in_stock.len() < catalog.len());
    }

    #[test]
    fn test_query_sort_by_price() {
        let catalog = Catalog::bundled();
        let asc = catalog.query(&CatalogQuery {
            sort: SortOrder::PriceAsc,
            ..Default::default()
        });
        assert!(asc.windows(2).all(|w| w[0].price <= w[1].price));

        let desc = catalog.query(&CatalogQuery {
            sort: SortOrder::PriceDesc,
            ..Default::default()
        });
        assert_eq!(desc.first().map(|p| p.id.as_str()), Some("KLOW"));
    }

    #[test]
    fn test_sections_resolve() {
        let catalog = Catalog::bundled();
        let sections = catalog.sections();
        let (name, products) = sections
            .iter()
            .find(|(name, _)| *name == "Solvents & Accessories")
            .unwrap();
        assert_eq!(*name, "Solvents & Accessories");
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn test_duplicate_sku_rejected() {
        let product = Catalog::bundled().all()[0].clone();
        let result = Catalog::from_products(vec![product.clone(), product]);
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_unknown_section_sku_rejected() {
        let json = r#"{ "products": [], "sections": [{ "name": "Ghost", "ids": ["X1"] }] }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CoreError::Dataset { .. })
        ));
    }
}
