//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   VolumeTier    │   │     Coupon      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (SKU)       │   │  min_qty        │   │  code           │       │
//! │  │  cas_number     │   │  rate (bps)     │   │  rate (bps)     │       │
//! │  │  purity         │   │  label          │   │  label          │       │
//! │  │  price (cents)  │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │ ProductCategory │   │ AnalysisMethod  │       │
//! │  │  bps (u32)      │   │  Peptides, ...  │   │  HPLC, MS, NMR  │       │
//! │  │  1000 = 10%     │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are immutable once the catalog is loaded; identity is the SKU `id`.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount fraction represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10%. Rates are capped at 10000
/// (100%) which keeps every discounted amount non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Highest representable rate (100%).
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points, capping at 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            DiscountRate(Self::MAX_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// Creates a rate from basis points, rejecting values above 100%.
    pub fn try_from_bps(bps: u32) -> Result<Self, ValidationError> {
        if bps > Self::MAX_BPS {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: i64::from(Self::MAX_BPS),
            });
        }
        Ok(DiscountRate(bps))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product family used for catalog filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProductCategory {
    #[serde(rename = "Synthetic Peptides")]
    Peptides,
    #[serde(rename = "Peptide Blends")]
    Blends,
    #[serde(rename = "Metabolics & Mitochondrial")]
    Metabolics,
    #[serde(rename = "Lipolytics")]
    Lipolytics,
    #[serde(rename = "Solvents & Solutions")]
    Solvents,
    #[serde(rename = "Biochemical Reagents")]
    Reagents,
    #[serde(rename = "Assay Kits")]
    Kits,
}

impl ProductCategory {
    /// Every category, in menu order.
    pub const ALL: [ProductCategory; 7] = [
        ProductCategory::Peptides,
        ProductCategory::Blends,
        ProductCategory::Metabolics,
        ProductCategory::Lipolytics,
        ProductCategory::Solvents,
        ProductCategory::Reagents,
        ProductCategory::Kits,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Peptides => "Synthetic Peptides",
            ProductCategory::Blends => "Peptide Blends",
            ProductCategory::Metabolics => "Metabolics & Mitochondrial",
            ProductCategory::Lipolytics => "Lipolytics",
            ProductCategory::Solvents => "Solvents & Solutions",
            ProductCategory::Reagents => "Biochemical Reagents",
            ProductCategory::Kits => "Assay Kits",
        }
    }

    /// Parses a label or a short keyword (`peptides`, `kits`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| {
            c.label().to_lowercase() == needle || format!("{c:?}").to_lowercase() == needle
        })
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Analytical method backing the published purity figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AnalysisMethod {
    #[serde(rename = "HPLC")]
    Hplc,
    #[serde(rename = "MS")]
    Ms,
    #[serde(rename = "NMR")]
    Nmr,
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMethod::Hplc => f.write_str("HPLC"),
            AnalysisMethod::Ms => f.write_str("MS"),
            AnalysisMethod::Nmr => f.write_str("NMR"),
        }
    }
}

/// Molecular weight: a number for single compounds, free text for mixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum MolecularWeight {
    Daltons(f64),
    Description(String),
}

impl fmt::Display for MolecularWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MolecularWeight::Daltons(value) => write!(f, "{value} g/mol"),
            MolecularWeight::Description(text) => f.write_str(text),
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// SKU, unique across the catalog.
    pub id: String,

    /// Display name shown on cards and in the requisition.
    pub name: String,

    pub chemical_name: String,

    pub cas_number: String,

    pub formula: String,

    pub molecular_weight: MolecularWeight,

    /// Purity percentage (0-100).
    pub purity: f64,

    /// Amino-acid sequence, peptides only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,

    pub category: ProductCategory,

    /// Unit price in cents.
    pub price: Money,

    pub description: String,

    pub storage: String,

    pub solubility: String,

    pub analysis_method: AnalysisMethod,

    pub in_stock: bool,
}

// =============================================================================
// Discount Rules
// =============================================================================

/// A volume tier unlocked by total requisition quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VolumeTier {
    /// Total units needed to qualify.
    pub min_qty: u32,

    pub rate: DiscountRate,

    /// Short label, e.g. "10% off".
    pub label: String,
}

impl VolumeTier {
    pub fn new(min_qty: u32, rate: DiscountRate, label: impl Into<String>) -> Self {
        VolumeTier {
            min_qty,
            rate,
            label: label.into(),
        }
    }
}

/// A coupon code mapped to a discount.
///
/// Codes are stored upper-case; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    pub code: String,

    pub rate: DiscountRate,

    /// Long label, e.g. "10% Research Discount".
    pub label: String,
}

impl Coupon {
    pub fn new(code: impl Into<String>, rate: DiscountRate, label: impl Into<String>) -> Self {
        Coupon {
            code: code.into().trim().to_uppercase(),
            rate,
            label: label.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_caps_at_full() {
        assert_eq!(DiscountRate::from_bps(1000).bps(), 1000);
        assert_eq!(DiscountRate::from_bps(25_000).bps(), 10_000);
        assert!(DiscountRate::try_from_bps(10_001).is_err());
        assert!((DiscountRate::from_bps(1500).percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            ProductCategory::parse("Synthetic Peptides"),
            Some(ProductCategory::Peptides)
        );
        assert_eq!(ProductCategory::parse("kits"), Some(ProductCategory::Kits));
        assert_eq!(ProductCategory::parse("hardware"), None);
    }

    #[test]
    fn test_product_json_shape() {
        let json = r#"{
            "id": "WA3",
            "name": "Bacteriostatic Water 3ml",
            "chemicalName": "Bacteriostatic Water",
            "casNumber": "7732-18-5",
            "formula": "H2O",
            "molecularWeight": "Mixture",
            "purity": 99.9,
            "category": "Solvents & Solutions",
            "price": 1200,
            "description": "Sterile diluent.",
            "storage": "Room temperature",
            "solubility": "N/A",
            "analysisMethod": "HPLC",
            "inStock": true
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Money::from_cents(1200));
        assert_eq!(product.category, ProductCategory::Solvents);
        assert_eq!(
            product.molecular_weight,
            MolecularWeight::Description("Mixture".to_string())
        );
        assert!(product.sequence.is_none());
    }

    #[test]
    fn test_coupon_code_normalized() {
        let coupon = Coupon::new(" welcome5 ", DiscountRate::from_bps(500), "5% Welcome Discount");
        assert_eq!(coupon.code, "WELCOME5");
    }
}
