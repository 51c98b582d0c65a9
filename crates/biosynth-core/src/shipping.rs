//! # Shipping Table
//!
//! Static country → {region, flat cost, transit estimate} table.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Region ("Europe")                                                      │
//! │  └── SubRegion ("Western Europe")                                       │
//! │      └── CountryData { name: "Germany", time: "15–20 days", cost }      │
//! │                                                                         │
//! │  regions()          → hierarchy, for the delivery-info page             │
//! │  list_all_sorted()  → flattened CountryShippingRecord, A→Z              │
//! │  lookup(name)       → exact-name record or None                         │
//! │  estimate(name)     → transit string, "15–30 business days" fallback    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Estimates are display strings and are never parsed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::FALLBACK_SHIPPING_ESTIMATE;

static BUNDLED_JSON: &str = include_str!("../data/shipping.json");

static BUNDLED: LazyLock<ShippingTable> = LazyLock::new(|| {
    ShippingTable::from_json(BUNDLED_JSON).expect("Invalid bundled shipping table")
});

// =============================================================================
// Hierarchy
// =============================================================================

/// A destination country inside the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountryData {
    pub name: String,
    pub time: String,
    /// Flat shipping fee in cents.
    pub cost: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubRegion {
    pub name: String,
    pub countries: Vec<CountryData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Region {
    pub name: String,
    pub subregions: Vec<SubRegion>,
}

#[derive(Debug, Deserialize)]
struct ShippingFile {
    regions: Vec<Region>,
}

/// Flattened destination entry used by the country selector and pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountryShippingRecord {
    pub name: String,
    /// Top-level region label ("Europe", "The Americas", ...).
    pub region: String,
    pub cost: Money,
    pub time: String,
}

// =============================================================================
// Shipping Table
// =============================================================================

#[derive(Debug, Clone)]
pub struct ShippingTable {
    regions: Vec<Region>,
    sorted: Vec<CountryShippingRecord>,
    by_name: HashMap<String, usize>,
}

impl ShippingTable {
    /// The table bundled into the binary.
    pub fn bundled() -> &'static ShippingTable {
        &BUNDLED
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        let file: ShippingFile = serde_json::from_str(json).map_err(|e| CoreError::Dataset {
            dataset: "shipping".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_regions(file.regions)
    }

    /// Builds the table from a region hierarchy.
    ///
    /// Country names must be unique and costs non-negative.
    pub fn from_regions(regions: Vec<Region>) -> CoreResult<Self> {
        let mut sorted = Vec::new();

        for region in &regions {
            for sub in &region.subregions {
                for country in &sub.countries {
                    if country.cost.is_negative() {
                        return Err(ValidationError::OutOfRange {
                            field: format!("shipping cost of {}", country.name),
                            min: 0,
                            max: i64::MAX,
                        }
                        .into());
                    }
                    sorted.push(CountryShippingRecord {
                        name: country.name.clone(),
                        region: region.name.clone(),
                        cost: country.cost,
                        time: country.time.clone(),
                    });
                }
            }
        }

        sorted.sort_by_cached_key(|record| record.name.to_lowercase());

        let mut by_name = HashMap::with_capacity(sorted.len());
        for (position, record) in sorted.iter().enumerate() {
            if by_name.insert(record.name.clone(), position).is_some() {
                return Err(ValidationError::Duplicate {
                    field: "country".to_string(),
                    value: record.name.clone(),
                }
                .into());
            }
        }

        Ok(ShippingTable {
            regions,
            sorted,
            by_name,
        })
    }

    /// The raw region → subregion → country hierarchy.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Every destination, sorted case-insensitively by name.
    pub fn list_all_sorted(&self) -> &[CountryShippingRecord] {
        &self.sorted
    }

    /// Exact-name lookup.
    pub fn lookup(&self, country: &str) -> Option<&CountryShippingRecord> {
        self.by_name.get(country).map(|&position| &self.sorted[position])
    }

    /// Transit estimate for a destination, never failing.
    ///
    /// ## Example
    /// ```rust
    /// use biosynth_core::shipping::ShippingTable;
    ///
    /// let table = ShippingTable::bundled();
    /// assert_eq!(table.estimate("Canada"), "7–10 days");
    /// assert_eq!(table.estimate("Atlantis"), "15–30 business days");
    /// ```
    pub fn estimate(&self, country: &str) -> &str {
        self.lookup(country)
            .map(|record| record.time.as_str())
            .unwrap_or(FALLBACK_SHIPPING_ESTIMATE)
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_name() {
        let table = ShippingTable::bundled();

        let germany = table.lookup("Germany").unwrap();
        assert_eq!(germany.region, "Europe");
        assert_eq!(germany.cost, Money::from_dollars(55));
        assert_eq!(germany.time, "15–20 days");

        assert!(table.lookup("germany").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_estimate_fallback() {
        let table = ShippingTable::bundled();
        assert_eq!(table.estimate("United States"), "3–7 days");
        assert_eq!(table.estimate("Narnia"), FALLBACK_SHIPPING_ESTIMATE);
    }

    #[test]
    fn test_list_all_sorted_case_insensitive() {
        let table = ShippingTable::bundled();
        let names: Vec<String> = table
            .list_all_sorted()
            .iter()
            .map(|r| r.name.to_lowercase())
            .collect();

        let mut expected = names.clone();
        expected.sort();
        assert_eq!(names, expected);
        assert_eq!(table.list_all_sorted()[0].name, "Albania");
        assert_eq!(table.len(), 109);
    }

    #[test]
    fn test_regions_hierarchy() {
        let table = ShippingTable::bundled();
        let names: Vec<&str> = table.regions().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            ["United States", "The Americas", "Europe", "Asia", "Africa", "Oceania"]
        );

        let oceania = &table.regions()[5];
        assert_eq!(oceania.subregions[0].countries.len(), 4);
        assert_eq!(
            table.lookup("Fiji").map(|r| r.cost),
            Some(Money::from_dollars(70))
        );
    }

    #[test]
    fn test_duplicate_country_rejected() {
        let country = CountryData {
            name: "Chile".to_string(),
            time: "9–13 days".to_string(),
            cost: Money::from_dollars(45),
        };
        let regions = vec![Region {
            name: "The Americas".to_string(),
            subregions: vec![SubRegion {
                name: "South America".to_string(),
                countries: vec![country.clone(), country],
            }],
        }];

        assert!(matches!(
            ShippingTable::from_regions(regions),
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }
}
