//! # Storefront Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BIOSYNTH_CONTACT_PHONE=5522998004156                               │
//! │     BIOSYNTH_SUBMISSION_DELAY_MS=0                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/requisition/storefront.toml (Linux)                      │
//! │     or the path given with --config                                    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! contact_phone = "5522998004156"
//! free_shipping_threshold_cents = 30000
//! shipping_warning_threshold_cents = 5000
//! max_quantity_per_item = 50
//! submission_delay_ms = 1500
//!
//! [[volume_tiers]]
//! min_qty = 10
//! rate = 1000        # basis points
//! label = "10% off"
//!
//! [[coupons]]
//! code = "RESEARCH10"
//! rate = 1000
//! label = "10% Research Discount"
//! ```
//!
//! Read-only after startup, so no lock is needed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use biosynth_core::pricing::{default_coupons, default_volume_tiers};
use biosynth_core::validation::validate_contact_phone;
use biosynth_core::{
    Coupon, DiscountRate, DocumentGate, Money, PricingEngine, ValidationError, VolumeTier,
    DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_MAX_QUANTITY_PER_ITEM,
    DEFAULT_SHIPPING_WARNING_THRESHOLD,
};

/// Sales contact that receives requisitions.
pub const DEFAULT_CONTACT_PHONE: &str = "5522998004156";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

// =============================================================================
// Config
// =============================================================================

/// Storefront configuration.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Digits-only phone number used in the hand-off link.
    pub contact_phone: String,

    pub free_shipping_threshold_cents: i64,

    /// Checkout shows the shipping warning when the shopper is this close
    /// (or closer) to free shipping.
    pub shipping_warning_threshold_cents: i64,

    pub toast_duration_ms: u64,

    /// Exit transition length after `toast_duration_ms`.
    pub toast_exit_ms: u64,

    pub max_quantity_per_item: u32,

    pub volume_tiers: Vec<VolumeTier>,

    pub coupons: Vec<Coupon>,

    /// Delay between an accepted submission and the hand-off.
    pub submission_delay_ms: u64,

    /// MSDS/CoA download code. Unset means every request is refused.
    pub document_access_code: Option<String>,

    /// Client storage location. Unset means the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            contact_phone: DEFAULT_CONTACT_PHONE.to_string(),
            free_shipping_threshold_cents: DEFAULT_FREE_SHIPPING_THRESHOLD.cents(),
            shipping_warning_threshold_cents: DEFAULT_SHIPPING_WARNING_THRESHOLD.cents(),
            toast_duration_ms: 4000,
            toast_exit_ms: 500,
            max_quantity_per_item: DEFAULT_MAX_QUANTITY_PER_ITEM,
            volume_tiers: default_volume_tiers(),
            coupons: default_coupons(),
            submission_delay_ms: 1500,
            document_access_code: None,
            database_path: None,
        }
    }
}

impl StorefrontConfig {
    /// Loads defaults, then the TOML file (if any), then the environment,
    /// then validates.
    ///
    /// An explicit `config_path` must exist; the default location is
    /// optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.normalize();
        config.validate()?;

        info!(
            max_quantity = config.max_quantity_per_item,
            tiers = config.volume_tiers.len(),
            coupons = config.coupons.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults on any error.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML file on top of the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading storefront config from file");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `BIOSYNTH_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Unparseable numbers are ignored
    /// with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(phone) = lookup("BIOSYNTH_CONTACT_PHONE") {
            debug!("Overriding contact phone from environment");
            self.contact_phone = phone;
        }

        override_number(&lookup, "BIOSYNTH_FREE_SHIPPING_THRESHOLD", &mut self.free_shipping_threshold_cents);
        override_number(&lookup, "BIOSYNTH_SHIPPING_WARNING_THRESHOLD", &mut self.shipping_warning_threshold_cents);
        override_number(&lookup, "BIOSYNTH_MAX_QUANTITY", &mut self.max_quantity_per_item);
        override_number(&lookup, "BIOSYNTH_SUBMISSION_DELAY_MS", &mut self.submission_delay_ms);

        if let Some(code) = lookup("BIOSYNTH_DOCUMENT_ACCESS_CODE") {
            self.document_access_code = Some(code);
        }
    }

    /// Sorts tiers by `min_qty` descending and upper-cases coupon codes.
    pub fn normalize(&mut self) {
        self.volume_tiers.sort_by(|a, b| b.min_qty.cmp(&a.min_qty));
        for coupon in &mut self.coupons {
            coupon.code = coupon.code.trim().to_uppercase();
        }
        self.contact_phone = self.contact_phone.trim().to_string();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_contact_phone(&self.contact_phone)?;

        if self.max_quantity_per_item == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_quantity_per_item".to_string(),
            });
        }

        for (field, cents) in [
            ("free_shipping_threshold_cents", self.free_shipping_threshold_cents),
            ("shipping_warning_threshold_cents", self.shipping_warning_threshold_cents),
        ] {
            if cents < 0 {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }

        for tier in &self.volume_tiers {
            if tier.min_qty == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "volume tier min_qty".to_string(),
                });
            }
            check_rate("volume tier rate", tier.rate)?;
        }
        for coupon in &self.coupons {
            check_rate("coupon rate", coupon.rate)?;
        }

        // duplicate and empty codes
        self.pricing_engine().map(|_| ())
    }

    /// Builds the pricing rules this config describes.
    pub fn pricing_engine(&self) -> Result<PricingEngine, ValidationError> {
        PricingEngine::new(
            self.volume_tiers.clone(),
            self.coupons.clone(),
            self.free_shipping_threshold(),
        )
    }

    pub fn document_gate(&self) -> DocumentGate {
        DocumentGate::new(self.document_access_code.clone())
    }

    pub fn free_shipping_threshold(&self) -> Money {
        Money::from_cents(self.free_shipping_threshold_cents)
    }

    pub fn shipping_warning_threshold(&self) -> Money {
        Money::from_cents(self.shipping_warning_threshold_cents)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn toast_exit(&self) -> Duration {
        Duration::from_millis(self.toast_exit_ms)
    }

    pub fn submission_delay(&self) -> Duration {
        Duration::from_millis(self.submission_delay_ms)
    }

    /// Platform config location, e.g. `~/.config/requisition/storefront.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "biosynth", "requisition")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

fn override_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => {
                debug!(key, "Overriding from environment");
                *target = value;
            }
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable environment override"),
        }
    }
}

fn check_rate(field: &str, rate: DiscountRate) -> Result<(), ValidationError> {
    DiscountRate::try_from_bps(rate.bps())
        .map(|_| ())
        .map_err(|_| ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(DiscountRate::MAX_BPS),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = StorefrontConfig::default();
        config.validate().unwrap();

        assert_eq!(config.free_shipping_threshold(), Money::from_dollars(300));
        assert_eq!(config.shipping_warning_threshold(), Money::from_dollars(50));
        assert_eq!(config.toast_duration(), Duration::from_secs(4));
        assert_eq!(config.submission_delay(), Duration::from_millis(1500));
        assert!(!config.document_gate().is_configured());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut config = StorefrontConfig::from_toml(
            r#"
            max_quantity_per_item = 10

            [[volume_tiers]]
            min_qty = 3
            rate = 300
            label = "3% off"

            [[volume_tiers]]
            min_qty = 20
            rate = 2000
            label = "20% off"
            "#,
        )
        .unwrap();
        config.normalize();

        assert_eq!(config.max_quantity_per_item, 10);
        assert_eq!(config.contact_phone, DEFAULT_CONTACT_PHONE);
        assert_eq!(config.volume_tiers[0].min_qty, 20);
        assert_eq!(config.coupons.len(), 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BIOSYNTH_CONTACT_PHONE", "15551234567"),
            ("BIOSYNTH_MAX_QUANTITY", "12"),
            ("BIOSYNTH_SUBMISSION_DELAY_MS", "soon"),
            ("BIOSYNTH_DOCUMENT_ACCESS_CODE", "LAB-42"),
        ]
        .into_iter()
        .collect();

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.contact_phone, "15551234567");
        assert_eq!(config.max_quantity_per_item, 12);
        assert_eq!(config.submission_delay_ms, 1500);
        assert!(config.document_gate().is_configured());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = StorefrontConfig::default();
        config.contact_phone = "+55 22".to_string();
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.max_quantity_per_item = 0;
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.coupons.push(Coupon::new("research10", DiscountRate::from_bps(100), "dup"));
        config.normalize();
        assert!(config.validate().is_err());

        let config = StorefrontConfig::from_toml(
            r#"
            [[coupons]]
            code = "ALL"
            rate = 20000
            label = "too much"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_falls_back() {
        let config =
            StorefrontConfig::load_or_default(Some(Path::new("/nonexistent/storefront.toml")));
        assert_eq!(config.max_quantity_per_item, DEFAULT_MAX_QUANTITY_PER_ITEM);
    }
}
