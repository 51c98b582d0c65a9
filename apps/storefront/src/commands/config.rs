//! Public configuration for the front-end.
//!
//! The document access code and the storage path are never included.

use serde::Serialize;

use biosynth_core::{Money, VolumeTier};

use crate::app::App;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub contact_phone: String,
    pub free_shipping_threshold: Money,
    pub shipping_warning_threshold: Money,
    pub max_quantity_per_item: u32,
    pub volume_tiers: Vec<VolumeTier>,
    pub toast_duration_ms: u64,
    pub documents_available: bool,
    pub persistent: bool,
}

pub fn get_config(app: &App) -> ConfigView {
    let config = &app.config;
    ConfigView {
        contact_phone: config.contact_phone.clone(),
        free_shipping_threshold: config.free_shipping_threshold(),
        shipping_warning_threshold: config.shipping_warning_threshold(),
        max_quantity_per_item: config.max_quantity_per_item,
        volume_tiers: app.pricing.volume_tiers().to_vec(),
        toast_duration_ms: config.toast_duration_ms,
        documents_available: app.documents.is_configured(),
        persistent: app.is_persistent(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StorefrontConfig;

    #[tokio::test]
    async fn test_view_hides_access_code() {
        let config = StorefrontConfig {
            document_access_code: Some("Lab-2024!".to_string()),
            ..Default::default()
        };
        let app = App::in_memory(config).unwrap();
        let view = get_config(&app);

        assert!(view.documents_available);
        assert!(!view.persistent);
        assert_eq!(view.free_shipping_threshold, Money::from_dollars(300));
        assert_eq!(view.volume_tiers[0].min_qty, 10);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("Lab-2024!"));
    }
}
