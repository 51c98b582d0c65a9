//! # Document Commands
//!
//! MSDS and CoA downloads behind the access-code prompt.
//!
//! ```text
//! request_document(KLOW, "CoA", code)
//!     ├── unknown SKU / kind ──► NOT_FOUND / VALIDATION_ERROR
//!     ├── wrong code ─────────► ACCESS_DENIED (retry freely)
//!     └── match ──────────────► toast "CoA Download Started"
//! ```

use serde::Serialize;
use tracing::{debug, info};

use biosynth_core::DocumentKind;

use crate::app::App;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub product_id: String,
    pub kind: DocumentKind,
    pub notification: String,
}

pub fn request_document(
    app: &mut App,
    product_id: &str,
    kind: &str,
    access_code: &str,
) -> ApiResult<DocumentResponse> {
    debug!(product_id = %product_id, kind = %kind, "request_document command");

    let catalog = app.catalog;
    let product = catalog.get(product_id)?;
    let kind = DocumentKind::parse(kind)
        .ok_or_else(|| ApiError::validation(format!("Unknown document type: {}", kind)))?;
    let kind = app.documents.verify(kind, access_code)?;

    info!(product_id = %product.id, kind = %kind, "Document unlocked");

    let notification = kind.download_message();
    app.toasts.notify(notification.clone());

    Ok(DocumentResponse {
        product_id: product.id.clone(),
        kind,
        notification,
    })
}
