//! crates/manager_portal_core/src/attachment.rs
//!
//! Two-phase image attachment: the binary goes to the asset store first, then
//! a GraphQL mutation links the returned asset id to its product. A failed
//! link is not rolled back; the stored asset stays orphaned and the error
//! carries its id so it can be cleaned up on the backend.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::graphql::{self, documents};
use crate::ports::{AssetStore, AssetUpload, GraphQlGateway, PortError, PortResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedAsset {
    pub asset_id: String,
    pub product_id: String,
}

/// Uploads `upload` and links it to `product_id`.
///
/// The product must already exist: without an id nothing is uploaded.
pub async fn attach_product_image(
    gateway: &dyn GraphQlGateway,
    assets: &dyn AssetStore,
    product_id: Option<&str>,
    upload: AssetUpload,
) -> PortResult<AttachedAsset> {
    let product_id = product_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            PortError::Validation("save the product before uploading images".to_string())
        })?;

    let file_name = upload.file_name.clone();
    let asset_id = assets.store(product_id, upload).await.map_err(|e| match e {
        PortError::Upload(reason) => PortError::Upload(reason),
        other => PortError::Upload(other.to_string()),
    })?;
    info!(product_id, asset_id = %asset_id, file_name = %file_name, "asset stored");

    let variables = json!({
        "where": { "id": product_id },
        "data": { "images": { "connect": [ { "id": asset_id } ] } }
    });
    if let Err(e) = graphql::send(gateway, &documents::LINK_PRODUCT_IMAGE, variables).await {
        warn!(product_id, asset_id = %asset_id, "stored asset could not be linked and is orphaned: {e}");
        return Err(PortError::Link {
            asset_id,
            reason: e.to_string(),
        });
    }

    Ok(AttachedAsset {
        asset_id,
        product_id: product_id.to_string(),
    })
}
