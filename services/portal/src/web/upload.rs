//! services/portal/src/web/upload.rs
//!
//! The upload endpoint (phase one of an image attachment on its own) and the
//! multipart reader shared with the product image routes.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use manager_portal_core::domain::SessionUser;
use manager_portal_core::ports::AssetUpload;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::products::owned_product;
use crate::web::rest::{bad_request, fail, ErrorBody, HandlerResult};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub id: String,
}

/// The parts of an image upload form.
#[derive(Default)]
pub(crate) struct UploadForm {
    pub product_id: Option<String>,
    pub file: Option<AssetUpload>,
}

/// Reads a `file` part and an optional `productId` text part.
pub(crate) async fn read_upload_form(mut multipart: Multipart) -> HandlerResult<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {:?}", e);
        bad_request(format!("Failed to read multipart data: {e}"))
    })? {
        match field.name() {
            Some("productId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read productId: {e}")))?;
                form.product_id = Some(text);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    error!("Failed to read file bytes: {:?}", e);
                    bad_request(format!("Failed to read file bytes: {e}"))
                })?;
                form.file = Some(AssetUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }
    Ok(form)
}

pub(crate) fn require_file(form: &mut UploadForm) -> HandlerResult<AssetUpload> {
    form.file
        .take()
        .filter(|file| !file.bytes.is_empty())
        .ok_or_else(|| bad_request("Multipart form must include a non-empty file"))
}

/// POST /api/upload - Store an image and register it against a product
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "`file` and `productId` parts."),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or productId", body = ErrorBody),
        (status = 404, description = "Not one of the manager's products", body = ErrorBody),
        (status = 502, description = "Storage or backend failure", body = ErrorBody)
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    multipart: Multipart,
) -> HandlerResult<impl IntoResponse> {
    let mut form = read_upload_form(multipart).await?;
    let file = require_file(&mut form)?;
    let product_id = form
        .product_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| bad_request("productId is required"))?;
    let product_id = product_id.trim();
    owned_product(state.gateway.as_ref(), &user.id, product_id)
        .await
        .map_err(|e| fail("load product", e))?;

    let id = state
        .assets
        .store(product_id, file)
        .await
        .map_err(|e| fail("store upload", e))?;
    Ok((StatusCode::CREATED, Json(UploadResponse { id })))
}
