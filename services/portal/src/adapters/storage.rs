//! services/portal/src/adapters/storage.rs
//!
//! Local-disk implementation of the `AssetStore` port.
//!
//! The binary is written under the configured upload directory and then
//! registered with the backend through a GraphQL multipart request
//! (`operations`, `map` and a file part named `0`). The id the backend
//! assigns to the new image is the asset id handed back to the caller.

use async_trait::async_trait;
use manager_portal_core::graphql::{documents, Envelope};
use manager_portal_core::ports::{AssetStore, AssetUpload, PortError, PortResult};
use reqwest::multipart::{Form, Part};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

const APOLLO_OPERATION_HEADER: &str = "x-apollo-operation-name";

#[derive(Clone)]
pub struct LocalAssetStore {
    client: reqwest::Client,
    endpoint: String,
    upload_dir: PathBuf,
    api_token: Option<String>,
}

impl LocalAssetStore {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        upload_dir: impl Into<PathBuf>,
        api_token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            upload_dir: upload_dir.into(),
            api_token,
        }
    }

    async fn persist(&self, upload: &AssetUpload) -> PortResult<PathBuf> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| PortError::Upload(format!("creating upload directory: {e}")))?;
        let path = self
            .upload_dir
            .join(format!("{}-{}", Uuid::new_v4(), safe_file_name(&upload.file_name)));
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| PortError::Upload(format!("writing {}: {e}", path.display())))?;
        debug!(path = %path.display(), bytes = upload.bytes.len(), "upload written to disk");
        Ok(path)
    }

    async fn register(&self, product_id: &str, upload: AssetUpload) -> PortResult<String> {
        let operations = json!({
            "query": documents::CREATE_IMAGE.document,
            "variables": { "file": null, "productId": product_id }
        });
        let map = json!({ "0": ["variables.file"] });

        let mut part = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone());
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| PortError::Upload(format!("content type {content_type}: {e}")))?;
        }
        let form = Form::new()
            .text("operations", operations.to_string())
            .text("map", map.to_string())
            .part("0", part);

        let mut req = self
            .client
            .post(&self.endpoint)
            .header(APOLLO_OPERATION_HEADER, documents::CREATE_IMAGE.name)
            .multipart(form);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PortError::Upload(format!("create image: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PortError::Upload(format!("create image: HTTP {status}: {body}")));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PortError::Upload(format!("create image: reading body: {e}")))?;
        let data = Envelope::from_slice(&bytes)
            .and_then(Envelope::into_data)
            .map_err(|e| PortError::Upload(format!("create image: {e}")))?;

        data.pointer("/createImage/id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| PortError::Upload("create image: response carried no image id".to_string()))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, product_id: &str, upload: AssetUpload) -> PortResult<String> {
        let path = self.persist(&upload).await?;
        let asset_id = self.register(product_id, upload).await?;
        info!(product_id, asset_id = %asset_id, path = %path.display(), "asset stored");
        Ok(asset_id)
    }
}

/// Strips directories and anything outside `[A-Za-z0-9._-]` from a client file name.
fn safe_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
