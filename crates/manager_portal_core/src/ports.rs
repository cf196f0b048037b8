//! crates/manager_portal_core/src/ports.rs
//!
//! Defines the contracts for the remote collaborators the portal depends on.
//! The GraphQL backend and the asset storage service are both external; the
//! core only ever talks to them through these traits.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::graphql::Operation;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Every failure the portal can surface, whatever collaborator produced it.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The backend could not be reached at all.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The backend answered, but not with a usable GraphQL envelope.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// The backend answered with an `errors` array.
    #[error("API error: {}", .0.join("; "))]
    Api(Vec<String>),
    /// Client-side input was rejected before anything was sent.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Phase one of an asset attachment failed.
    #[error("Upload error: {0}")]
    Upload(String),
    /// Phase two of an asset attachment failed; the stored asset is orphaned.
    #[error("Link error: asset {asset_id} was stored but could not be linked: {reason}")]
    Link { asset_id: String, reason: String },
    #[error("Authorization error: {0}")]
    Authorization(String),
    #[error("Item not found: {0}")]
    NotFound(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The single entry point for every GraphQL query and mutation.
///
/// Implementations POST `{query, variables}` to the configured endpoint and
/// return the `data` member of a successful envelope. They never retry.
#[async_trait]
pub trait GraphQlGateway: Send + Sync {
    async fn execute(&self, operation: &Operation, variables: Value) -> PortResult<Value>;
}

/// A binary asset on its way to the storage service.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Phase one of the attachment handshake: persist the binary and hand back
/// the identifier the backend assigned to it.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn store(&self, product_id: &str, upload: AssetUpload) -> PortResult<String>;
}
