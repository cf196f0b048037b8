//! services/portal/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::session::SessionSigner;
use manager_portal_core::ports::{AssetStore, GraphQlGateway};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<dyn GraphQlGateway>,
    pub assets: Arc<dyn AssetStore>,
    pub sessions: SessionSigner,
}
