//! crates/manager_portal_core/src/lib.rs
//!
//! Domain model, ports and page-level workflows of the business manager
//! portal. Nothing here knows about HTTP; adapters live in the service crate.

pub mod attachment;
pub mod commands;
pub mod domain;
pub mod form;
pub mod graphql;
pub mod guard;
pub mod moderation;
pub mod ports;
pub mod selection;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use domain::*;
pub use ports::{AssetStore, AssetUpload, GraphQlGateway, PortError, PortResult};
