pub mod graphql;
pub mod storage;

pub use graphql::HttpGraphQlGateway;
pub use storage::LocalAssetStore;
