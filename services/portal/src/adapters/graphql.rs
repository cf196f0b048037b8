//! services/portal/src/adapters/graphql.rs
//!
//! The HTTP implementation of the `GraphQlGateway` port. Every operation is a
//! single POST of `{query, variables}` to the configured endpoint; nothing is
//! retried.

use async_trait::async_trait;
use manager_portal_core::graphql::{Envelope, GraphQlRequest, Operation};
use manager_portal_core::ports::{GraphQlGateway, PortError, PortResult};
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct HttpGraphQlGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGraphQlGateway {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl GraphQlGateway for HttpGraphQlGateway {
    async fn execute(&self, operation: &Operation, variables: Value) -> PortResult<Value> {
        let body = GraphQlRequest {
            query: operation.document,
            variables: &variables,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("{}: {e}", operation.name)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PortError::Protocol(format!(
                "{}: HTTP {status}: {body}",
                operation.name
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PortError::Transport(format!("{}: reading body: {e}", operation.name)))?;
        debug!(operation = operation.name, bytes = bytes.len(), "GraphQL response received");
        Envelope::from_slice(&bytes)?.into_data()
    }
}
