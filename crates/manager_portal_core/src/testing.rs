//! In-memory doubles for the ports, shared by unit and integration tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::graphql::Operation;
use crate::ports::{AssetStore, AssetUpload, GraphQlGateway, PortError, PortResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub variables: Value,
}

type Scripted = Box<dyn Fn(&Value) -> PortResult<Value> + Send + Sync>;

/// A gateway that answers from scripted responses and records every call.
///
/// One-shot responses queued with [`respond_once`](Self::respond_once) are
/// consumed first; after that the standing response from
/// [`respond`](Self::respond) or [`respond_with`](Self::respond_with) applies.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<RecordedCall>>,
    once: Mutex<HashMap<&'static str, VecDeque<PortResult<Value>>>>,
    standing: Mutex<HashMap<&'static str, Scripted>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, operation: &Operation, data: Value) -> &Self {
        self.respond_with(operation, move |_| Ok(data.clone()))
    }

    pub fn respond_with<F>(&self, operation: &Operation, f: F) -> &Self
    where
        F: Fn(&Value) -> PortResult<Value> + Send + Sync + 'static,
    {
        self.standing
            .lock()
            .unwrap()
            .insert(operation.name, Box::new(f));
        self
    }

    pub fn respond_once(&self, operation: &Operation, result: PortResult<Value>) -> &Self {
        self.once
            .lock()
            .unwrap()
            .entry(operation.name)
            .or_default()
            .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, operation: &Operation) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation.name)
            .map(|c| c.variables)
            .collect()
    }
}

#[async_trait]
impl GraphQlGateway for RecordingGateway {
    async fn execute(&self, operation: &Operation, variables: Value) -> PortResult<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            operation: operation.name,
            variables: variables.clone(),
        });

        if let Some(result) = self
            .once
            .lock()
            .unwrap()
            .get_mut(operation.name)
            .and_then(VecDeque::pop_front)
        {
            return result;
        }

        match self.standing.lock().unwrap().get(operation.name) {
            Some(f) => f(&variables),
            None => Err(PortError::Api(vec![format!(
                "no scripted response for {}",
                operation.name
            )])),
        }
    }
}

/// An asset store that hands out a fixed id, or fails, and counts uploads.
pub struct RecordingAssetStore {
    outcome: Result<String, String>,
    uploads: Mutex<Vec<(String, String)>>,
}

impl RecordingAssetStore {
    pub fn succeeding(asset_id: &str) -> Self {
        Self {
            outcome: Ok(asset_id.to_string()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// `(product_id, file_name)` for every upload attempted so far.
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for RecordingAssetStore {
    async fn store(&self, product_id: &str, upload: AssetUpload) -> PortResult<String> {
        self.uploads
            .lock()
            .unwrap()
            .push((product_id.to_string(), upload.file_name));
        self.outcome.clone().map_err(PortError::Upload)
    }
}
