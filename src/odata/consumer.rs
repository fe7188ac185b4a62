//! Entity client capability
//!
//! The connector talks to a service only through [`EntityClient`]. Writes are
//! described by a [`PendingOperation`] first, so the same description can be
//! dispatched or rendered into a batch payload.

use super::error::ODataError;
use super::format::{render_payload, FormatType, ODataVersion};
use super::query::QueryRequest;
use crate::edm::{OEntity, OEntityKey, OProperty};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Kind of write a pending operation performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Merge,
    Delete,
}

/// An unsent create, merge or delete
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    kind: OperationKind,
    entity_set: String,
    key: Option<OEntityKey>,
    properties: Vec<OProperty>,
}

impl PendingOperation {
    pub fn create(entity_set: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Create,
            entity_set: entity_set.into(),
            key: None,
            properties: Vec::new(),
        }
    }

    pub fn merge(entity_set: impl Into<String>, key: OEntityKey) -> Self {
        Self {
            kind: OperationKind::Merge,
            entity_set: entity_set.into(),
            key: Some(key),
            properties: Vec::new(),
        }
    }

    pub fn delete(entity_set: impl Into<String>, key: OEntityKey) -> Self {
        Self {
            kind: OperationKind::Delete,
            entity_set: entity_set.into(),
            key: Some(key),
            properties: Vec::new(),
        }
    }

    /// Replace the properties carried by this operation
    pub fn properties(mut self, properties: Vec<OProperty>) -> Self {
        self.properties = properties;
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn entity_set(&self) -> &str {
        &self.entity_set
    }

    pub fn key(&self) -> Option<&OEntityKey> {
        self.key.as_ref()
    }

    pub fn property_list(&self) -> &[OProperty] {
        &self.properties
    }

    pub fn into_properties(self) -> Vec<OProperty> {
        self.properties
    }

    /// Resource path relative to the service root, e.g. `Widgets(42)`
    pub fn resource_path(&self) -> String {
        match &self.key {
            Some(key) => format!("{}{}", self.entity_set, key.to_key_string()),
            None => self.entity_set.clone(),
        }
    }
}

/// Lazily fetched query results
pub type EntityStream<'a> = BoxStream<'a, Result<OEntity, ODataError>>;

/// Client capability used by the connector
#[async_trait]
pub trait EntityClient: Send + Sync {
    /// Dispatch a create and return the entity as confirmed by the service
    async fn create_entity(&self, operation: PendingOperation) -> Result<OEntity, ODataError>;

    /// Dispatch a merge-style partial update
    async fn merge_entity(&self, operation: PendingOperation) -> Result<(), ODataError>;

    async fn delete_entity(&self, operation: PendingOperation) -> Result<(), ODataError>;

    /// Execute a query. Pages are fetched as the stream is consumed.
    fn query_entities(&self, request: QueryRequest) -> EntityStream<'_>;

    /// Serialize an operation without dispatching it
    fn render_payload(
        &self,
        operation: &PendingOperation,
        format: FormatType,
        version: ODataVersion,
    ) -> Result<String, ODataError> {
        render_payload(operation, format, version)
    }
}
