//! Shared fixtures and entity client doubles for unit tests

use crate::describable;
use crate::edm::OEntity;
use crate::mapping::{AccessError, Binary, HostObject, HostValue, IntrospectionError};
use crate::odata::{EntityClient, EntityStream, ODataError, PendingOperation, QueryRequest};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Route library logs to the test harness; set `RUST_LOG` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Widget {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub tags: Vec<String>,
}

describable!(Widget { name, price, tags });

impl Widget {
    pub fn sample() -> Self {
        Self {
            name: Some("Widget".to_string()),
            price: Some(9.99),
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

describable!(Address { street, city });

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub address: Option<Address>,
    pub previous: Vec<Address>,
}

describable!(Customer { id, name, address, previous });

impl Customer {
    pub fn sample() -> Self {
        Self {
            id: 7,
            name: "Ada".to_string(),
            address: Some(Address {
                street: "Main 1".to_string(),
                city: "Ghent".to_string(),
            }),
            previous: vec![Address {
                street: "Old 2".to_string(),
                city: "Bruges".to_string(),
            }],
        }
    }
}

/// Every simple wire type the mapper round-trips
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sample {
    pub id: i64,
    pub label: String,
    pub flag: bool,
    pub ratio: f64,
    pub small: i16,
    pub tiny: u8,
    pub created: NaiveDateTime,
    pub guid: Uuid,
    pub blob: Binary,
}

describable!(Sample { id, label, flag, ratio, small, tiny, created, guid, blob });

/// Object graph that nests forever
#[derive(Debug, Clone)]
pub struct Chain;

impl HostObject for Chain {
    fn type_name(&self) -> &str {
        "Chain"
    }

    fn attribute_names(&self) -> Result<Vec<&str>, IntrospectionError> {
        Ok(vec!["next"])
    }

    fn read_attribute(&self, _name: &str) -> Result<HostValue, AccessError> {
        Ok(HostValue::Object(Box::new(Chain)))
    }

    fn clone_object(&self) -> Box<dyn HostObject> {
        Box::new(self.clone())
    }
}

/// Object whose only attribute cannot be read
#[derive(Debug, Clone)]
pub struct Faulty;

impl HostObject for Faulty {
    fn type_name(&self) -> &str {
        "Faulty"
    }

    fn attribute_names(&self) -> Result<Vec<&str>, IntrospectionError> {
        Ok(vec!["value"])
    }

    fn read_attribute(&self, _name: &str) -> Result<HostValue, AccessError> {
        Err(AccessError::custom("getter failed"))
    }

    fn clone_object(&self) -> Box<dyn HostObject> {
        Box::new(self.clone())
    }
}

/// Records every operation and answers queries from a fixed result list
#[derive(Debug, Default)]
pub struct RecordingClient {
    operations: Mutex<Vec<PendingOperation>>,
    queries: Mutex<Vec<QueryRequest>>,
    results: Vec<OEntity>,
    fail_after: Option<usize>,
}

impl RecordingClient {
    pub fn with_results(results: Vec<OEntity>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    /// Writes after the first `count` fail
    pub fn failing_after(count: usize) -> Self {
        Self {
            fail_after: Some(count),
            ..Self::default()
        }
    }

    pub fn operations(&self) -> Vec<PendingOperation> {
        self.operations.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<QueryRequest> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, operation: PendingOperation) -> Result<(), ODataError> {
        let mut operations = self.operations.lock().unwrap();
        operations.push(operation);
        match self.fail_after {
            Some(limit) if operations.len() > limit => {
                Err(ODataError::ServerError(500, "injected failure".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl EntityClient for RecordingClient {
    async fn create_entity(&self, operation: PendingOperation) -> Result<OEntity, ODataError> {
        let entity = OEntity {
            entity_set: Some(operation.entity_set().to_string()),
            type_name: None,
            properties: operation.property_list().to_vec(),
        };
        self.record(operation)?;
        Ok(entity)
    }

    async fn merge_entity(&self, operation: PendingOperation) -> Result<(), ODataError> {
        self.record(operation)
    }

    async fn delete_entity(&self, operation: PendingOperation) -> Result<(), ODataError> {
        self.record(operation)
    }

    fn query_entities(&self, request: QueryRequest) -> EntityStream<'_> {
        self.queries.lock().unwrap().push(request);
        stream::iter(self.results.clone().into_iter().map(Ok)).boxed()
    }
}

/// Fails every network operation
#[derive(Debug, Default)]
pub struct FailingClient;

#[async_trait]
impl EntityClient for FailingClient {
    async fn create_entity(&self, _operation: PendingOperation) -> Result<OEntity, ODataError> {
        Err(ODataError::Unsupported("network access in test".to_string()))
    }

    async fn merge_entity(&self, _operation: PendingOperation) -> Result<(), ODataError> {
        Err(ODataError::Unsupported("network access in test".to_string()))
    }

    async fn delete_entity(&self, _operation: PendingOperation) -> Result<(), ODataError> {
        Err(ODataError::Unsupported("network access in test".to_string()))
    }

    fn query_entities(&self, _request: QueryRequest) -> EntityStream<'_> {
        stream::once(async {
            Err(ODataError::Unsupported("network access in test".to_string()))
        })
        .boxed()
    }
}
