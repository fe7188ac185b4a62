//! OData Connector Library
//!
//! Maps plain host objects to OData v2 entities and back, and performs
//! create, update, delete, query and batch-rendering operations through a
//! pluggable entity client.

pub mod config;
pub mod connector;
pub mod edm;
pub mod mapping;
pub mod naming;
pub mod odata;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, ConfigError, RuntimeConfig};
pub use connector::{ConnectorError, KeyError, ODataConnector};
pub use edm::{OEntity, OEntityKey, OProperty, SimpleValue};
pub use mapping::{Describable, HostObject, HostRecord, HostValue, MappingError, PropertyMapper};
pub use naming::{NamingFormat, NamingPolicy};
pub use odata::{EntityClient, FormatType, HttpEntityClient, ODataError, ODataVersion, QueryOptions};
