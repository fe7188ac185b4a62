use crate::config::ConfigError;
use crate::mapping::{AccessError, IntrospectionError, MappingError};
use crate::odata::ODataError;
use thiserror::Error;

/// The identity of an entity could not be determined
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("key attribute {attribute} not found on type {type_name}")]
    Missing {
        attribute: String,
        type_name: String,
    },

    #[error("key attribute {attribute} on type {type_name} is null")]
    Null {
        attribute: String,
        type_name: String,
    },

    #[error("key attribute {attribute} on type {type_name} is not a simple value")]
    NotSimple {
        attribute: String,
        type_name: String,
    },

    #[error("could not read key attribute {attribute} on type {type_name}")]
    Unreadable {
        attribute: String,
        type_name: String,
        source: AccessError,
    },
}

/// Errors surfaced by connector operations
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Introspection(IntrospectionError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Mapping(MappingError),

    #[error(transparent)]
    Transport(#[from] ODataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConnectorError {
    pub fn argument(message: impl Into<String>) -> Self {
        ConnectorError::Argument(message.into())
    }
}

impl From<MappingError> for ConnectorError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::Introspection(inner) => ConnectorError::Introspection(inner),
            other => ConnectorError::Mapping(other),
        }
    }
}

impl From<IntrospectionError> for ConnectorError {
    fn from(err: IntrospectionError) -> Self {
        ConnectorError::Introspection(err)
    }
}
