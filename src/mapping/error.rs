//! Mapping errors

use super::host::HostValue;
use thiserror::Error;

/// Failure reading or writing a single attribute value
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("no attribute named {0}")]
    NoSuchAttribute(String),

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("value out of range for {0}")]
    OutOfRange(&'static str),

    #[error(transparent)]
    Nested(Box<MappingError>),

    #[error("{0}")]
    Custom(String),
}

impl AccessError {
    pub fn custom(message: impl Into<String>) -> Self {
        AccessError::Custom(message.into())
    }

    pub fn mismatch(expected: &'static str, found: &HostValue) -> Self {
        AccessError::TypeMismatch {
            expected,
            found: found.type_description(),
        }
    }
}

impl From<MappingError> for AccessError {
    fn from(err: MappingError) -> Self {
        AccessError::Nested(Box::new(err))
    }
}

/// The host type cannot be reflected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntrospectionError {
    #[error("type {0} cannot be reflected")]
    Opaque(String),

    #[error("type {type_name} declares attribute {attribute} more than once")]
    DuplicateAttribute {
        type_name: String,
        attribute: String,
    },

    #[error("type {type_name} declares attribute {attribute:?}, which is not a valid identifier")]
    InvalidAttributeName {
        type_name: String,
        attribute: String,
    },
}

/// Object graph could not be converted to or from wire properties
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("could not read attribute {attribute} on object of type {type_name}")]
    Read {
        attribute: String,
        type_name: String,
        source: AccessError,
    },

    #[error("could not write attribute {attribute} on object of type {type_name}")]
    Write {
        attribute: String,
        type_name: String,
        source: AccessError,
    },

    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    #[error("collection {attribute} on type {type_name} has no representative element to infer a type from")]
    NoRepresentativeElement {
        attribute: String,
        type_name: String,
    },

    #[error("collection {attribute} on type {type_name} contains a nested collection")]
    NestedCollection {
        attribute: String,
        type_name: String,
    },

    #[error("attribute {attribute} on type {type_name} translates to wire name {wire_name:?}, which does not map back")]
    WireName {
        attribute: String,
        type_name: String,
        wire_name: String,
    },

    #[error("object graph exceeds the maximum depth of {0}")]
    DepthExceeded(usize),
}
