//! Object-to-entity mapping engine
//!
//! Introspects host objects, classifies their attribute values and converts
//! them into typed wire properties (and back, for query results).

pub mod classify;
pub mod error;
pub mod host;
pub mod introspect;
mod macros;
pub mod mapper;

pub use classify::{classify, simple_wire_type, Classified, ComplexValue, ValueKind};
pub use error::{AccessError, IntrospectionError, MappingError};
pub use host::{Binary, FromHostValue, HostObject, HostRecord, HostValue, ToHostValue};
pub use introspect::{describe, Attribute, Describable, PropertyDescriptor};
pub use mapper::{populate, populate_record, PropertyMapper, DEFAULT_MAX_DEPTH};
