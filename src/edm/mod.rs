//! Entity data model
//!
//! Wire-side representation of OData values: primitive values, typed
//! properties (simple, complex, collection) and entities.

pub mod property;
pub mod types;
pub mod value;

pub use property::{OEntity, OEntityKey, OObject, OProperty, OValue};
pub use types::{EdmComplexType, EdmSimpleType, EdmType};
pub use value::SimpleValue;
