//! Typed wire properties and entities

use super::types::{EdmComplexType, EdmType};
use super::value::SimpleValue;

/// A named, typed value ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct OProperty {
    name: String,
    value: OValue,
}

/// Value carried by an [`OProperty`]. There is no null case: absent values are
/// omitted from the wire instead.
#[derive(Debug, Clone, PartialEq)]
pub enum OValue {
    Simple(SimpleValue),
    Complex {
        edm_type: EdmComplexType,
        properties: Vec<OProperty>,
    },
    Collection {
        item_type: EdmType,
        items: Vec<OObject>,
    },
}

/// Element of a collection value
#[derive(Debug, Clone, PartialEq)]
pub enum OObject {
    Simple(SimpleValue),
    Complex {
        edm_type: EdmComplexType,
        properties: Vec<OProperty>,
    },
}

impl OProperty {
    pub fn new(name: impl Into<String>, value: OValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn simple(name: impl Into<String>, value: SimpleValue) -> Self {
        Self::new(name, OValue::Simple(value))
    }

    pub fn complex(
        name: impl Into<String>,
        edm_type: EdmComplexType,
        properties: Vec<OProperty>,
    ) -> Self {
        Self::new(
            name,
            OValue::Complex {
                edm_type,
                properties,
            },
        )
    }

    pub fn collection(name: impl Into<String>, item_type: EdmType, items: Vec<OObject>) -> Self {
        Self::new(name, OValue::Collection { item_type, items })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &OValue {
        &self.value
    }

    pub fn into_parts(self) -> (String, OValue) {
        (self.name, self.value)
    }

    /// Declared wire type of this property
    pub fn edm_type(&self) -> EdmType {
        match &self.value {
            OValue::Simple(simple) => EdmType::Simple(simple.edm_type()),
            OValue::Complex { edm_type, .. } => EdmType::Complex(edm_type.clone()),
            OValue::Collection { item_type, .. } => EdmType::collection_of(item_type.clone()),
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleValue> {
        match &self.value {
            OValue::Simple(simple) => Some(simple),
            _ => None,
        }
    }
}

/// An entity as returned by the service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OEntity {
    pub entity_set: Option<String>,
    pub type_name: Option<String>,
    pub properties: Vec<OProperty>,
}

impl OEntity {
    pub fn new(properties: Vec<OProperty>) -> Self {
        Self {
            properties,
            ..Default::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&OProperty> {
        self.properties.iter().find(|p| p.name() == name)
    }
}

/// Single-valued entity key
#[derive(Debug, Clone, PartialEq)]
pub struct OEntityKey(SimpleValue);

impl OEntityKey {
    pub fn new(value: SimpleValue) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &SimpleValue {
        &self.0
    }

    /// Key predicate appended to the entity set segment, e.g. `('42')`
    pub fn to_key_string(&self) -> String {
        format!("({})", self.0.to_key_literal())
    }
}
