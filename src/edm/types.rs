//! Wire type descriptors

use std::fmt;

/// Primitive types understood by OData v2 services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmSimpleType {
    Binary,
    Boolean,
    Byte,
    DateTime,
    DateTimeOffset,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
}

impl EdmSimpleType {
    pub const ALL: [EdmSimpleType; 13] = [
        EdmSimpleType::Binary,
        EdmSimpleType::Boolean,
        EdmSimpleType::Byte,
        EdmSimpleType::DateTime,
        EdmSimpleType::DateTimeOffset,
        EdmSimpleType::Double,
        EdmSimpleType::Guid,
        EdmSimpleType::Int16,
        EdmSimpleType::Int32,
        EdmSimpleType::Int64,
        EdmSimpleType::SByte,
        EdmSimpleType::Single,
        EdmSimpleType::String,
    ];

    /// Fully qualified name, e.g. `Edm.String`
    pub fn full_name(&self) -> &'static str {
        match self {
            EdmSimpleType::Binary => "Edm.Binary",
            EdmSimpleType::Boolean => "Edm.Boolean",
            EdmSimpleType::Byte => "Edm.Byte",
            EdmSimpleType::DateTime => "Edm.DateTime",
            EdmSimpleType::DateTimeOffset => "Edm.DateTimeOffset",
            EdmSimpleType::Double => "Edm.Double",
            EdmSimpleType::Guid => "Edm.Guid",
            EdmSimpleType::Int16 => "Edm.Int16",
            EdmSimpleType::Int32 => "Edm.Int32",
            EdmSimpleType::Int64 => "Edm.Int64",
            EdmSimpleType::SByte => "Edm.SByte",
            EdmSimpleType::Single => "Edm.Single",
            EdmSimpleType::String => "Edm.String",
        }
    }

    pub fn from_full_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.full_name() == name)
    }
}

impl fmt::Display for EdmSimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

/// Complex type descriptor. Only the name is tracked; members travel with the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdmComplexType {
    name: String,
}

impl EdmComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Wire type of a property
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdmType {
    Simple(EdmSimpleType),
    Complex(EdmComplexType),
    /// Collection of the given item type
    Collection(Box<EdmType>),
}

impl EdmType {
    pub fn collection_of(item: EdmType) -> Self {
        EdmType::Collection(Box::new(item))
    }

    pub fn full_name(&self) -> String {
        match self {
            EdmType::Simple(simple) => simple.full_name().to_string(),
            EdmType::Complex(complex) => complex.name().to_string(),
            EdmType::Collection(item) => format!("Collection({})", item.full_name()),
        }
    }

    /// Parse a type name as it appears in `__metadata.type` or `m:type`.
    ///
    /// Names outside the `Edm` namespace are taken as complex type names.
    pub fn parse(name: &str) -> Self {
        if let Some(inner) = name
            .strip_prefix("Collection(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return EdmType::collection_of(EdmType::parse(inner));
        }

        match EdmSimpleType::from_full_name(name) {
            Some(simple) => EdmType::Simple(simple),
            None => EdmType::Complex(EdmComplexType::new(name)),
        }
    }
}

impl fmt::Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_names_round_trip() {
        for simple in EdmSimpleType::ALL {
            assert_eq!(EdmSimpleType::from_full_name(simple.full_name()), Some(simple));
        }
        assert_eq!(EdmSimpleType::from_full_name("Edm.Decimal"), None);
    }

    #[test]
    fn test_parse_collection_types() {
        assert_eq!(
            EdmType::parse("Collection(Edm.String)"),
            EdmType::collection_of(EdmType::Simple(EdmSimpleType::String))
        );
        assert_eq!(
            EdmType::parse("Collection(Address)").full_name(),
            "Collection(Address)"
        );
        assert_eq!(
            EdmType::parse("Model.Address"),
            EdmType::Complex(EdmComplexType::new("Model.Address"))
        );
    }
}
