//! Value classification
//!
//! Decides which wire shape a host value takes. Rules apply in order:
//! GUIDs first, then the registered primitives, then multi-valued containers;
//! everything else is complex.

use super::host::{HostObject, HostRecord, HostValue};
use crate::edm::{EdmSimpleType, SimpleValue};

/// Wire shape of a value, without taking ownership of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Simple(EdmSimpleType),
    Complex,
    Collection,
}

/// Non-collection structured value
#[derive(Debug)]
pub enum ComplexValue {
    Object(Box<dyn HostObject>),
    Record(HostRecord),
    Opaque(String),
}

/// A host value split by wire shape
#[derive(Debug)]
pub enum Classified {
    Null,
    Simple(SimpleValue),
    Complex(ComplexValue),
    Collection(Vec<HostValue>),
}

pub fn kind(value: &HostValue) -> ValueKind {
    match value {
        HostValue::Null => ValueKind::Null,
        HostValue::Simple(SimpleValue::Guid(_)) => ValueKind::Simple(EdmSimpleType::Guid),
        HostValue::Simple(simple) => ValueKind::Simple(simple.edm_type()),
        HostValue::Collection(_) => ValueKind::Collection,
        HostValue::Object(_) | HostValue::Record(_) | HostValue::Opaque(_) => ValueKind::Complex,
    }
}

pub fn classify(value: HostValue) -> Classified {
    match value {
        HostValue::Null => Classified::Null,
        HostValue::Simple(simple) => Classified::Simple(simple),
        HostValue::Collection(items) => Classified::Collection(items),
        HostValue::Object(object) => Classified::Complex(ComplexValue::Object(object)),
        HostValue::Record(record) => Classified::Complex(ComplexValue::Record(record)),
        HostValue::Opaque(type_name) => Classified::Complex(ComplexValue::Opaque(type_name)),
    }
}

/// Wire type for a value in the registered primitive set.
///
/// `None` tells the caller to treat the value as complex (or as a collection);
/// it never fails.
pub fn simple_wire_type(value: &HostValue) -> Option<EdmSimpleType> {
    match kind(value) {
        ValueKind::Simple(simple) => Some(simple),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::host::{Binary, ToHostValue};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_guid_is_simple() {
        let value = Uuid::nil().to_host_value();
        assert_eq!(kind(&value), ValueKind::Simple(EdmSimpleType::Guid));
    }

    #[test]
    fn test_primitives_are_simple() {
        let cases = [
            ("x".to_host_value(), EdmSimpleType::String),
            (5i16.to_host_value(), EdmSimpleType::Int16),
            (5i32.to_host_value(), EdmSimpleType::Int32),
            (5i64.to_host_value(), EdmSimpleType::Int64),
            (5u8.to_host_value(), EdmSimpleType::Byte),
            (1.5f32.to_host_value(), EdmSimpleType::Single),
            (1.5f64.to_host_value(), EdmSimpleType::Double),
            (true.to_host_value(), EdmSimpleType::Boolean),
            (Binary(vec![1]).to_host_value(), EdmSimpleType::Binary),
            (
                NaiveDate::from_ymd_opt(2020, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    .to_host_value(),
                EdmSimpleType::DateTime,
            ),
        ];
        for (value, expected) in cases {
            assert_eq!(simple_wire_type(&value), Some(expected));
        }
    }

    #[test]
    fn test_containers_are_collections() {
        assert_eq!(kind(&vec!["a", "b"].to_host_value()), ValueKind::Collection);
        assert_eq!(simple_wire_type(&vec![1, 2].to_host_value()), None);
    }

    #[test]
    fn test_everything_else_is_complex() {
        let record = HostRecord::new("Address").to_host_value();
        assert_eq!(kind(&record), ValueKind::Complex);
        assert_eq!(simple_wire_type(&record), None);
        assert_eq!(kind(&HostValue::opaque::<std::fs::File>()), ValueKind::Complex);
        assert!(matches!(
            classify(HostValue::opaque::<std::fs::File>()),
            Classified::Complex(ComplexValue::Opaque(_))
        ));
    }
}
