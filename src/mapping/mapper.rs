//! Property mapper
//!
//! Converts host object graphs into typed wire properties and back.
//!
//! Forward direction, per readable+writable attribute:
//! - null values are omitted, so the payload never carries explicit nulls
//! - simple values become simple properties
//! - complex values are mapped recursively; the complex type is named after
//!   the translated attribute name
//! - collections take their item type from the first non-null element; empty
//!   collections are omitted, all-null collections are an error
//!
//! Every wire name must map back to the attribute it came from, so two
//! attributes can never share a wire property.
//!
//! The inverse direction translates each wire name back to a host name and
//! writes it through the matching attribute writer. Wire properties without a
//! matching attribute are skipped.

use super::classify::{classify, kind, Classified, ComplexValue, ValueKind};
use super::error::{AccessError, IntrospectionError, MappingError};
use super::host::{HostObject, HostRecord, HostValue};
use super::introspect::{describe, Describable};
use crate::edm::{EdmComplexType, EdmType, OObject, OProperty, OValue};
use crate::naming::{is_valid_identifier, NamingPolicy};

/// Default recursion limit for object graphs
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Maps object graphs to wire properties under a naming policy
#[derive(Clone, Copy)]
pub struct PropertyMapper<'a> {
    naming: &'a dyn NamingPolicy,
    max_depth: usize,
}

impl<'a> PropertyMapper<'a> {
    pub fn new(naming: &'a dyn NamingPolicy) -> Self {
        Self {
            naming,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Guard against cyclic object graphs. A graph nested deeper than
    /// `max_depth` fails with [`MappingError::DepthExceeded`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Map an object's attributes to wire properties
    pub fn map_to_wire(&self, object: &dyn HostObject) -> Result<Vec<OProperty>, MappingError> {
        self.map_object(object, 0)
    }

    /// Build a `T` from wire properties
    pub fn map_from_wire<T: Describable>(
        &self,
        properties: Vec<OProperty>,
    ) -> Result<T, MappingError> {
        let record = self.to_host_record(T::TYPE_NAME, properties, 0)?;
        populate_record(record)
    }

    fn check_depth(&self, depth: usize) -> Result<(), MappingError> {
        if depth > self.max_depth {
            return Err(MappingError::DepthExceeded(self.max_depth));
        }
        Ok(())
    }

    fn map_object(
        &self,
        object: &dyn HostObject,
        depth: usize,
    ) -> Result<Vec<OProperty>, MappingError> {
        self.check_depth(depth)?;

        let type_name = object.type_name();
        let attributes = object.attribute_names()?;
        let mut result = Vec::with_capacity(attributes.len());

        for attribute in attributes {
            let value = object
                .read_attribute(attribute)
                .map_err(|source| MappingError::Read {
                    attribute: attribute.to_string(),
                    type_name: type_name.to_string(),
                    source,
                })?;

            if value.is_null() {
                tracing::trace!("Skipping null attribute {}.{}", type_name, attribute);
                continue;
            }

            let key = self.naming.to_wire(attribute);
            if !is_valid_identifier(&key) || !self.naming.round_trips(attribute) {
                return Err(MappingError::WireName {
                    attribute: attribute.to_string(),
                    type_name: type_name.to_string(),
                    wire_name: key,
                });
            }
            if let Some(value) = self.to_wire_value(&key, type_name, value, depth)? {
                result.push(OProperty::new(key, value));
            }
        }

        Ok(result)
    }

    fn to_wire_value(
        &self,
        key: &str,
        owner: &str,
        value: HostValue,
        depth: usize,
    ) -> Result<Option<OValue>, MappingError> {
        match classify(value) {
            Classified::Null => Ok(None),
            Classified::Simple(simple) => Ok(Some(OValue::Simple(simple))),
            Classified::Complex(complex) => {
                let properties = self.map_complex(complex, depth + 1)?;
                Ok(Some(OValue::Complex {
                    edm_type: EdmComplexType::new(key),
                    properties,
                }))
            }
            Classified::Collection(items) if items.is_empty() => {
                tracing::trace!("Skipping empty collection {}.{}", owner, key);
                Ok(None)
            }
            Classified::Collection(items) => self.map_collection(key, owner, items, depth),
        }
    }

    fn map_complex(
        &self,
        complex: ComplexValue,
        depth: usize,
    ) -> Result<Vec<OProperty>, MappingError> {
        match complex {
            ComplexValue::Object(object) => self.map_object(object.as_ref(), depth),
            ComplexValue::Record(record) => self.map_object(&record, depth),
            ComplexValue::Opaque(type_name) => Err(IntrospectionError::Opaque(type_name).into()),
        }
    }

    fn map_collection(
        &self,
        key: &str,
        owner: &str,
        items: Vec<HostValue>,
        depth: usize,
    ) -> Result<Option<OValue>, MappingError> {
        let nested = || MappingError::NestedCollection {
            attribute: key.to_string(),
            type_name: owner.to_string(),
        };

        let representative = items.iter().map(kind).find(|k| *k != ValueKind::Null);
        let item_type = match representative {
            Some(ValueKind::Simple(simple)) => EdmType::Simple(simple),
            Some(ValueKind::Complex) => EdmType::Complex(EdmComplexType::new(key)),
            Some(ValueKind::Collection) => return Err(nested()),
            Some(ValueKind::Null) | None => {
                return Err(MappingError::NoRepresentativeElement {
                    attribute: key.to_string(),
                    type_name: owner.to_string(),
                })
            }
        };

        let mut objects = Vec::with_capacity(items.len());
        for item in items {
            match classify(item) {
                Classified::Null => continue,
                Classified::Simple(simple) => objects.push(OObject::Simple(simple)),
                Classified::Complex(complex) => objects.push(OObject::Complex {
                    edm_type: EdmComplexType::new(key),
                    properties: self.map_complex(complex, depth + 1)?,
                }),
                Classified::Collection(_) => return Err(nested()),
            }
        }

        Ok(Some(OValue::Collection {
            item_type,
            items: objects,
        }))
    }

    fn to_host_record(
        &self,
        type_name: &str,
        properties: Vec<OProperty>,
        depth: usize,
    ) -> Result<HostRecord, MappingError> {
        self.check_depth(depth)?;

        let mut record = HostRecord::new(type_name);
        for property in properties {
            let (name, value) = property.into_parts();
            record.push(self.naming.to_host(&name), self.to_host_value(value, depth)?);
        }
        Ok(record)
    }

    fn to_host_value(&self, value: OValue, depth: usize) -> Result<HostValue, MappingError> {
        match value {
            OValue::Simple(simple) => Ok(HostValue::Simple(simple)),
            OValue::Complex {
                edm_type,
                properties,
            } => self
                .to_host_record(edm_type.name(), properties, depth + 1)
                .map(HostValue::Record),
            OValue::Collection { items, .. } => items
                .into_iter()
                .map(|item| match item {
                    OObject::Simple(simple) => Ok(HostValue::Simple(simple)),
                    OObject::Complex {
                        edm_type,
                        properties,
                    } => self
                        .to_host_record(edm_type.name(), properties, depth + 1)
                        .map(HostValue::Record),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(HostValue::Collection),
        }
    }
}

/// Populate a fresh `T` from a record whose names are already in host naming.
///
/// Null values leave the attribute at its default. Names with no writable
/// attribute on `T` are skipped.
pub fn populate_record<T: Describable>(record: HostRecord) -> Result<T, MappingError> {
    let descriptors = describe::<T>()?;
    let mut target = T::default();

    for (name, value) in record.into_fields() {
        if value.is_null() {
            continue;
        }

        let Some(descriptor) = descriptors.iter().find(|d| d.name() == name) else {
            tracing::debug!("No writable attribute {} on {}, skipping", name, T::TYPE_NAME);
            continue;
        };

        descriptor
            .write(&mut target, value)
            .map_err(|source| MappingError::Write {
                attribute: name,
                type_name: T::TYPE_NAME.to_string(),
                source,
            })?;
    }

    Ok(target)
}

/// Rebuild a nested `T` from an inbound complex value
pub fn populate<T: Describable>(value: HostValue) -> Result<T, AccessError> {
    match value {
        HostValue::Record(record) => populate_record(record).map_err(AccessError::from),
        HostValue::Object(object) => {
            // Reuse the attribute values of an already-built object
            let mut record = HostRecord::new(object.type_name());
            for name in object.attribute_names().map_err(MappingError::from)? {
                record.push(name, object.read_attribute(name)?);
            }
            populate_record(record).map_err(AccessError::from)
        }
        other => Err(AccessError::mismatch(T::TYPE_NAME, &other)),
    }
}
