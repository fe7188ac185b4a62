//! Object introspection
//!
//! A [`Describable`] type lists its attributes as reader/writer pairs.
//! [`describe`] keeps only the attributes exposing both: write-only attributes
//! cannot be round-tripped and read-only ones cannot be populated from a query.

use super::error::{AccessError, IntrospectionError};
use super::host::{HostObject, HostValue};
use crate::naming::is_valid_identifier;
use std::fmt;

pub type Reader<T> = fn(&T) -> Result<HostValue, AccessError>;
pub type Writer<T> = fn(&mut T, HostValue) -> Result<(), AccessError>;

/// A named attribute as declared by a type
pub struct Attribute<T> {
    name: &'static str,
    reader: Option<Reader<T>>,
    writer: Option<Writer<T>>,
}

impl<T> Attribute<T> {
    pub fn new(name: &'static str, reader: Reader<T>, writer: Writer<T>) -> Self {
        Self {
            name,
            reader: Some(reader),
            writer: Some(writer),
        }
    }

    pub fn read_only(name: &'static str, reader: Reader<T>) -> Self {
        Self {
            name,
            reader: Some(reader),
            writer: None,
        }
    }

    pub fn write_only(name: &'static str, writer: Writer<T>) -> Self {
        Self {
            name,
            reader: None,
            writer: Some(writer),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("readable", &self.reader.is_some())
            .field("writable", &self.writer.is_some())
            .finish()
    }
}

/// A readable and writable attribute
pub struct PropertyDescriptor<T> {
    name: &'static str,
    reader: Reader<T>,
    writer: Writer<T>,
}

impl<T> PropertyDescriptor<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn read(&self, object: &T) -> Result<HostValue, AccessError> {
        (self.reader)(object)
    }

    pub fn write(&self, object: &mut T, value: HostValue) -> Result<(), AccessError> {
        (self.writer)(object, value)
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyDescriptor").field(&self.name).finish()
    }
}

/// A host type whose attributes can be enumerated.
///
/// Usually implemented through [`describable!`](crate::describable).
/// `Default` supplies the fresh instance populated by the inverse mapping.
pub trait Describable: fmt::Debug + Default + Clone + Send + Sync + 'static {
    /// Simple type name, e.g. `Widget`
    const TYPE_NAME: &'static str;

    /// Declared attributes in declaration order
    fn attributes() -> Vec<Attribute<Self>>;
}

/// Readable and writable attributes of `T`, in declaration order
pub fn describe<T: Describable>() -> Result<Vec<PropertyDescriptor<T>>, IntrospectionError> {
    let attributes = T::attributes();
    let mut seen: Vec<&'static str> = Vec::with_capacity(attributes.len());
    let mut descriptors: Vec<PropertyDescriptor<T>> = Vec::with_capacity(attributes.len());

    for attribute in attributes {
        if !is_valid_identifier(attribute.name) {
            return Err(IntrospectionError::InvalidAttributeName {
                type_name: T::TYPE_NAME.to_string(),
                attribute: attribute.name.to_string(),
            });
        }
        if seen.contains(&attribute.name) {
            return Err(IntrospectionError::DuplicateAttribute {
                type_name: T::TYPE_NAME.to_string(),
                attribute: attribute.name.to_string(),
            });
        }
        seen.push(attribute.name);

        if let (Some(reader), Some(writer)) = (attribute.reader, attribute.writer) {
            descriptors.push(PropertyDescriptor {
                name: attribute.name,
                reader,
                writer,
            });
        }
    }

    Ok(descriptors)
}

impl<T: Describable> HostObject for T {
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn attribute_names(&self) -> Result<Vec<&str>, IntrospectionError> {
        Ok(describe::<T>()?.iter().map(|d| d.name()).collect())
    }

    fn read_attribute(&self, name: &str) -> Result<HostValue, AccessError> {
        let descriptors =
            describe::<T>().map_err(|err| AccessError::custom(err.to_string()))?;
        descriptors
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| AccessError::NoSuchAttribute(name.to_string()))?
            .read(self)
    }

    fn clone_object(&self) -> Box<dyn HostObject> {
        Box::new(self.clone())
    }
}
