//! Host-side value model
//!
//! Attribute values read from host objects are lowered into [`HostValue`]
//! before classification. The [`ToHostValue`] and [`FromHostValue`] traits
//! connect plain Rust field types to that model; nested structs join through
//! the [`describable!`](crate::describable) macro.

use super::error::{AccessError, IntrospectionError};
use crate::edm::value::{parse_datetime, parse_datetime_offset};
use crate::edm::SimpleValue;
use crate::naming::is_valid_identifier;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// A value read from, or about to be written to, a host attribute
#[derive(Debug, Clone)]
pub enum HostValue {
    Null,
    Simple(SimpleValue),
    Collection(Vec<HostValue>),
    /// Nested object exposing its own attributes
    Object(Box<dyn HostObject>),
    /// Name/value pairs already in host naming, e.g. a complex value read off the wire
    Record(HostRecord),
    /// A value of a type that cannot be reflected
    Opaque(String),
}

impl HostValue {
    pub fn opaque<T: ?Sized>() -> Self {
        HostValue::Opaque(std::any::type_name::<T>().to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Short description used in diagnostics
    pub fn type_description(&self) -> String {
        match self {
            HostValue::Null => "null".to_string(),
            HostValue::Simple(simple) => simple.edm_type().full_name().to_string(),
            HostValue::Collection(_) => "collection".to_string(),
            HostValue::Object(object) => object.type_name().to_string(),
            HostValue::Record(record) => record.type_name().to_string(),
            HostValue::Opaque(type_name) => type_name.clone(),
        }
    }
}

impl From<SimpleValue> for HostValue {
    fn from(value: SimpleValue) -> Self {
        HostValue::Simple(value)
    }
}

/// Object-safe view of a host object with named attributes
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Simple type name, used to infer entity set names
    fn type_name(&self) -> &str;

    /// Attributes exposing both a reader and a writer, in declaration order
    fn attribute_names(&self) -> Result<Vec<&str>, IntrospectionError>;

    fn read_attribute(&self, name: &str) -> Result<HostValue, AccessError>;

    fn clone_object(&self) -> Box<dyn HostObject>;
}

impl Clone for Box<dyn HostObject> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

// Lets bulk operations take lists of mixed types
impl HostObject for Box<dyn HostObject> {
    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn attribute_names(&self) -> Result<Vec<&str>, IntrospectionError> {
        (**self).attribute_names()
    }

    fn read_attribute(&self, name: &str) -> Result<HostValue, AccessError> {
        (**self).read_attribute(name)
    }

    fn clone_object(&self) -> Box<dyn HostObject> {
        (**self).clone_object()
    }
}

/// Dynamically shaped object: an ordered list of named values
#[derive(Debug, Clone, Default)]
pub struct HostRecord {
    type_name: String,
    fields: Vec<(String, HostValue)>,
}

impl HostRecord {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl ToHostValue) -> Self {
        self.push(name, value.to_host_value());
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<HostValue>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, HostValue)] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<(String, HostValue)> {
        self.fields
    }
}

impl HostObject for HostRecord {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attribute_names(&self) -> Result<Vec<&str>, IntrospectionError> {
        let mut names: Vec<&str> = Vec::with_capacity(self.fields.len());
        for (name, _) in &self.fields {
            if !is_valid_identifier(name) {
                return Err(IntrospectionError::InvalidAttributeName {
                    type_name: self.type_name.clone(),
                    attribute: name.clone(),
                });
            }
            if names.contains(&name.as_str()) {
                return Err(IntrospectionError::DuplicateAttribute {
                    type_name: self.type_name.clone(),
                    attribute: name.clone(),
                });
            }
            names.push(name);
        }
        Ok(names)
    }

    fn read_attribute(&self, name: &str) -> Result<HostValue, AccessError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| AccessError::NoSuchAttribute(name.to_string()))
    }

    fn clone_object(&self) -> Box<dyn HostObject> {
        Box::new(self.clone())
    }
}

/// Byte blob mapped to `Edm.Binary`. A bare `Vec<u8>` maps to a collection of bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binary(pub Vec<u8>);

/// Lower a field value into the host value model
pub trait ToHostValue {
    fn to_host_value(&self) -> HostValue;
}

/// Rebuild a field value from the host value model
pub trait FromHostValue: Sized {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError>;
}

impl<T: ToHostValue + ?Sized> ToHostValue for &T {
    fn to_host_value(&self) -> HostValue {
        (**self).to_host_value()
    }
}

impl ToHostValue for HostValue {
    fn to_host_value(&self) -> HostValue {
        self.clone()
    }
}

impl ToHostValue for SimpleValue {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(self.clone())
    }
}

impl ToHostValue for str {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::String(self.to_string()))
    }
}

impl ToHostValue for String {
    fn to_host_value(&self) -> HostValue {
        self.as_str().to_host_value()
    }
}

impl FromHostValue for String {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        match value {
            HostValue::Simple(SimpleValue::String(s)) => Ok(s),
            other => Err(AccessError::mismatch("String", &other)),
        }
    }
}

macro_rules! integer_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl ToHostValue for $ty {
            fn to_host_value(&self) -> HostValue {
                HostValue::Simple(SimpleValue::$variant(*self))
            }
        }

        impl FromHostValue for $ty {
            fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
                // v2 JSON carries Edm.Int64 as a string
                let wide = match &value {
                    HostValue::Simple(SimpleValue::String(s)) => s.trim().parse::<i64>().ok(),
                    HostValue::Simple(simple) => simple.as_i64(),
                    _ => None,
                };
                let wide = wide.ok_or_else(|| AccessError::mismatch(stringify!($ty), &value))?;
                <$ty>::try_from(wide).map_err(|_| AccessError::OutOfRange(stringify!($ty)))
            }
        }
    )*};
}

integer_value!(u8 => Byte, i8 => SByte, i16 => Int16, i32 => Int32, i64 => Int64);

fn float_of(value: &HostValue) -> Option<f64> {
    match value {
        HostValue::Simple(SimpleValue::String(s)) => s.trim().parse().ok(),
        HostValue::Simple(simple) => simple.as_f64(),
        _ => None,
    }
}

impl ToHostValue for f64 {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::Double(*self))
    }
}

impl FromHostValue for f64 {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        float_of(&value).ok_or_else(|| AccessError::mismatch("f64", &value))
    }
}

impl ToHostValue for f32 {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::Single(*self))
    }
}

impl FromHostValue for f32 {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        match value {
            HostValue::Simple(SimpleValue::Single(v)) => Ok(v),
            other => float_of(&other)
                .map(|v| v as f32)
                .ok_or_else(|| AccessError::mismatch("f32", &other)),
        }
    }
}

impl ToHostValue for bool {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::Boolean(*self))
    }
}

impl FromHostValue for bool {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        match &value {
            HostValue::Simple(SimpleValue::Boolean(b)) => Ok(*b),
            HostValue::Simple(SimpleValue::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| AccessError::mismatch("bool", &value)),
            other => Err(AccessError::mismatch("bool", other)),
        }
    }
}

impl ToHostValue for Uuid {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::Guid(*self))
    }
}

impl FromHostValue for Uuid {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        match &value {
            HostValue::Simple(SimpleValue::Guid(g)) => Ok(*g),
            HostValue::Simple(SimpleValue::String(s)) => {
                Uuid::parse_str(s.trim()).map_err(|_| AccessError::mismatch("Uuid", &value))
            }
            other => Err(AccessError::mismatch("Uuid", other)),
        }
    }
}

impl ToHostValue for NaiveDateTime {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::DateTime(*self))
    }
}

impl FromHostValue for NaiveDateTime {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        let parsed = match &value {
            HostValue::Simple(SimpleValue::DateTime(dt)) => Some(*dt),
            HostValue::Simple(SimpleValue::DateTimeOffset(dt)) => Some(dt.naive_utc()),
            HostValue::Simple(SimpleValue::String(s)) => parse_datetime(s),
            _ => None,
        };
        parsed.ok_or_else(|| AccessError::mismatch("NaiveDateTime", &value))
    }
}

// UTC timestamps travel as Edm.DateTime, the type v2 services declare for them.
impl ToHostValue for DateTime<Utc> {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::DateTime(self.naive_utc()))
    }
}

impl FromHostValue for DateTime<Utc> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        NaiveDateTime::from_host_value(value).map(|naive| naive.and_utc())
    }
}

impl ToHostValue for DateTime<FixedOffset> {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::DateTimeOffset(*self))
    }
}

impl FromHostValue for DateTime<FixedOffset> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        let parsed = match &value {
            HostValue::Simple(SimpleValue::DateTimeOffset(dt)) => Some(*dt),
            HostValue::Simple(SimpleValue::DateTime(dt)) => Some(dt.and_utc().into()),
            HostValue::Simple(SimpleValue::String(s)) => parse_datetime_offset(s),
            _ => None,
        };
        parsed.ok_or_else(|| AccessError::mismatch("DateTime<FixedOffset>", &value))
    }
}

impl ToHostValue for Binary {
    fn to_host_value(&self) -> HostValue {
        HostValue::Simple(SimpleValue::Binary(self.0.clone()))
    }
}

impl FromHostValue for Binary {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        match &value {
            HostValue::Simple(SimpleValue::Binary(bytes)) => Ok(Binary(bytes.clone())),
            HostValue::Simple(SimpleValue::String(s)) => STANDARD
                .decode(s.trim())
                .map(Binary)
                .map_err(|_| AccessError::mismatch("Binary", &value)),
            other => Err(AccessError::mismatch("Binary", other)),
        }
    }
}

impl ToHostValue for HostRecord {
    fn to_host_value(&self) -> HostValue {
        HostValue::Record(self.clone())
    }
}

impl FromHostValue for HostRecord {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        match value {
            HostValue::Record(record) => Ok(record),
            other => Err(AccessError::mismatch("HostRecord", &other)),
        }
    }
}

impl<T: ToHostValue> ToHostValue for Option<T> {
    fn to_host_value(&self) -> HostValue {
        match self {
            Some(value) => value.to_host_value(),
            None => HostValue::Null,
        }
    }
}

impl<T: FromHostValue> FromHostValue for Option<T> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        match value {
            HostValue::Null => Ok(None),
            other => T::from_host_value(other).map(Some),
        }
    }
}

impl<T: ToHostValue> ToHostValue for Box<T> {
    fn to_host_value(&self) -> HostValue {
        (**self).to_host_value()
    }
}

impl<T: FromHostValue> FromHostValue for Box<T> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        T::from_host_value(value).map(Box::new)
    }
}

fn collection_items(value: HostValue, expected: &'static str) -> Result<Vec<HostValue>, AccessError> {
    match value {
        HostValue::Collection(items) => Ok(items
            .into_iter()
            .filter(|item| !item.is_null())
            .collect()),
        other => Err(AccessError::mismatch(expected, &other)),
    }
}

fn lower_items<'a, T, I>(items: I) -> HostValue
where
    T: ToHostValue + 'a,
    I: IntoIterator<Item = &'a T>,
{
    HostValue::Collection(items.into_iter().map(ToHostValue::to_host_value).collect())
}

impl<T: ToHostValue> ToHostValue for Vec<T> {
    fn to_host_value(&self) -> HostValue {
        lower_items(self)
    }
}

impl<T: FromHostValue> FromHostValue for Vec<T> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        collection_items(value, "Vec")?
            .into_iter()
            .map(T::from_host_value)
            .collect()
    }
}

impl<T: ToHostValue> ToHostValue for VecDeque<T> {
    fn to_host_value(&self) -> HostValue {
        lower_items(self)
    }
}

impl<T: FromHostValue> FromHostValue for VecDeque<T> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        collection_items(value, "VecDeque")?
            .into_iter()
            .map(T::from_host_value)
            .collect()
    }
}

impl<T: ToHostValue> ToHostValue for BTreeSet<T> {
    fn to_host_value(&self) -> HostValue {
        lower_items(self)
    }
}

impl<T: FromHostValue + Ord> FromHostValue for BTreeSet<T> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        collection_items(value, "BTreeSet")?
            .into_iter()
            .map(T::from_host_value)
            .collect()
    }
}

impl<T: ToHostValue> ToHostValue for HashSet<T> {
    fn to_host_value(&self) -> HostValue {
        lower_items(self)
    }
}

impl<T: FromHostValue + Eq + Hash> FromHostValue for HashSet<T> {
    fn from_host_value(value: HostValue) -> Result<Self, AccessError> {
        collection_items(value, "HashSet")?
            .into_iter()
            .map(T::from_host_value)
            .collect()
    }
}
