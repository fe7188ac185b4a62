//! Payload rendering
//!
//! Serializes pending operations into request bodies without dispatching
//! them. Two formats are supported: v2 verbose JSON and Atom.

use super::constants::{namespaces, APPLICATION_ATOM_XML_CHARSET_UTF8, APPLICATION_JSON_CHARSET_UTF8};
use super::consumer::{OperationKind, PendingOperation};
use super::error::ODataError;
use crate::edm::value::json_datetime;
use crate::edm::{EdmComplexType, EdmType, OObject, OProperty, OValue, SimpleValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

/// Payload format used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    #[default]
    Json,
    Atom,
}

impl FormatType {
    pub fn content_type(&self) -> &'static str {
        match self {
            FormatType::Json => APPLICATION_JSON_CHARSET_UTF8,
            FormatType::Atom => APPLICATION_ATOM_XML_CHARSET_UTF8,
        }
    }
}

/// OData protocol version
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ODataVersion {
    V1,
    #[default]
    V2,
    V3,
}

impl ODataVersion {
    /// Header value, e.g. `2.0`
    pub fn as_str(&self) -> &'static str {
        match self {
            ODataVersion::V1 => "1.0",
            ODataVersion::V2 => "2.0",
            ODataVersion::V3 => "3.0",
        }
    }
}

/// Render the request body of a pending operation.
///
/// Deletes carry no body and render as an empty string.
pub fn render_payload(
    operation: &PendingOperation,
    format: FormatType,
    version: ODataVersion,
) -> Result<String, ODataError> {
    if operation.kind() == OperationKind::Delete {
        return Ok(String::new());
    }

    match format {
        FormatType::Json => {
            let body = Value::Object(properties_to_json(operation.property_list(), version));
            Ok(serde_json::to_string(&body)?)
        }
        FormatType::Atom => Ok(render_atom_entry(operation.property_list())),
    }
}

/// JSON object for a list of properties
pub fn properties_to_json(properties: &[OProperty], version: ODataVersion) -> Map<String, Value> {
    properties
        .iter()
        .map(|p| (p.name().to_string(), value_to_json(p.value(), version)))
        .collect()
}

fn value_to_json(value: &OValue, version: ODataVersion) -> Value {
    match value {
        OValue::Simple(simple) => simple_to_json(simple),
        OValue::Complex {
            edm_type,
            properties,
        } => complex_to_json(edm_type, properties, version),
        OValue::Collection { item_type, items } => {
            let items: Vec<Value> = items
                .iter()
                .map(|item| match item {
                    OObject::Simple(simple) => simple_to_json(simple),
                    OObject::Complex {
                        edm_type,
                        properties,
                    } => complex_to_json(edm_type, properties, version),
                })
                .collect();

            // v1 verbose JSON has no results wrapper
            if version == ODataVersion::V1 {
                Value::Array(items)
            } else {
                json!({
                    "__metadata": { "type": EdmType::collection_of(item_type.clone()).full_name() },
                    "results": items,
                })
            }
        }
    }
}

fn complex_to_json(
    edm_type: &EdmComplexType,
    properties: &[OProperty],
    version: ODataVersion,
) -> Value {
    let mut object = Map::new();
    object.insert("__metadata".to_string(), json!({ "type": edm_type.name() }));
    object.extend(properties_to_json(properties, version));
    Value::Object(object)
}

fn simple_to_json(value: &SimpleValue) -> Value {
    match value {
        SimpleValue::String(s) => Value::String(s.clone()),
        SimpleValue::Boolean(b) => Value::Bool(*b),
        SimpleValue::Byte(v) => json!(v),
        SimpleValue::SByte(v) => json!(v),
        SimpleValue::Int16(v) => json!(v),
        SimpleValue::Int32(v) => json!(v),
        // Int64 exceeds the JSON number range clients reliably handle
        SimpleValue::Int64(v) => Value::String(v.to_string()),
        SimpleValue::Double(v) => float_to_json(*v),
        SimpleValue::Single(v) => float_to_json(f64::from(*v)),
        SimpleValue::DateTime(dt) => Value::String(json_datetime(dt)),
        SimpleValue::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
        SimpleValue::DateTimeOffset(_) | SimpleValue::Guid(_) => Value::String(value.to_text()),
    }
}

fn float_to_json(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None => Value::String(SimpleValue::Double(v).to_text()),
    }
}

fn render_atom_entry(properties: &[OProperty]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    out.push_str(&format!(
        "<entry xmlns=\"{}\" xmlns:d=\"{}\" xmlns:m=\"{}\">",
        namespaces::ATOM,
        namespaces::DATA_SERVICES,
        namespaces::METADATA
    ));
    out.push_str("<title type=\"text\" /><author><name /></author>");
    out.push_str("<content type=\"application/xml\"><m:properties>");
    for property in properties {
        write_atom_property(&mut out, property.name(), property.value());
    }
    out.push_str("</m:properties></content></entry>");
    out
}

fn write_atom_property(out: &mut String, name: &str, value: &OValue) {
    match value {
        OValue::Simple(simple) => write_atom_simple(out, name, simple),
        OValue::Complex {
            edm_type,
            properties,
        } => write_atom_complex(out, name, edm_type, properties),
        OValue::Collection { item_type, items } => {
            let type_name = EdmType::collection_of(item_type.clone()).full_name();
            out.push_str(&format!("<d:{name} m:type=\"{}\">", escape(type_name.as_str())));
            for item in items {
                match item {
                    OObject::Simple(simple) => write_atom_simple(out, "element", simple),
                    OObject::Complex {
                        edm_type,
                        properties,
                    } => write_atom_complex(out, "element", edm_type, properties),
                }
            }
            out.push_str(&format!("</d:{name}>"));
        }
    }
}

fn write_atom_simple(out: &mut String, name: &str, value: &SimpleValue) {
    let text = value.to_text();
    let edm_type = value.edm_type();
    if matches!(value, SimpleValue::String(_)) {
        out.push_str(&format!("<d:{name}>{}</d:{name}>", escape(text.as_str())));
    } else {
        out.push_str(&format!(
            "<d:{name} m:type=\"{}\">{}</d:{name}>",
            edm_type.full_name(),
            escape(text.as_str())
        ));
    }
}

fn write_atom_complex(out: &mut String, name: &str, edm_type: &EdmComplexType, properties: &[OProperty]) {
    out.push_str(&format!("<d:{name} m:type=\"{}\">", escape(edm_type.name())));
    for property in properties {
        write_atom_property(out, property.name(), property.value());
    }
    out.push_str(&format!("</d:{name}>"));
}
