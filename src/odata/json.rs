//! JSON response parsing
//!
//! Turns verbose (`{"d": ...}`) and light (`{"value": [...]}`) JSON responses
//! into entities. Wire values keep their JSON shape; conversion into host types
//! happens later through `FromHostValue` coercions.

use super::error::ODataError;
use crate::edm::{EdmComplexType, EdmType, OEntity, OObject, OProperty, OValue, SimpleValue};
use serde_json::{Map, Value};

/// One page of a feed
#[derive(Debug, Default)]
pub struct EntityPage {
    pub entities: Vec<OEntity>,
    pub next_link: Option<String>,
}

/// Parse a single-entity response body
pub fn parse_entity_response(body: &Value) -> Result<OEntity, ODataError> {
    let body = unwrap_envelope(body);
    match body {
        Value::Object(object) => parse_entity(object),
        other => Err(ODataError::ParseError(format!(
            "Expected an entity object, got {}",
            json_kind(other)
        ))),
    }
}

/// Parse a feed response body
pub fn parse_feed(body: &Value) -> Result<EntityPage, ODataError> {
    let inner = unwrap_envelope(body);

    let (items, next_link) = match inner {
        // v1 verbose: {"d": [...]}
        Value::Array(items) => (items, None),
        Value::Object(object) => {
            let items = object
                .get("results")
                .or_else(|| object.get("value"))
                .and_then(Value::as_array)
                .ok_or_else(|| ODataError::ParseError("Feed has no results array".into()))?;
            let next_link = object
                .get("__next")
                .or_else(|| object.get("@odata.nextLink"))
                .or_else(|| body.get("@odata.nextLink"))
                .and_then(Value::as_str)
                .map(str::to_string);
            (items, next_link)
        }
        other => {
            return Err(ODataError::ParseError(format!(
                "Expected a feed, got {}",
                json_kind(other)
            )))
        }
    };

    let entities = items
        .iter()
        .map(|item| match item {
            Value::Object(object) => parse_entity(object),
            other => Err(ODataError::ParseError(format!(
                "Expected an entity object in feed, got {}",
                json_kind(other)
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EntityPage {
        entities,
        next_link,
    })
}

fn unwrap_envelope(body: &Value) -> &Value {
    body.get("d").unwrap_or(body)
}

fn parse_entity(object: &Map<String, Value>) -> Result<OEntity, ODataError> {
    let type_name = metadata_type(object);
    let properties = parse_properties(object)?;
    Ok(OEntity {
        entity_set: None,
        type_name,
        properties,
    })
}

fn metadata_type(object: &Map<String, Value>) -> Option<String> {
    object
        .get("__metadata")
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_properties(object: &Map<String, Value>) -> Result<Vec<OProperty>, ODataError> {
    let mut properties = Vec::with_capacity(object.len());

    for (name, value) in object {
        if name.starts_with("__") || name.starts_with("@odata") || name.contains("@odata.") {
            continue;
        }

        if let Some(value) = parse_value(name, value)? {
            properties.push(OProperty::new(name.clone(), value));
        }
    }

    Ok(properties)
}

fn parse_value(name: &str, value: &Value) -> Result<Option<OValue>, ODataError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => parse_collection(name, None, items),
        Value::Object(object) if object.contains_key("__deferred") => {
            tracing::debug!("Skipping deferred navigation property {}", name);
            Ok(None)
        }
        Value::Object(object) => match object.get("results") {
            Some(Value::Array(items)) => {
                let declared = metadata_type(object).map(|t| EdmType::parse(&t));
                let item_type = match declared {
                    Some(EdmType::Collection(item)) => Some(*item),
                    _ => None,
                };
                parse_collection(name, item_type, items)
            }
            _ => {
                let type_name = metadata_type(object).unwrap_or_else(|| name.to_string());
                Ok(Some(OValue::Complex {
                    edm_type: EdmComplexType::new(type_name),
                    properties: parse_properties(object)?,
                }))
            }
        },
        simple => Ok(parse_simple(simple).map(OValue::Simple)),
    }
}

fn parse_collection(
    name: &str,
    declared: Option<EdmType>,
    items: &[Value],
) -> Result<Option<OValue>, ODataError> {
    let mut objects = Vec::with_capacity(items.len());

    for item in items {
        match item {
            Value::Null => continue,
            Value::Array(_) => {
                return Err(ODataError::ParseError(format!(
                    "Nested collection in property {}",
                    name
                )))
            }
            Value::Object(object) => objects.push(OObject::Complex {
                edm_type: EdmComplexType::new(
                    metadata_type(object).unwrap_or_else(|| name.to_string()),
                ),
                properties: parse_properties(object)?,
            }),
            simple => {
                if let Some(simple) = parse_simple(simple) {
                    objects.push(OObject::Simple(simple));
                }
            }
        }
    }

    let item_type = match (declared, objects.first()) {
        (Some(declared), _) => declared,
        (None, Some(OObject::Simple(simple))) => EdmType::Simple(simple.edm_type()),
        (None, Some(OObject::Complex { edm_type, .. })) => EdmType::Complex(edm_type.clone()),
        (None, None) => return Ok(None),
    };

    if objects.is_empty() {
        return Ok(None);
    }

    Ok(Some(OValue::Collection {
        item_type,
        items: objects,
    }))
}

fn parse_simple(value: &Value) -> Option<SimpleValue> {
    match value {
        Value::Bool(b) => Some(SimpleValue::Boolean(*b)),
        Value::String(s) => Some(SimpleValue::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(match i32::try_from(i) {
                    Ok(small) => SimpleValue::Int32(small),
                    Err(_) => SimpleValue::Int64(i),
                })
            } else {
                n.as_f64().map(SimpleValue::Double)
            }
        }
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
