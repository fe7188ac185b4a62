//! Primitive wire values

use super::types::EdmSimpleType;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;
use uuid::Uuid;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A typed primitive value
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleValue {
    Binary(Vec<u8>),
    Boolean(bool),
    Byte(u8),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Double(f64),
    Guid(Uuid),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    SByte(i8),
    Single(f32),
    String(String),
}

impl SimpleValue {
    pub fn edm_type(&self) -> EdmSimpleType {
        match self {
            SimpleValue::Binary(_) => EdmSimpleType::Binary,
            SimpleValue::Boolean(_) => EdmSimpleType::Boolean,
            SimpleValue::Byte(_) => EdmSimpleType::Byte,
            SimpleValue::DateTime(_) => EdmSimpleType::DateTime,
            SimpleValue::DateTimeOffset(_) => EdmSimpleType::DateTimeOffset,
            SimpleValue::Double(_) => EdmSimpleType::Double,
            SimpleValue::Guid(_) => EdmSimpleType::Guid,
            SimpleValue::Int16(_) => EdmSimpleType::Int16,
            SimpleValue::Int32(_) => EdmSimpleType::Int32,
            SimpleValue::Int64(_) => EdmSimpleType::Int64,
            SimpleValue::SByte(_) => EdmSimpleType::SByte,
            SimpleValue::Single(_) => EdmSimpleType::Single,
            SimpleValue::String(_) => EdmSimpleType::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SimpleValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view across all integral widths
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SimpleValue::Byte(v) => Some(i64::from(*v)),
            SimpleValue::SByte(v) => Some(i64::from(*v)),
            SimpleValue::Int16(v) => Some(i64::from(*v)),
            SimpleValue::Int32(v) => Some(i64::from(*v)),
            SimpleValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating point view, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SimpleValue::Double(v) => Some(*v),
            SimpleValue::Single(v) => Some(f64::from(*v)),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Plain text form used inside Atom elements and for display
    pub fn to_text(&self) -> String {
        match self {
            SimpleValue::Binary(bytes) => STANDARD.encode(bytes),
            SimpleValue::Boolean(b) => b.to_string(),
            SimpleValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            SimpleValue::DateTimeOffset(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            SimpleValue::Double(v) => float_text(*v),
            SimpleValue::Single(v) => float_text(f64::from(*v)),
            SimpleValue::Guid(g) => g.to_string(),
            SimpleValue::String(s) => s.clone(),
            other => other.as_i64().map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    /// Literal form used in key predicates, e.g. `'abc'`, `42L`, `guid'…'`
    pub fn to_key_literal(&self) -> String {
        match self {
            SimpleValue::String(s) => format!("'{}'", s.replace('\'', "''")),
            SimpleValue::Int64(v) => format!("{v}L"),
            SimpleValue::Double(v) => format!("{}d", float_text(*v)),
            SimpleValue::Single(v) => format!("{}f", float_text(f64::from(*v))),
            SimpleValue::Guid(g) => format!("guid'{g}'"),
            SimpleValue::DateTime(_) => format!("datetime'{}'", self.to_text()),
            SimpleValue::DateTimeOffset(_) => format!("datetimeoffset'{}'", self.to_text()),
            SimpleValue::Binary(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("X'{hex}'")
            }
            other => other.to_text(),
        }
    }
}

impl fmt::Display for SimpleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn float_text(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        v.to_string()
    }
}

/// Parse the date/time encodings found on the wire.
///
/// Accepts the v2 JSON form `/Date(1325376000000)/` (an optional `+0060`
/// offset suffix is ignored since the tick count is already UTC) and ISO 8601
/// with or without a trailing offset.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Some(ticks) = text
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        let digits_end = ticks
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '+' || *c == '-')
            .map(|(i, _)| i)
            .unwrap_or(ticks.len());
        let millis: i64 = ticks[..digits_end].parse().ok()?;
        return DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.naive_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).ok()
}

/// Parse an offset-aware timestamp; offset-less inputs are taken as UTC.
pub fn parse_datetime_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .or_else(|| parse_datetime(text).map(|naive| naive.and_utc().into()))
}

/// v2 JSON encoding of `Edm.DateTime`
pub fn json_datetime(dt: &NaiveDateTime) -> String {
    format!("/Date({})/", dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2012, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_key_literals() {
        assert_eq!(SimpleValue::String("42".into()).to_key_literal(), "'42'");
        assert_eq!(SimpleValue::String("O'Neil".into()).to_key_literal(), "'O''Neil'");
        assert_eq!(SimpleValue::Int32(7).to_key_literal(), "7");
        assert_eq!(SimpleValue::Int64(7).to_key_literal(), "7L");
        assert_eq!(SimpleValue::Binary(vec![0x0a, 0xff]).to_key_literal(), "X'0AFF'");
        assert_eq!(
            SimpleValue::DateTime(sample_datetime()).to_key_literal(),
            "datetime'2012-01-01T00:00:00'"
        );
        let guid = Uuid::nil();
        assert_eq!(
            SimpleValue::Guid(guid).to_key_literal(),
            "guid'00000000-0000-0000-0000-000000000000'"
        );
    }

    #[test]
    fn test_parse_json_datetime() {
        assert_eq!(parse_datetime("/Date(1325376000000)/"), Some(sample_datetime()));
        assert_eq!(parse_datetime("/Date(1325376000000+0060)/"), Some(sample_datetime()));
        assert_eq!(json_datetime(&sample_datetime()), "/Date(1325376000000)/");
    }

    #[test]
    fn test_parse_iso_datetime() {
        assert_eq!(parse_datetime("2012-01-01T00:00:00"), Some(sample_datetime()));
        assert_eq!(parse_datetime("2012-01-01T01:00:00+01:00"), Some(sample_datetime()));
        assert_eq!(parse_datetime("yesterday"), None);
        assert!(parse_datetime_offset("2012-01-01T00:00:00Z").is_some());
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(SimpleValue::Byte(3).as_i64(), Some(3));
        assert_eq!(SimpleValue::Int16(3).as_f64(), Some(3.0));
        assert_eq!(SimpleValue::String("3".into()).as_i64(), None);
        assert_eq!(SimpleValue::Double(f64::NAN).to_text(), "NaN");
    }
}
