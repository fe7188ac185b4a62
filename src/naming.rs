//! Naming translation between host attribute names and wire property names
//!
//! Host objects expose attribute names in their own convention. OData services
//! usually expect either the same convention or upper camel case. A
//! [`NamingPolicy`] converts in both directions and must be reversible on valid
//! identifiers: `to_host(&to_wire(name)) == name`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bidirectional identifier translation
pub trait NamingPolicy: Send + Sync {
    /// Translate a host attribute name into the wire property name
    fn to_wire(&self, host_name: &str) -> String;

    /// Translate a wire property name back into the host attribute name
    fn to_host(&self, wire_name: &str) -> String;

    /// Whether `host_name` survives a trip to the wire and back unchanged
    fn round_trips(&self, host_name: &str) -> bool {
        self.to_host(&self.to_wire(host_name)) == host_name
    }
}

/// A letter followed by letters, digits or underscores.
///
/// Names that pass are usable both as JSON keys and as XML element names.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Built-in naming policies, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingFormat {
    /// Host and wire share the same convention
    #[default]
    Identity,
    /// Flip the case of the first character (`theAttribute` <-> `TheAttribute`)
    InvertFirstLetter,
    /// `snake_case` host names <-> `UpperCamel` wire names
    PascalCase,
}

impl NamingPolicy for NamingFormat {
    fn to_wire(&self, host_name: &str) -> String {
        match self {
            NamingFormat::Identity => host_name.to_string(),
            NamingFormat::InvertFirstLetter => invert_first_letter(host_name),
            NamingFormat::PascalCase => snake_to_pascal(host_name),
        }
    }

    fn to_host(&self, wire_name: &str) -> String {
        match self {
            NamingFormat::Identity => wire_name.to_string(),
            NamingFormat::InvertFirstLetter => invert_first_letter(wire_name),
            NamingFormat::PascalCase => pascal_to_snake(wire_name),
        }
    }
}

impl fmt::Display for NamingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamingFormat::Identity => "identity",
            NamingFormat::InvertFirstLetter => "invert-first-letter",
            NamingFormat::PascalCase => "pascal-case",
        };
        f.write_str(name)
    }
}

/// Naming policy assembled from a plain function pair
///
/// Lets callers plug in a convention the built-in formats do not cover without
/// touching the mapper.
#[derive(Clone, Copy)]
pub struct FnNaming {
    to_wire: fn(&str) -> String,
    to_host: fn(&str) -> String,
}

impl FnNaming {
    pub fn new(to_wire: fn(&str) -> String, to_host: fn(&str) -> String) -> Self {
        Self { to_wire, to_host }
    }
}

impl NamingPolicy for FnNaming {
    fn to_wire(&self, host_name: &str) -> String {
        (self.to_wire)(host_name)
    }

    fn to_host(&self, wire_name: &str) -> String {
        (self.to_host)(wire_name)
    }
}

impl fmt::Debug for FnNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnNaming").finish_non_exhaustive()
    }
}

/// Flip the case of the leading character.
///
/// Characters whose case mapping expands to more than one character are left
/// untouched so the function stays its own inverse.
fn invert_first_letter(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let flipped = if first.is_uppercase() {
        single_char(first.to_lowercase())
    } else if first.is_lowercase() {
        single_char(first.to_uppercase())
    } else {
        None
    };

    match flipped {
        Some(c) => {
            let mut out = String::with_capacity(name.len());
            out.push(c);
            out.push_str(chars.as_str());
            out
        }
        None => name.to_string(),
    }
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    let c = mapped.next()?;
    match mapped.next() {
        Some(_) => None,
        None => Some(c),
    }
}

// Only lower snake case names whose segments start with a letter round trip.
// `x_2`, `ab_` and `theAttribute` do not; the mapper rejects them.
fn snake_to_pascal(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn pascal_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
