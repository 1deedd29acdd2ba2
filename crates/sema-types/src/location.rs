//! Program locations and type keys
//!
//! A [`Location`] identifies the program a nominal type was declared in.
//! Together with the type's qualified identifier it forms the type's
//! [`TypeKey`], the machine-readable identity used for serialization and
//! nominal equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of a program
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Location {
    /// A contract deployed to an account
    Address {
        /// Account address
        address: u64,
        /// Contract name
        name: String,
    },
    /// A named program, used by tests and tooling
    StringLocation(String),
    /// A script, identified by its hash
    Script(String),
    /// A transaction, identified by its hash
    Transaction(String),
    /// A named built-in program
    Identifier(String),
}

impl Location {
    /// Single-character prefix of type keys for this kind of location
    pub fn prefix(&self) -> &'static str {
        match self {
            Location::Address { .. } => "A",
            Location::StringLocation(_) => "S",
            Location::Script(_) => "s",
            Location::Transaction(_) => "t",
            Location::Identifier(_) => "I",
        }
    }

    /// Type key of a type with the given qualified identifier declared in this location
    pub fn type_key(&self, qualified_identifier: &str) -> TypeKey {
        let key = match self {
            Location::Address { address, .. } => {
                format!("A.{:016x}.{}", address, qualified_identifier)
            }
            Location::StringLocation(name)
            | Location::Script(name)
            | Location::Transaction(name)
            | Location::Identifier(name) => {
                format!("{}.{}.{}", self.prefix(), name, qualified_identifier)
            }
        };
        TypeKey(key)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Address { address, name } => write!(f, "0x{:016x}.{}", address, name),
            Location::StringLocation(name) => write!(f, "{}", name),
            Location::Script(id) => write!(f, "s.{}", id),
            Location::Transaction(id) => write!(f, "t.{}", id),
            Location::Identifier(name) => write!(f, "I.{}", name),
        }
    }
}

/// Machine-readable identity of a type
///
/// Distinct from the display string: nominal types are prefixed with their location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(pub String);

impl TypeKey {
    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors decoding a type key
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeKeyError {
    /// The key has fewer parts than its prefix requires
    #[error("invalid type key '{key}': missing {missing}")]
    MissingPart {
        /// The key being decoded
        key: String,
        /// Name of the missing part
        missing: &'static str,
    },

    /// The address part is not hexadecimal
    #[error("invalid type key '{key}': bad address '{address}'")]
    InvalidAddress {
        /// The key being decoded
        key: String,
        /// The offending address part
        address: String,
    },
}

/// Split a type key into its location and qualified identifier.
///
/// Keys without a known location prefix belong to built-in types and decode
/// to `None` with the whole key as the identifier. Address locations decode
/// with the contract name set to the first identifier component.
pub fn decode_type_key(key: &TypeKey) -> Result<(Option<Location>, String), TypeKeyError> {
    let raw = key.as_str();
    let mut parts = raw.splitn(3, '.');
    let prefix = parts.next().unwrap_or_default();

    let missing = |missing| TypeKeyError::MissingPart {
        key: raw.to_string(),
        missing,
    };

    if !matches!(prefix, "A" | "S" | "s" | "t" | "I") {
        return Ok((None, raw.to_string()));
    }

    let location_part = parts.next().ok_or_else(|| missing("location"))?;
    let qualified = parts.next().ok_or_else(|| missing("qualified identifier"))?;
    if qualified.is_empty() {
        return Err(missing("qualified identifier"));
    }

    let location = match prefix {
        "A" => {
            let address = u64::from_str_radix(location_part, 16).map_err(|_| {
                TypeKeyError::InvalidAddress {
                    key: raw.to_string(),
                    address: location_part.to_string(),
                }
            })?;
            let name = qualified.split('.').next().unwrap_or(qualified).to_string();
            Location::Address { address, name }
        }
        "S" => Location::StringLocation(location_part.to_string()),
        "s" => Location::Script(location_part.to_string()),
        "t" => Location::Transaction(location_part.to_string()),
        _ => Location::Identifier(location_part.to_string()),
    };

    Ok((Some(location), qualified.to_string()))
}
