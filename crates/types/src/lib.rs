//! Shared schema-level types for the hydrate workspace.
//!
//! Everything here is immutable metadata: which sources exist, how an entity
//! field names the source and record it is read from, and the shape of a
//! fetched collection. Runtime state (caches, readers, holders) lives in
//! `hydrate-engine`.

use std::{error::Error, fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod schema;

pub use schema::{FieldDescriptor, FieldSchema};

/// A whole source collection: record key to raw value.
///
/// Insertion order is preserved so that logs and rendered output stay stable.
pub type Collection = IndexMap<String, Value>;

/// The closed set of data sources an entity field can be read from.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Contact records (email, identifiers).
    Contact,
    /// Business metadata attached to a user.
    Business,
}

impl SourceKind {
    /// All known source kinds, in declaration order.
    pub const ALL: [SourceKind; 2] = [SourceKind::Contact, SourceKind::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ParseSourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contact" => Ok(Self::Contact),
            "business" => Ok(Self::Business),
            _ => Err(ParseSourceKindError(s.to_string())),
        }
    }
}

/// Error returned when a string does not name a known [`SourceKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSourceKindError(pub String);

impl fmt::Display for ParseSourceKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown source kind: '{}'", self.0)
    }
}

impl Error for ParseSourceKindError {}
