//! Per-field source metadata.
//!
//! A [`FieldDescriptor`] is declared once per entity field at schema level and
//! shared by every instance of the entity. It names the source kind that
//! supplies the field and the record key to extract from that source's
//! collection.

use crate::SourceKind;

/// Declares where an entity field's value comes from.
///
/// Each variant corresponds to exactly one [`SourceKind`]. When `record_key`
/// is `None`, the field's own declared name is used as the record key.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum FieldDescriptor {
    /// Field is read from the contact collection.
    Contact { record_key: Option<&'static str> },
    /// Field is read from the business collection.
    Business { record_key: Option<&'static str> },
}

impl FieldDescriptor {
    /// Contact-sourced field reading `record_key`.
    pub const fn contact(record_key: &'static str) -> Self {
        Self::Contact {
            record_key: Some(record_key),
        }
    }

    /// Business-sourced field reading `record_key`.
    pub const fn business(record_key: &'static str) -> Self {
        Self::Business {
            record_key: Some(record_key),
        }
    }

    /// The source kind this descriptor reads from.
    pub const fn source_kind(&self) -> SourceKind {
        match self {
            Self::Contact { .. } => SourceKind::Contact,
            Self::Business { .. } => SourceKind::Business,
        }
    }

    /// Explicit record key, if one was declared.
    pub const fn record_key(&self) -> Option<&'static str> {
        match self {
            Self::Contact { record_key } | Self::Business { record_key } => *record_key,
        }
    }

    /// Record key to extract for a field declared as `field_name`.
    pub fn record_key_for<'a>(&self, field_name: &'a str) -> &'a str {
        self.record_key().unwrap_or(field_name)
    }
}

/// One schema entry: a field name and the descriptor attached to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldSchema {
    /// Declared field name on the entity.
    pub name: &'static str,
    /// Source metadata for the field.
    pub descriptor: FieldDescriptor,
}

impl FieldSchema {
    pub const fn new(name: &'static str, descriptor: FieldDescriptor) -> Self {
        Self { name, descriptor }
    }

    /// Record key this field extracts from its source collection.
    pub fn record_key(&self) -> &'static str {
        self.descriptor.record_key_for(self.name)
    }
}
