//! Error types for entity hydration.

use hydrate_types::SourceKind;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for hydration, cache, and source resolution.
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error("No source registered for kind '{kind}'")]
    UnregisteredSource { kind: SourceKind },

    #[error("Fetching the {source_kind} collection failed: {source}")]
    Fetch {
        source_kind: SourceKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("Record '{record_key}' not found in the {source_kind} collection")]
    MissingRecord { source_kind: SourceKind, record_key: String },

    #[error("Field '{field}' expected a value of type {expected}: {source}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Entity {entity} has no field named '{field}'")]
    UnknownField { entity: &'static str, field: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start the cache sweeper: {0}")]
    SweeperSpawn(#[source] std::io::Error),
}

impl HydrateError {
    /// Create an unregistered source error.
    pub fn unregistered_source(kind: SourceKind) -> Self {
        Self::UnregisteredSource { kind }
    }

    /// Create a collection fetch error.
    pub fn fetch(source_kind: SourceKind, source: anyhow::Error) -> Self {
        Self::Fetch { source_kind, source }
    }

    /// Create a missing record error.
    pub fn missing_record(source_kind: SourceKind, record_key: impl Into<String>) -> Self {
        Self::MissingRecord {
            source_kind,
            record_key: record_key.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, source: serde_json::Error) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            source,
        }
    }

    /// Create an unknown field error.
    pub fn unknown_field(entity: &'static str, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity,
            field: field.into(),
        }
    }

    /// Whether the error stems from wiring or schema setup rather than a data read.
    ///
    /// Configuration errors are never resolved by retrying the same call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnregisteredSource { .. } | Self::UnknownField { .. } | Self::Config(_) | Self::SweeperSpawn(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_source_and_record() {
        let error = HydrateError::missing_record(SourceKind::Contact, "Phone");
        assert_eq!(error.to_string(), "Record 'Phone' not found in the contact collection");

        let error = HydrateError::unregistered_source(SourceKind::Business);
        assert_eq!(error.to_string(), "No source registered for kind 'business'");
        assert!(error.is_configuration());
    }

    #[test]
    fn fetch_error_keeps_the_source_chain() {
        let error = HydrateError::fetch(SourceKind::Contact, anyhow::anyhow!("connection refused"));
        assert!(!error.is_configuration());
        let source = std::error::Error::source(&error).expect("fetch error has a source");
        assert_eq!(source.to_string(), "connection refused");
    }
}
