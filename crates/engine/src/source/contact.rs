use hydrate_types::Collection;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::SourceReader;

pub const EMAIL_KEY: &str = "Email";
pub const ID_KEY: &str = "Id";

/// Contact record source.
///
/// The contact id is generated once per instance, so every fetch from the
/// same instance reports the same id.
#[derive(Debug, Clone)]
pub struct ContactSource {
    email: String,
    id: Uuid,
}

impl ContactSource {
    pub fn new() -> Self {
        Self::with_email("myname@domain.com")
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            id: Uuid::new_v4(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for ContactSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceReader for ContactSource {
    fn fetch_collection(&self) -> anyhow::Result<Collection> {
        let mut collection = Collection::new();
        collection.insert(EMAIL_KEY.to_string(), Value::String(self.email.clone()));
        collection.insert(ID_KEY.to_string(), Value::String(self.id.to_string()));
        debug!("contact collection read");
        Ok(collection)
    }
}
