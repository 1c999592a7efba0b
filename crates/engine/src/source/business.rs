use hydrate_types::Collection;
use serde_json::Value;
use tracing::debug;

use super::SourceReader;

pub const INTERESTING_FIELD_KEY: &str = "InterestingBusinessField";

/// Business metadata source.
#[derive(Debug, Clone, Default)]
pub struct BusinessSource;

impl BusinessSource {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for BusinessSource {
    fn fetch_collection(&self) -> anyhow::Result<Collection> {
        let mut collection = Collection::new();
        collection.insert(
            INTERESTING_FIELD_KEY.to_string(),
            Value::String("Interesting Business Fact".to_string()),
        );
        debug!("business collection read");
        Ok(collection)
    }
}
