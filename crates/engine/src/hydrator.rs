//! Entity hydration.
//!
//! For every field in an entity's schema the hydrator resolves the field's
//! source, then binds a holder that, on read, loads the source's whole
//! collection through the shared cache and extracts the field's record key.
//! Caching is per collection, not per field: fields backed by the same
//! source share one cache entry and one fetch.

use std::sync::Arc;

use hydrate_types::{Collection, FieldSchema};
use serde_json::Value;
use tracing::debug;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::entity::Entity;
use crate::error::HydrateError;
use crate::lazy::Lazy;
use crate::source::{ResolveSource, SourceContainer, SourceHandle, SourceId};

/// Cache of whole source collections keyed by reader identity.
pub type CollectionCache = Cache<SourceId, Arc<Collection>>;

/// Builds entities whose fields read lazily from cached source collections.
#[derive(Debug, Clone)]
pub struct Hydrator {
    container: SourceContainer,
    cache: Arc<CollectionCache>,
}

impl Hydrator {
    pub fn new(container: SourceContainer, cache: Arc<CollectionCache>) -> Self {
        Self { container, cache }
    }

    /// Build a hydrator with its own collection cache.
    pub fn with_config(container: SourceContainer, config: &CacheConfig) -> Result<Self, HydrateError> {
        Ok(Self::new(container, Arc::new(Cache::new(config)?)))
    }

    pub fn container(&self) -> &SourceContainer {
        &self.container
    }

    pub fn cache(&self) -> &Arc<CollectionCache> {
        &self.cache
    }

    /// Create a fresh `T` with every schema field bound to a lazy holder.
    ///
    /// No source is fetched here; fetching and record extraction happen on
    /// the first read of each field.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a field's source kind is not
    /// registered, or when the schema names a field the entity cannot bind.
    pub fn hydrate<T: Entity>(&self) -> Result<T, HydrateError> {
        let mut entity = T::default();
        for field in T::schema() {
            let handle = field.descriptor.resolve(&self.container)?;
            debug!(
                entity = T::entity_name(),
                field = field.name,
                source_kind = %handle.kind(),
                record_key = field.record_key(),
                "binding field"
            );
            entity.bind(field.name, self.field_holder(field, handle))?;
        }
        Ok(entity)
    }

    fn field_holder(&self, field: &FieldSchema, handle: SourceHandle) -> Lazy<Value> {
        let source_kind = handle.kind();
        let record_key = field.record_key();
        let collection = self.collection_holder(handle);
        Lazy::new(move || {
            let collection = collection.value()?;
            collection
                .get(record_key)
                .cloned()
                .ok_or_else(|| HydrateError::missing_record(source_kind, record_key))
        })
    }

    fn collection_holder(&self, handle: SourceHandle) -> Lazy<Arc<Collection>> {
        let key = handle.id();
        Lazy::cached(Arc::clone(&self.cache), key, move || handle.fetch())
    }
}
