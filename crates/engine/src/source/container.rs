use std::{collections::HashMap, sync::Arc};

use hydrate_types::SourceKind;
use tracing::{debug, warn};

use super::{BusinessSource, ContactSource, SourceHandle, SourceReader};
use crate::error::HydrateError;

/// Dependency container holding one shared reader per source kind.
///
/// The container is built explicitly and handed to the hydrator; nothing is
/// registered globally. Cloning the container shares the registered readers.
#[derive(Clone, Debug, Default)]
pub struct SourceContainer {
    sources: HashMap<SourceKind, SourceHandle>,
}

impl SourceContainer {
    /// An empty container. Every resolution fails until sources are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A container with the contact and business sources registered.
    pub fn with_defaults() -> Self {
        let mut container = Self::new();
        container.register(SourceKind::Contact, ContactSource::new());
        container.register(SourceKind::Business, BusinessSource::new());
        container
    }

    /// Register `reader` as the shared instance for `kind`, returning its handle.
    ///
    /// Registering a kind again replaces the previous reader; the new reader
    /// gets a new identity, so it never shares cache entries with the old one.
    pub fn register<R>(&mut self, kind: SourceKind, reader: R) -> SourceHandle
    where
        R: SourceReader + 'static,
    {
        self.register_shared(kind, Arc::new(reader))
    }

    /// Register an already shared reader instance.
    pub fn register_shared(&mut self, kind: SourceKind, reader: Arc<dyn SourceReader>) -> SourceHandle {
        let handle = SourceHandle::new(kind, reader);
        debug!(source_kind = %kind, source_id = %handle.id(), "source registered");
        if let Some(previous) = self.sources.insert(kind, handle.clone()) {
            warn!(
                source_kind = %kind,
                previous_id = %previous.id(),
                source_id = %handle.id(),
                "source re-registered; previous reader replaced"
            );
        }
        handle
    }

    /// Builder-style variant of [`SourceContainer::register`].
    pub fn with_source<R>(mut self, kind: SourceKind, reader: R) -> Self
    where
        R: SourceReader + 'static,
    {
        self.register(kind, reader);
        self
    }

    /// Resolve the shared reader for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError::UnregisteredSource`] when nothing is registered for `kind`.
    pub fn resolve(&self, kind: SourceKind) -> Result<SourceHandle, HydrateError> {
        self.sources
            .get(&kind)
            .cloned()
            .ok_or_else(|| HydrateError::unregistered_source(kind))
    }

    pub fn contains(&self, kind: SourceKind) -> bool {
        self.sources.contains_key(&kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<SourceKind> = self.sources.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
