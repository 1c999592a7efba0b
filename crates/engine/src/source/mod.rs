//! Data sources and their dependency container.
//!
//! Modules:
//! - `contact`: Contact record source
//! - `business`: Business metadata source
//! - `container`: Registry mapping a source kind to its shared reader instance

mod business;
mod contact;
mod container;

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use hydrate_types::{Collection, FieldDescriptor, SourceKind};
use tracing::{info, warn};

pub use business::BusinessSource;
pub use contact::ContactSource;
pub use container::SourceContainer;

use crate::error::HydrateError;

/// A data source producing one whole collection per fetch.
///
/// Implementations must be safe to call from several threads at once. Any
/// internal state has to be synchronized by the implementation itself.
pub trait SourceReader: Send + Sync + fmt::Debug {
    fn fetch_collection(&self) -> anyhow::Result<Collection>;
}

/// Process-unique identity of a registered reader instance.
///
/// This is the cache key for the reader's whole collection.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// A registered reader together with its kind and identity.
///
/// Clones share the same reader instance and the same [`SourceId`].
#[derive(Clone, Debug)]
pub struct SourceHandle {
    id: SourceId,
    kind: SourceKind,
    reader: Arc<dyn SourceReader>,
}

impl SourceHandle {
    pub(crate) fn new(kind: SourceKind, reader: Arc<dyn SourceReader>) -> Self {
        Self {
            id: SourceId::next(),
            kind,
            reader,
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn reader(&self) -> &Arc<dyn SourceReader> {
        &self.reader
    }

    /// Fetch the whole collection from the underlying reader.
    pub fn fetch(&self) -> Result<Arc<Collection>, HydrateError> {
        match self.reader.fetch_collection() {
            Ok(collection) => {
                info!(
                    source_kind = %self.kind,
                    source_id = %self.id,
                    item_count = collection.len(),
                    "source collection fetched"
                );
                Ok(Arc::new(collection))
            }
            Err(error) => {
                warn!(source_kind = %self.kind, source_id = %self.id, "source fetch failed: {}", error);
                Err(HydrateError::fetch(self.kind, error))
            }
        }
    }
}

/// Resolution of a field descriptor to the reader it depends on.
pub trait ResolveSource {
    fn resolve(&self, container: &SourceContainer) -> Result<SourceHandle, HydrateError>;
}

impl ResolveSource for FieldDescriptor {
    fn resolve(&self, container: &SourceContainer) -> Result<SourceHandle, HydrateError> {
        match self {
            FieldDescriptor::Contact { .. } => container.resolve(SourceKind::Contact),
            FieldDescriptor::Business { .. } => container.resolve(SourceKind::Business),
        }
    }
}
