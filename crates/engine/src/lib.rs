//! # Hydrate Engine
//!
//! The hydrate engine populates typed entities from several independent,
//! slow-to-query data sources. Each entity field declares which source supplies
//! it and under which record key; reads are deferred until a field is accessed
//! and served from a time-bounded cache of whole source collections.
//!
//! ## Usage
//!
//! ```rust
//! use hydrate_engine::{CacheConfig, Hydrator, Lazy, SourceContainer, entity_schema};
//! use hydrate_types::FieldDescriptor;
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     user_name: Option<Lazy<String>>,
//!     business_field: Option<Lazy<String>>,
//! }
//!
//! entity_schema! {
//!     User {
//!         user_name: String => FieldDescriptor::contact("Email"),
//!         business_field: String => FieldDescriptor::business("InterestingBusinessField"),
//!     }
//! }
//!
//! let hydrator = Hydrator::with_config(SourceContainer::with_defaults(), &CacheConfig::default())?;
//! let user: User = hydrator.hydrate()?;
//! if let Some(user_name) = &user.user_name {
//!     assert_eq!(user_name.value()?, "myname@domain.com");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`cache`**: Concurrent TTL cache with optimistic population and a background sweeper
//! - **`lazy`**: Deferred value holders, plain or cache-backed
//! - **`source`**: Source readers and the dependency container resolving them by kind
//! - **`entity`**: The `Entity` trait and the `entity_schema!` declaration macro
//! - **`hydrator`**: Binds every schema field to a cached, lazily extracted value
//! - **`config`**: JSON-backed cache policy configuration

pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod hydrator;
pub mod lazy;
pub mod source;

pub use cache::{Cache, CacheStats};
pub use config::{CacheConfig, ConfigError, HydrateConfig, load_config, load_config_from_path};
pub use entity::Entity;
pub use error::HydrateError;
pub use hydrator::{CollectionCache, Hydrator};
pub use lazy::Lazy;
pub use source::{BusinessSource, ContactSource, ResolveSource, SourceContainer, SourceHandle, SourceId, SourceReader};

#[doc(hidden)]
pub mod __private {
    pub use hydrate_types::FieldSchema;
    pub use serde_json::Value;
}
