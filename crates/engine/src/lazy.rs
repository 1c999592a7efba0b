//! Deferred values.
//!
//! A [`Lazy`] wraps a producer and computes its value on every call to
//! [`Lazy::value`]. A holder built with [`Lazy::cached`] routes each call
//! through a [`Cache`], so repeated reads are cheap while the backing entry is
//! fresh and refresh automatically once it expires.

use std::{any::type_name, fmt, fmt::Debug, hash::Hash, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::Cache;
use crate::error::HydrateError;

type Producer<T> = Arc<dyn Fn() -> Result<T, HydrateError> + Send + Sync>;

/// A value that is not computed until it is read.
pub struct Lazy<T> {
    producer: Producer<T>,
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy").field("type", &type_name::<T>()).finish_non_exhaustive()
    }
}

impl<T: 'static> Lazy<T> {
    /// Plain holder: the producer runs on every read.
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn() -> Result<T, HydrateError> + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Holder whose reads go through `cache` under `key`.
    pub fn cached<K, F>(cache: Arc<Cache<K, T>>, key: K, producer: F) -> Self
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        T: Clone + Send + Sync,
        F: Fn() -> Result<T, HydrateError> + Send + Sync + 'static,
    {
        Self::new(move || cache.get_or_populate(key.clone(), &producer))
    }

    /// Compute (or fetch from cache) the current value.
    pub fn value(&self) -> Result<T, HydrateError> {
        (self.producer)()
    }

    /// Derive a holder that applies `transform` to every value read from this one.
    pub fn map<U, F>(self, transform: F) -> Lazy<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U, HydrateError> + Send + Sync + 'static,
    {
        Lazy::new(move || self.value().and_then(&transform))
    }
}

impl Lazy<Value> {
    /// Convert a raw-value holder into a typed one for the field `field`.
    ///
    /// A raw value that does not deserialize into `T` surfaces as
    /// [`HydrateError::TypeMismatch`] at read time.
    pub fn typed<T>(self, field: &'static str) -> Lazy<T>
    where
        T: DeserializeOwned + 'static,
    {
        self.map(move |raw| serde_json::from_value::<T>(raw).map_err(|error| HydrateError::type_mismatch(field, type_name::<T>(), error)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_producer(counter: &Arc<AtomicUsize>) -> impl Fn() -> Result<usize, HydrateError> + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[test]
    fn plain_holder_reruns_producer_on_each_read() {
        let counter = Arc::new(AtomicUsize::new(0));
        let lazy = Lazy::new(counting_producer(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0, "construction must not produce");

        assert_eq!(lazy.value().unwrap(), 1);
        assert_eq!(lazy.value().unwrap(), 2);
    }

    #[test]
    fn cached_holder_memoizes_through_cache() {
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(Cache::new(&CacheConfig::default()).unwrap());
        let lazy = Lazy::cached(Arc::clone(&cache), "count", counting_producer(&counter));

        assert_eq!(lazy.value().unwrap(), 1);
        assert_eq!(lazy.clone().value().unwrap(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cached_holder_refreshes_after_expiry() {
        let counter = Arc::new(AtomicUsize::new(0));
        let config = CacheConfig::new()
            .with_ttl(Duration::from_millis(20))
            .with_sweep_interval(Duration::from_millis(10));
        let cache = Arc::new(Cache::new(&config).unwrap());
        let lazy = Lazy::cached(cache, "count", counting_producer(&counter));

        assert_eq!(lazy.value().unwrap(), 1);
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(lazy.value().unwrap(), 2);
    }

    #[test]
    fn typed_holder_reports_type_mismatch() {
        let lazy = Lazy::new(|| Ok(json!("not a number"))).typed::<u64>("age");
        match lazy.value() {
            Err(HydrateError::TypeMismatch { field, expected, .. }) => {
                assert_eq!(field, "age");
                assert_eq!(expected, "u64");
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }

        let name = Lazy::new(|| Ok(json!("ada"))).typed::<String>("name");
        assert_eq!(name.value().unwrap(), "ada");
    }
}
