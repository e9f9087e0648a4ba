//! Opt-in schema memoization
//!
//! One slot per type. Concurrent first calls for the same type build it once;
//! the others wait on the slot and share the result. Failed builds leave the
//! slot empty, so a schema violation is reported on every call.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::config::MapperConfig;
use crate::conversion::TypeKey;
use crate::observability::{log_event_with_fields, Event, Severity};

use super::builder::SchemaBuilder;
use super::descriptor::Mapped;
use super::errors::SchemaResult;
use super::metadata::TypeMetadata;

type Slot = Arc<OnceCell<Arc<TypeMetadata>>>;

pub struct SchemaCache {
    enabled: bool,
    slots: RwLock<HashMap<TypeKey, Slot>>,
}

impl SchemaCache {
    /// An enabled cache.
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// A cache that never stores; every call builds.
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    pub fn from_config(config: &MapperConfig) -> Self {
        Self::with_enabled(config.cache_schemas)
    }

    fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the metadata for `T`, building it on first use.
    pub fn get_or_parse<T: Mapped>(&self) -> SchemaResult<Arc<TypeMetadata>> {
        if !self.enabled {
            return SchemaBuilder::parse::<T>().map(Arc::new);
        }

        let key = TypeKey::of::<T>();
        let slot = self.slot(key);
        if let Some(metadata) = slot.get() {
            log_event_with_fields(Severity::Trace, Event::SchemaCacheHit, &[("type", key.name())]);
            return Ok(Arc::clone(metadata));
        }

        slot.get_or_try_init(|| SchemaBuilder::parse::<T>().map(Arc::new))
            .map(Arc::clone)
    }

    /// Number of types with a stored schema
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.write().clear();
    }

    fn slot(&self, key: TypeKey) -> Slot {
        if let Some(slot) = self.slots.read().get(&key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(key).or_default())
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::descriptor::{FieldDescriptor, Marking, TypeDescriptor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Mapped for Counted {
        fn descriptor() -> TypeDescriptor {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            TypeDescriptor::class::<Counted>().field(FieldDescriptor::new::<i64>("id").marked(Marking::Key))
        }
    }

    struct Broken;

    impl Mapped for Broken {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::class::<Broken>().sealed(true)
        }
    }

    struct Plain;

    impl Mapped for Plain {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::class::<Plain>()
        }
    }

    #[test]
    fn test_single_flight_across_threads() {
        let cache = Arc::new(SchemaCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_parse::<Counted>().unwrap())
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = SchemaCache::new();
        assert!(cache.get_or_parse::<Broken>().is_err());
        assert!(cache.get_or_parse::<Broken>().is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_cache_rebuilds() {
        let cache = SchemaCache::from_config(&MapperConfig::default());
        assert!(!cache.is_enabled());
        let first = cache.get_or_parse::<Plain>().unwrap();
        let second = cache.get_or_parse::<Plain>().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
    }
}
