//! # Gridkit View Registry
//!
//! Resolves a logical view "kind" to a reusable view instance. Factories
//! are registered per identifier, either as a constructible view type or
//! as a template bundle; resolution instantiates at most one view per
//! (strategy, identifier) pair and serves the cached instance afterwards,
//! until the cache is purged.

pub mod cache;
pub mod factory;
pub mod item;
pub mod registry;

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

pub use cache::{BoundedStore, CacheStore, MemoryStore};
pub use factory::{ClassFactory, ItemFactory, RegistryKind, TemplateFactory};
pub use item::{BundleObject, ItemView, TemplateBundle, TemplateError};
pub use registry::FactoryRegistry;

use factory::cache_key;

/// Process-wide view registry.
pub static VIEWS: Lazy<GridRegistry> = Lazy::new(GridRegistry::new);

/// Outcome of resolving a registered identifier.
///
/// `item` is `None` when the factory exists but produced nothing, which
/// is distinct from the identifier not being registered at all.
#[derive(Clone)]
pub struct Resolved {
    /// Strategy of the factory that was consulted
    pub kind: RegistryKind,
    /// The resolved view, absent on creation failure
    pub item: Option<Arc<dyn ItemView>>,
}

/// Factory registry paired with an instance cache.
pub struct GridRegistry {
    registry: RwLock<FactoryRegistry>,
    cache: Box<dyn CacheStore>,
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Use a caller-provided cache substrate.
    pub fn with_store(cache: Box<dyn CacheStore>) -> Self {
        Self {
            registry: RwLock::new(FactoryRegistry::new()),
            cache,
        }
    }

    /// Register a factory for `identifier`, replacing any previous one.
    pub fn register(&self, identifier: impl Into<String>, factory: ItemFactory) {
        self.registry.write().register(identifier, factory);
    }

    /// Set the default factory (see [`FactoryRegistry::set_default`]).
    pub fn set_default(&self, factory: ItemFactory) {
        tracing::debug!(key = %factory.describe(), "setting default factory");
        self.registry.write().set_default(factory);
    }

    /// Get the factory registered for `identifier`.
    pub fn lookup(&self, identifier: &str) -> Option<ItemFactory> {
        self.registry.read().lookup(identifier).cloned()
    }

    /// Check if an identifier is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.registry.read().contains(identifier)
    }

    /// Derived identifier of the current default factory.
    pub fn default_identifier(&self) -> Option<String> {
        self.registry.read().default_identifier()
    }

    /// Resolve `identifier` to its view, creating and caching on first use.
    ///
    /// Returns `None` for an unregistered identifier. A registered
    /// identifier always yields the factory kind; the item is `None` when
    /// creation failed. Nothing is cached on failure, so the next call
    /// retries creation.
    pub fn resolve(&self, identifier: &str) -> Option<Resolved> {
        let factory = self.registry.read().lookup(identifier).cloned()?;
        let kind = factory.kind();
        let key = cache_key(kind, identifier);

        if let Some(item) = self.cache.get(&key) {
            tracing::trace!(identifier, kind = kind.tag(), "cache hit");
            return Some(Resolved {
                kind,
                item: Some(item),
            });
        }

        let item = match &factory {
            ItemFactory::Class(class) => Some(class.construct()),
            ItemFactory::Template(template) => match template.bundle().instantiate() {
                Ok(objects) => {
                    let item = objects.into_iter().find_map(BundleObject::into_item);
                    if item.is_none() {
                        tracing::debug!(identifier, "template bundle yielded no item");
                    }
                    item.map(Arc::from)
                }
                Err(err) => {
                    tracing::warn!(identifier, error = %err, "template instantiation failed");
                    None
                }
            },
        };

        if let Some(ref item) = item {
            self.cache.insert(key, Arc::clone(item));
        }

        Some(Resolved { kind, item })
    }

    /// Drop every cached view. Registrations are untouched.
    pub fn purge(&self) {
        self.cache.clear();
    }

    /// Count of currently cached views.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl Default for GridRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CardView;

    impl ItemView for CardView {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct RowView;

    impl ItemView for RowView {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Bundle yielding a view among unrelated top-level objects.
    struct RowTemplate;

    impl TemplateBundle for RowTemplate {
        fn instantiate(&self) -> Result<Vec<BundleObject>, TemplateError> {
            Ok(vec![
                BundleObject::other("file owner"),
                BundleObject::item(RowView),
                BundleObject::item(RowView),
            ])
        }
    }

    /// Bundle whose objects never carry the item capability.
    struct EmptyTemplate;

    impl TemplateBundle for EmptyTemplate {
        fn instantiate(&self) -> Result<Vec<BundleObject>, TemplateError> {
            Ok(vec![BundleObject::other(42u32)])
        }
    }

    /// Bundle that fails to instantiate, counting attempts.
    #[derive(Default)]
    struct BrokenTemplate {
        attempts: Arc<AtomicUsize>,
    }

    impl TemplateBundle for BrokenTemplate {
        fn instantiate(&self) -> Result<Vec<BundleObject>, TemplateError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(TemplateError::Missing("row.template".into()))
        }
    }

    #[test]
    fn test_unknown_identifier_resolves_to_none() {
        let views = GridRegistry::new();
        assert!(views.resolve("card").is_none());
    }

    #[test]
    fn test_resolution_is_identity_stable() {
        let views = GridRegistry::new();
        views.register("card", ItemFactory::class::<CardView>());

        let first = views.resolve("card").unwrap();
        let second = views.resolve("card").unwrap();

        assert_eq!(first.kind, RegistryKind::Class);
        assert!(Arc::ptr_eq(
            first.item.as_ref().unwrap(),
            second.item.as_ref().unwrap(),
        ));
        assert_eq!(views.cached(), 1);
    }

    #[test]
    fn test_purge_yields_a_fresh_instance() {
        let views = GridRegistry::new();
        views.register("card", ItemFactory::class::<CardView>());

        let before = views.resolve("card").unwrap().item.unwrap();
        views.purge();
        assert_eq!(views.cached(), 0);

        let after = views.resolve("card").unwrap().item.unwrap();
        assert!(!Arc::ptr_eq(&before, &after));

        // Registrations survive the purge.
        assert!(views.contains("card"));
    }

    #[test]
    fn test_purge_is_idempotent() {
        let views = GridRegistry::new();
        views.purge();
        views.purge();
        assert_eq!(views.cached(), 0);
    }

    #[test]
    fn test_distinct_identifiers_never_share_instances() {
        let views = GridRegistry::new();
        views.register("card", ItemFactory::class::<CardView>());
        views.register("card.compact", ItemFactory::class::<CardView>());

        let a = views.resolve("card").unwrap().item.unwrap();
        let b = views.resolve("card.compact").unwrap().item.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_template_takes_first_matching_object() {
        let views = GridRegistry::new();
        views.register("row", ItemFactory::template("row", Arc::new(RowTemplate)));

        let resolved = views.resolve("row").unwrap();
        assert_eq!(resolved.kind, RegistryKind::Template);

        let item = resolved.item.unwrap();
        assert!(item.as_any().is::<RowView>());

        let again = views.resolve("row").unwrap().item.unwrap();
        assert!(Arc::ptr_eq(&item, &again));
    }

    #[test]
    fn test_empty_template_resolves_to_kind_without_item() {
        let views = GridRegistry::new();
        views.register("row", ItemFactory::template("row", Arc::new(EmptyTemplate)));

        let resolved = views.resolve("row").unwrap();
        assert_eq!(resolved.kind, RegistryKind::Template);
        assert!(resolved.item.is_none());
        assert_eq!(views.cached(), 0);
    }

    #[test]
    fn test_failed_creation_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let bundle = BrokenTemplate {
            attempts: Arc::clone(&attempts),
        };

        let views = GridRegistry::new();
        views.register("row", ItemFactory::template("row", Arc::new(bundle)));

        assert!(views.resolve("row").unwrap().item.is_none());
        assert!(views.resolve("row").unwrap().item.is_none());

        // Nothing was cached, so every resolve re-ran the bundle.
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_replacing_strategy_does_not_alias_cache_entries() {
        let views = GridRegistry::new();
        views.register("card", ItemFactory::class::<CardView>());
        let class_item = views.resolve("card").unwrap().item.unwrap();

        views.register("card", ItemFactory::template("card", Arc::new(RowTemplate)));
        let resolved = views.resolve("card").unwrap();

        assert_eq!(resolved.kind, RegistryKind::Template);
        assert!(!Arc::ptr_eq(&class_item, resolved.item.as_ref().unwrap()));
    }

    #[test]
    fn test_default_factory_is_registered_under_derived_key() {
        let views = GridRegistry::new();
        views.set_default(ItemFactory::class::<CardView>());

        let derived = views.default_identifier().unwrap();
        assert!(views.contains(&derived));

        let resolved = views.resolve(&derived).unwrap();
        assert_eq!(resolved.kind, RegistryKind::Class);
        assert!(resolved.item.unwrap().as_any().is::<CardView>());
    }

    #[test]
    fn test_eviction_surfaces_as_a_plain_miss() {
        let views = GridRegistry::with_store(Box::new(BoundedStore::new(1)));
        views.register("card", ItemFactory::class::<CardView>());
        views.register("row", ItemFactory::class::<RowView>());

        let first = views.resolve("card").unwrap().item.unwrap();
        views.resolve("row").unwrap();

        // "card" was evicted by the bounded store; resolve recreates it.
        let second = views.resolve("card").unwrap().item.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
