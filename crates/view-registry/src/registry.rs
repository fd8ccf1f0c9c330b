//! Factory registry

use std::collections::HashMap;

use crate::factory::ItemFactory;

/// Mapping from kind identifier to factory descriptor.
///
/// Owns no created views; resolution and caching live in
/// [`GridRegistry`](crate::GridRegistry).
#[derive(Debug, Clone, Default)]
pub struct FactoryRegistry {
    /// Registered factories by identifier
    storage: HashMap<String, ItemFactory>,
    /// The default factory for the registry
    default_item: Option<ItemFactory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `identifier`, replacing any previous one.
    pub fn register(&mut self, identifier: impl Into<String>, factory: ItemFactory) {
        self.storage.insert(identifier.into(), factory);
    }

    /// Set the default factory.
    ///
    /// The default is also registered under its derived identifier
    /// ([`ItemFactory::describe`]). Replacing the default writes the new
    /// derived key only; an entry left under the previous default's
    /// derived key stays in the mapping.
    pub fn set_default(&mut self, factory: ItemFactory) {
        self.storage.insert(factory.describe(), factory.clone());
        self.default_item = Some(factory);
    }

    /// Get the factory registered for `identifier`.
    pub fn lookup(&self, identifier: &str) -> Option<&ItemFactory> {
        self.storage.get(identifier)
    }

    /// The current default factory.
    pub fn default_item(&self) -> Option<&ItemFactory> {
        self.default_item.as_ref()
    }

    /// Derived identifier of the current default factory.
    pub fn default_identifier(&self) -> Option<String> {
        self.default_item.as_ref().map(ItemFactory::describe)
    }

    /// Check if an identifier is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.storage.contains_key(identifier)
    }

    /// All registered identifiers.
    pub fn identifiers(&self) -> Vec<&str> {
        self.storage.keys().map(|k| k.as_str()).collect()
    }

    /// Count of registered factories.
    pub fn count(&self) -> usize {
        self.storage.len()
    }
}
