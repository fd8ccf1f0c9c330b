//! Factory descriptors and cache-key derivation

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::item::{ItemView, TemplateBundle};

/// Tag distinguishing the two factory strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// Constructed from a registered view type.
    Class,
    /// Instantiated from a template bundle.
    Template,
}

impl RegistryKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Template => "template",
        }
    }
}

/// Derive the composite cache key for a (kind, identifier) pair.
///
/// The kind tag prefixes the full identifier, so a class registration and
/// a template registration under the same identifier never alias, and
/// distinct identifiers never collide.
pub(crate) fn cache_key(kind: RegistryKind, identifier: &str) -> String {
    format!("{}:{}", kind.tag(), identifier)
}

/// Zero-argument constructor for a concrete view type.
#[derive(Clone)]
pub struct ClassFactory {
    type_name: &'static str,
    construct: Arc<dyn Fn() -> Arc<dyn ItemView> + Send + Sync>,
}

impl ClassFactory {
    /// Describe on-demand construction of `V`.
    pub fn of<V: ItemView + Default>() -> Self {
        Self {
            type_name: std::any::type_name::<V>(),
            construct: Arc::new(|| Arc::new(V::default())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn construct(&self) -> Arc<dyn ItemView> {
        (self.construct)()
    }
}

impl fmt::Debug for ClassFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassFactory").field(&self.type_name).finish()
    }
}

/// Named handle to a loadable template bundle.
#[derive(Clone)]
pub struct TemplateFactory {
    name: String,
    bundle: Arc<dyn TemplateBundle>,
}

impl TemplateFactory {
    pub fn new(name: impl Into<String>, bundle: Arc<dyn TemplateBundle>) -> Self {
        Self {
            name: name.into(),
            bundle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bundle(&self) -> &dyn TemplateBundle {
        self.bundle.as_ref()
    }
}

impl fmt::Debug for TemplateFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TemplateFactory").field(&self.name).finish()
    }
}

/// Stored recipe for producing a view.
#[derive(Debug, Clone)]
pub enum ItemFactory {
    /// Construct a fresh instance of a registered view type.
    Class(ClassFactory),
    /// Instantiate a template bundle and take its first item.
    Template(TemplateFactory),
}

impl ItemFactory {
    /// Class-factory descriptor for view type `V`.
    pub fn class<V: ItemView + Default>() -> Self {
        Self::Class(ClassFactory::of::<V>())
    }

    /// Template-factory descriptor backed by `bundle`.
    pub fn template(name: impl Into<String>, bundle: Arc<dyn TemplateBundle>) -> Self {
        Self::Template(TemplateFactory::new(name, bundle))
    }

    /// Which strategy this descriptor uses.
    pub fn kind(&self) -> RegistryKind {
        match self {
            Self::Class(_) => RegistryKind::Class,
            Self::Template(_) => RegistryKind::Template,
        }
    }

    /// Stable textual description, used as the derived default identifier.
    pub fn describe(&self) -> String {
        match self {
            Self::Class(factory) => format!("class({})", factory.type_name()),
            Self::Template(factory) => format!("template({})", factory.name()),
        }
    }
}
