//! Item capability and template-bundle collaborators

use std::any::Any;

use thiserror::Error;

/// A reusable grid element.
///
/// Implementors are opaque to the registry: it constructs them, caches
/// them, and hands them out, but never inspects them beyond this trait.
pub trait ItemView: Any + Send + Sync {
    /// Downcast access for callers that know the concrete view type.
    fn as_any(&self) -> &dyn Any;
}

/// Template instantiation error.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    #[error("template source missing: {0}")]
    Missing(String),
    #[error("template failed to instantiate: {0}")]
    Instantiate(String),
}

impl From<anyhow::Error> for TemplateError {
    fn from(err: anyhow::Error) -> Self {
        Self::Instantiate(err.to_string())
    }
}

/// One top-level object produced by instantiating a template bundle.
///
/// Bundles are heterogeneous: alongside the view they may contain owners,
/// controllers, or other objects the registry has no use for.
pub struct BundleObject(Box<dyn Any + Send + Sync>);

impl BundleObject {
    /// Wrap an object that carries the [`ItemView`] capability.
    pub fn item<V: ItemView>(view: V) -> Self {
        Self(Box::new(Box::new(view) as Box<dyn ItemView>))
    }

    /// Wrap any other top-level object.
    pub fn other<T: Any + Send + Sync>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Does this object carry the item capability?
    pub fn is_item(&self) -> bool {
        self.0.is::<Box<dyn ItemView>>()
    }

    pub(crate) fn into_item(self) -> Option<Box<dyn ItemView>> {
        self.0.downcast::<Box<dyn ItemView>>().ok().map(|boxed| *boxed)
    }
}

/// A loadable resource bundle yielding top-level objects.
///
/// When several objects carry the item capability, the first in iteration
/// order wins; that order is the loader's and is not guaranteed.
pub trait TemplateBundle: Send + Sync {
    /// Instantiate the bundle and return its top-level objects.
    fn instantiate(&self) -> Result<Vec<BundleObject>, TemplateError>;
}
