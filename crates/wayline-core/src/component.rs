//! Opaque renderable handles and deferred loaders.
//!
//! The core never interprets a component: it is an identifier handed back to
//! the rendering engine. `Component` wraps any `Send + Sync` value and clones
//! by reference count, so caching and tree building stay cheap.

use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// An opaque, cheaply cloneable reference to something the UI engine can
/// render.
#[derive(Clone)]
pub struct Component {
    inner: Arc<dyn Any + Send + Sync>,
}

impl Component {
    /// Wrap a renderable value.
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the wrapped value if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Check the wrapped value's type.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Check whether two handles point at the same wrapped value.
    #[must_use]
    pub fn same(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component").finish_non_exhaustive()
    }
}

/// Error produced by a component loader.
///
/// Loader errors are cloneable so one in-flight load can report the same
/// failure to every navigation awaiting it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Create a loader error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A deferred component source.
///
/// A loader is invoked when its route is first navigated to (or preloaded)
/// and must eventually yield the renderable component. The registry caches
/// the result, so a loader runs at most once per successful load.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Produce the component.
    async fn load(&self) -> Result<Component, LoadError>;
}

/// Adapter turning an async closure into a [`Loader`].
///
/// Built with [`loader_fn`].
pub struct LoaderFn<F> {
    f: F,
}

/// Wrap an async closure as a [`Loader`].
pub fn loader_fn<F, Fut>(f: F) -> LoaderFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Component, LoadError>> + Send,
{
    LoaderFn { f }
}

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Component, LoadError>> + Send,
{
    async fn load(&self) -> Result<Component, LoadError> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_downcast() {
        let component = Component::new("Home");
        assert!(component.is::<&str>());
        assert_eq!(component.downcast_ref::<&str>(), Some(&"Home"));
        assert!(component.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_component_identity() {
        let a = Component::new("Home");
        let b = a.clone();
        let c = Component::new("Home");

        assert!(a.same(&b));
        assert!(!a.same(&c));
    }

    #[tokio::test]
    async fn test_loader_fn() {
        let loader = loader_fn(|| async { Ok(Component::new("Lazy")) });
        let component = loader.load().await.unwrap();
        assert_eq!(component.downcast_ref::<&str>(), Some(&"Lazy"));
    }

    #[tokio::test]
    async fn test_loader_fn_error() {
        let loader = loader_fn(|| async { Err(LoadError::new("chunk fetch failed")) });
        let error = loader.load().await.unwrap_err();
        assert_eq!(error.message(), "chunk fetch failed");
    }
}
