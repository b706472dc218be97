//! The navigator: dependency-injected composition of the navigation core.
//!
//! The navigator owns the registry, the lifecycle event bus, the
//! current-navigation holder, and the hierarchy builder. The upstream
//! matching engine hands it the context it constructed together with the
//! matched route keys in segment order.

use crate::context::NavigationContext;
use crate::hierarchy::{HierarchyBuilder, NavigationBus, Renderer, EVENT_CHANGE};
use crate::pipeline::{NavigationError, Pipeline};
use crate::registry::RouteRegistry;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use wayline_events::Current;

/// Tracks the most recently completed navigation.
///
/// This is the explicit replacement for the bus internally observing a
/// `change` event: the navigator updates the holder on its completion path,
/// and readers query it directly.
#[derive(Debug, Default)]
pub struct CurrentNavigation {
    inner: Current<NavigationContext>,
}

impl CurrentNavigation {
    /// Create an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Current::new(),
        }
    }

    /// The most recent navigation context, if any navigation has completed.
    #[must_use]
    pub fn context(&self) -> Option<Arc<NavigationContext>> {
        self.inner.get()
    }

    /// The most recent navigation path.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        self.inner.get().map(|ctx| ctx.path.clone())
    }

    /// Record a completed navigation.
    pub fn set(&self, ctx: Arc<NavigationContext>) {
        self.inner.set(ctx);
    }

    /// Forget the current navigation (full teardown or tests).
    pub fn clear(&self) {
        self.inner.clear();
    }
}

/// The assembled navigation engine seam.
pub struct Navigator {
    registry: Arc<RouteRegistry>,
    bus: Arc<NavigationBus>,
    current: Arc<CurrentNavigation>,
    hierarchy: HierarchyBuilder,
}

impl Navigator {
    /// Assemble a navigator with a fresh event bus.
    #[must_use]
    pub fn new(registry: Arc<RouteRegistry>, renderer: Arc<dyn Renderer>) -> Self {
        Self::with_bus(registry, Arc::new(NavigationBus::new()), renderer)
    }

    /// Assemble a navigator sharing an existing event bus.
    #[must_use]
    pub fn with_bus(
        registry: Arc<RouteRegistry>,
        bus: Arc<NavigationBus>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let hierarchy = HierarchyBuilder::new(Arc::clone(&bus), renderer);
        Self {
            registry,
            bus,
            current: Arc::new(CurrentNavigation::new()),
            hierarchy,
        }
    }

    /// The lifecycle event bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<NavigationBus> {
        &self.bus
    }

    /// The route registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// The current-navigation holder.
    #[must_use]
    pub fn current(&self) -> &Arc<CurrentNavigation> {
        &self.current
    }

    /// Run one navigation through compiled route steps.
    ///
    /// Compiles one step per matched route key (in segment order) and runs
    /// the pipeline. On success the context is recorded as current,
    /// [`EVENT_CHANGE`] is published, and the hierarchy is committed. A
    /// failed navigation commits nothing.
    ///
    /// # Errors
    ///
    /// Returns the first step error.
    pub async fn navigate<I, S>(
        &self,
        ctx: NavigationContext,
        matched: I,
    ) -> Result<Arc<NavigationContext>, NavigationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pipeline = Pipeline::for_routes(&self.registry, matched);
        self.navigate_with(ctx, &pipeline).await
    }

    /// Run one navigation through a caller-assembled pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first step error.
    pub async fn navigate_with(
        &self,
        mut ctx: NavigationContext,
        pipeline: &Pipeline,
    ) -> Result<Arc<NavigationContext>, NavigationError> {
        if let Err(error) = pipeline.run(&mut ctx).await {
            warn!(path = %ctx.path, error = %error, "Navigation failed");
            return Err(error);
        }

        let ctx = Arc::new(ctx);
        self.current.set(Arc::clone(&ctx));
        self.bus.publish(EVENT_CHANGE, &ctx);
        self.hierarchy.commit(&ctx);

        debug!(path = %ctx.path, components = ctx.components.len(), "Navigation complete");
        Ok(ctx)
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
