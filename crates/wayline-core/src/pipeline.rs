//! The navigation pipeline.
//!
//! A pipeline is an ordered list of steps, one per matched route segment,
//! plus any application-supplied guards. Steps are awaited in sequence:
//! an `Ok` return advances to the next step, an error halts the navigation.

use crate::context::NavigationContext;
use crate::middleware;
use crate::registry::{RouteError, RouteRegistry};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// A route could not be resolved.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A step refused to advance the navigation.
    #[error("navigation halted: {0}")]
    Halted(String),
}

/// One unit of navigation processing.
///
/// Completion of `run` is the continuation: an `Ok` return advances the
/// pipeline, an `Err` halts it. A step that never completes stalls its
/// navigation indefinitely; no timeout is applied.
#[async_trait]
pub trait Step: Send + Sync {
    /// Process one navigation.
    async fn run(&self, ctx: &mut NavigationContext) -> Result<(), NavigationError>;
}

/// An ordered sequence of navigation steps.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Compile one route step per matched segment, in match order.
    #[must_use]
    pub fn for_routes<I, S>(registry: &Arc<RouteRegistry>, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pipeline = Self::new();
        for route in routes {
            pipeline.push(middleware::compile(Arc::clone(registry), route));
        }
        pipeline
    }

    /// Append a step.
    pub fn push(&mut self, step: impl Step + 'static) {
        self.steps.push(Box::new(step));
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check whether the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order against the context.
    ///
    /// # Errors
    ///
    /// Returns the first step error; later steps do not run.
    pub async fn run(&self, ctx: &mut NavigationContext) -> Result<(), NavigationError> {
        trace!(path = %ctx.path, steps = self.steps.len(), "Running pipeline");
        for step in &self.steps {
            step.run(ctx).await?;
        }
        debug!(path = %ctx.path, components = ctx.components.len(), "Pipeline complete");
        Ok(())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}
