//! Route-to-middleware compilation.
//!
//! `compile` turns one route key into a reusable pipeline step. Each run
//! resolves the route's component (suspending on a loader), merges route
//! data for the navigation, appends the match to the context, and triggers
//! preload scheduling.

use crate::context::{
    DataMap, MatchedComponent, NavigationContext, STATE_PATH_KEY, WHOLE_MATCH_KEY,
};
use crate::pipeline::{NavigationError, Step};
use crate::registry::RouteRegistry;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

/// Compile the pipeline step for one route key.
///
/// Called once per route registration; the returned step is reused across
/// navigations to that route.
#[must_use]
pub fn compile(registry: Arc<RouteRegistry>, route: impl Into<String>) -> RouteStep {
    RouteStep {
        registry,
        route: route.into(),
    }
}

/// A compiled navigation step bound to one route key.
#[derive(Debug, Clone)]
pub struct RouteStep {
    registry: Arc<RouteRegistry>,
    route: String,
}

impl RouteStep {
    /// The route key this step serves.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }
}

#[async_trait]
impl Step for RouteStep {
    async fn run(&self, ctx: &mut NavigationContext) -> Result<(), NavigationError> {
        let resolved = self.registry.resolve(&self.route).await?;
        let data = merge_route_data(&resolved.data, ctx);

        trace!(route = %self.route, path = %ctx.path, "Matched component");
        ctx.components.push(MatchedComponent {
            component: resolved.component,
            data,
        });

        if resolved.has_preload && self.registry.begin_preload(&self.route) {
            let registry = Arc::clone(&self.registry);
            let route = self.route.clone();
            tokio::spawn(async move {
                registry.preload(&route).await;
            });
        }

        Ok(())
    }
}

/// Merge route data for one navigation.
///
/// Precedence, later overriding earlier: the entry's static data, then the
/// navigation state without [`STATE_PATH_KEY`], then the matched params
/// without [`WHOLE_MATCH_KEY`] under a `"params"` key (omitted when no
/// params remain).
#[must_use]
pub fn merge_route_data(static_data: &DataMap, ctx: &NavigationContext) -> DataMap {
    let mut merged = static_data.clone();

    for (key, value) in &ctx.state {
        if key != STATE_PATH_KEY {
            merged.insert(key.clone(), value.clone());
        }
    }

    let params: DataMap = ctx
        .params
        .iter()
        .filter(|(name, _)| name.as_str() != WHOLE_MATCH_KEY)
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    if !params.is_empty() {
        merged.insert("params".to_string(), Value::Object(params));
    }

    merged
}
