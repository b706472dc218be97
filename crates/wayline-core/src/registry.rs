//! Route registry: the single owner of shared route state.
//!
//! The registry ingests a [`RouteTable`], normalizes bare targets into
//! structured entries, and serves component resolution for every navigation.
//! Loader results are cached back onto the route (last-writer-wins), so a
//! route loads at most once; concurrent navigations to a still-loading route
//! share the in-flight load. The per-route preload flag and in-flight slot
//! live here as plain fields, so their lifecycle is inspectable and
//! resettable.

use crate::component::{Component, LoadError, Loader};
use crate::context::DataMap;
use crate::route::RouteTable;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Registry errors.
#[derive(Debug, Error)]
pub enum RouteError {
    /// No route registered under the requested key.
    #[error("unknown route \"{0}\"")]
    UnknownRoute(String),

    /// The route has neither a component nor a loader.
    #[error("no component or loader for route \"{0}\"")]
    Unrenderable(String),

    /// The route's loader failed.
    #[error("loader for route \"{route}\" failed: {source}")]
    LoaderFailed {
        /// The route whose loader failed.
        route: String,
        /// The loader's error.
        #[source]
        source: LoadError,
    },
}

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Share one in-flight load between concurrent navigations to the same
    /// still-loading route. Disable to re-invoke the loader per navigation.
    pub coalesce_loads: bool,
    /// Whether preload lists are honored at all.
    pub preload: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            coalesce_loads: true,
            preload: true,
        }
    }
}

/// Outcome of resolving a route for one navigation.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    /// The renderable for the route.
    pub component: Component,
    /// The route's static data.
    pub data: DataMap,
    /// Whether the route carries a preload list.
    pub has_preload: bool,
}

type SharedLoad = Shared<BoxFuture<'static, Result<Component, LoadError>>>;

/// Per-route owned state.
struct RouteState {
    component: Option<Component>,
    loader: Option<Arc<dyn Loader>>,
    data: DataMap,
    preload: Vec<String>,
    /// Set once the route's preload list has been scheduled.
    preload_scheduled: AtomicBool,
    /// The shared in-flight load, while one is running.
    inflight: Mutex<Option<SharedLoad>>,
}

impl RouteState {
    fn new(entry: crate::route::RouteEntry) -> Self {
        Self {
            component: entry.component,
            loader: entry.loader,
            data: entry.data,
            preload: entry.preload,
            preload_scheduled: AtomicBool::new(false),
            inflight: Mutex::new(None),
        }
    }
}

/// Registry statistics.
#[derive(Debug, Clone)]
pub struct RegistryStats {
    /// Number of registered routes.
    pub route_count: usize,
    /// Number of routes with a resolved component.
    pub resolved_count: usize,
}

/// The single owner of shared route state.
///
/// All mutation of route entries — normalization, resolved-component
/// caching, preload flags — goes through this type, with last-writer-wins
/// semantics for component caching.
pub struct RouteRegistry {
    routes: DashMap<String, RouteState>,
    config: RegistryConfig,
}

impl RouteRegistry {
    /// Ingest a route table with default configuration.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self::with_config(table, RegistryConfig::default())
    }

    /// Ingest a route table with custom configuration.
    #[must_use]
    pub fn with_config(table: RouteTable, config: RegistryConfig) -> Self {
        let routes = DashMap::new();
        for (key, target) in table.into_routes() {
            routes.insert(key, RouteState::new(target.into_entry()));
        }
        info!(routes = routes.len(), "Created route registry");
        Self { routes, config }
    }

    /// Resolve the component for a route.
    ///
    /// The fast path returns the cached component synchronously. When only a
    /// loader is present, the call suspends until the loader completes and
    /// caches the result for later navigations.
    ///
    /// # Errors
    ///
    /// Returns an error if the route is unknown, has neither component nor
    /// loader, or its loader fails. A failed load is not cached: the next
    /// navigation re-invokes the loader.
    pub async fn resolve(&self, key: &str) -> Result<ResolvedRoute, RouteError> {
        let (load, data, has_preload) = {
            let state = self
                .routes
                .get(key)
                .ok_or_else(|| RouteError::UnknownRoute(key.to_string()))?;

            if let Some(component) = &state.component {
                trace!(route = %key, "Resolved from cache");
                return Ok(ResolvedRoute {
                    component: component.clone(),
                    data: state.data.clone(),
                    has_preload: !state.preload.is_empty(),
                });
            }

            let Some(loader) = state.loader.clone() else {
                return Err(RouteError::Unrenderable(key.to_string()));
            };

            (
                self.begin_load(key, &state, loader),
                state.data.clone(),
                !state.preload.is_empty(),
            )
        };
        // The map guard is released before the load is awaited.

        match load.await {
            Ok(component) => {
                self.cache_component(key, component.clone());
                Ok(ResolvedRoute {
                    component,
                    data,
                    has_preload,
                })
            }
            Err(source) => {
                self.clear_inflight(key);
                Err(RouteError::LoaderFailed {
                    route: key.to_string(),
                    source,
                })
            }
        }
    }

    /// Start (or join) the loader for a route.
    fn begin_load(&self, key: &str, state: &RouteState, loader: Arc<dyn Loader>) -> SharedLoad {
        if !self.config.coalesce_loads {
            debug!(route = %key, "Invoking loader (uncoalesced)");
            return async move { loader.load().await }.boxed().shared();
        }

        let mut inflight = state.inflight.lock().expect("inflight lock poisoned");
        if let Some(load) = inflight.as_ref() {
            trace!(route = %key, "Joining in-flight load");
            return load.clone();
        }

        debug!(route = %key, "Invoking loader");
        let load = async move { loader.load().await }.boxed().shared();
        *inflight = Some(load.clone());
        load
    }

    /// Cache a resolved component onto a route (last-writer-wins).
    ///
    /// Later navigations to the route resolve synchronously without touching
    /// the loader again.
    pub fn cache_component(&self, key: &str, component: Component) {
        if let Some(mut state) = self.routes.get_mut(key) {
            state.component = Some(component);
            if let Ok(mut inflight) = state.inflight.lock() {
                *inflight = None;
            }
            debug!(route = %key, "Cached resolved component");
        }
    }

    fn clear_inflight(&self, key: &str) {
        if let Some(state) = self.routes.get(key) {
            if let Ok(mut inflight) = state.inflight.lock() {
                *inflight = None;
            }
        }
    }

    /// Claim the right to schedule a route's preload list.
    ///
    /// Returns `true` exactly once per route for the registry's lifetime
    /// (unless reset); later calls, and calls for routes without preload
    /// targets, return `false`. Returns `false` for every route when
    /// preloading is disabled in the configuration.
    pub fn begin_preload(&self, key: &str) -> bool {
        if !self.config.preload {
            return false;
        }
        let Some(state) = self.routes.get(key) else {
            return false;
        };
        if state.preload.is_empty() {
            return false;
        }
        if state.preload_scheduled.swap(true, Ordering::SeqCst) {
            trace!(route = %key, "Preload already scheduled");
            return false;
        }
        debug!(route = %key, targets = state.preload.len(), "Preload claimed");
        true
    }

    /// Warm every target in a route's preload list.
    ///
    /// Best-effort: targets that are unregistered, already resolved, or have
    /// no loader are skipped, and failures are logged and swallowed. Never
    /// affects any navigation's success.
    pub async fn preload(&self, key: &str) {
        let targets = match self.routes.get(key) {
            Some(state) => state.preload.clone(),
            None => return,
        };
        for target in targets {
            self.warm(&target).await;
        }
    }

    /// Warm a single route: invoke its loader and cache the result.
    pub async fn warm(&self, key: &str) {
        let load = {
            let Some(state) = self.routes.get(key) else {
                debug!(route = %key, "Preload target not registered, skipping");
                return;
            };
            if state.component.is_some() {
                trace!(route = %key, "Preload target already resolved");
                return;
            }
            let Some(loader) = state.loader.clone() else {
                debug!(route = %key, "Preload target has no loader, skipping");
                return;
            };
            self.begin_load(key, &state, loader)
        };

        match load.await {
            Ok(component) => {
                self.cache_component(key, component);
                debug!(route = %key, "Preloaded component");
            }
            Err(error) => {
                self.clear_inflight(key);
                debug!(route = %key, error = %error, "Preload failed, ignoring");
            }
        }
    }

    /// Check whether a route is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    /// Check whether a route's component is resolved (cached).
    #[must_use]
    pub fn is_resolved(&self, key: &str) -> bool {
        self.routes
            .get(key)
            .map(|s| s.component.is_some())
            .unwrap_or(false)
    }

    /// Check whether a route's preload list has been scheduled.
    #[must_use]
    pub fn has_preload_scheduled(&self, key: &str) -> bool {
        self.routes
            .get(key)
            .map(|s| s.preload_scheduled.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Reset a route's preload flag so the next navigation reschedules it.
    pub fn reset_preload(&self, key: &str) {
        if let Some(state) = self.routes.get(key) {
            state.preload_scheduled.store(false, Ordering::SeqCst);
        }
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All registered route keys.
    #[must_use]
    pub fn route_keys(&self) -> Vec<String> {
        self.routes.iter().map(|e| e.key().clone()).collect()
    }

    /// The registry's configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            route_count: self.routes.len(),
            resolved_count: self
                .routes
                .iter()
                .filter(|e| e.component.is_some())
                .count(),
        }
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.routes.len())
            .field("config", &self.config)
            .finish()
    }
}
