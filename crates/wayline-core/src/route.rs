//! Route table authoring.
//!
//! A route table maps opaque path-pattern keys (matched upstream) to either
//! a bare component or a structured entry carrying a loader, static data,
//! and a preload list.

use crate::component::{Component, Loader};
use crate::context::DataMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A structured route table entry.
///
/// An entry must carry at least one of `component` or `loader`. A violation
/// is reported when the route is first navigated to, naming the route — an
/// authoring bug, not a runtime condition to recover from.
#[derive(Clone, Default)]
pub struct RouteEntry {
    /// Directly supplied renderable, or the cached result of the loader.
    pub component: Option<Component>,
    /// Deferred component source.
    pub loader: Option<Arc<dyn Loader>>,
    /// Static data merged into every navigation to this route.
    pub data: DataMap,
    /// Route keys to warm once this route first renders.
    pub preload: Vec<String>,
}

impl RouteEntry {
    /// Create an empty entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the component.
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.component = Some(component);
        self
    }

    /// Set the loader.
    #[must_use]
    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Set the static data wholesale.
    #[must_use]
    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = data;
        self
    }

    /// Add one static data value.
    #[must_use]
    pub fn with_data_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Set the preload list.
    #[must_use]
    pub fn with_preload<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preload = routes.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("component", &self.component.is_some())
            .field("loader", &self.loader.is_some())
            .field("data", &self.data)
            .field("preload", &self.preload)
            .finish()
    }
}

/// A route table value: either a bare component or a structured entry.
///
/// The bare form is shorthand for an entry with only `component` set; the
/// registry normalizes it on ingest.
#[derive(Clone)]
pub enum RouteTarget {
    /// Bare renderable shorthand.
    Component(Component),
    /// Structured entry.
    Entry(RouteEntry),
}

impl RouteTarget {
    /// Normalize into a structured entry.
    #[must_use]
    pub fn into_entry(self) -> RouteEntry {
        match self {
            RouteTarget::Component(component) => RouteEntry::new().with_component(component),
            RouteTarget::Entry(entry) => entry,
        }
    }
}

impl From<Component> for RouteTarget {
    fn from(component: Component) -> Self {
        RouteTarget::Component(component)
    }
}

impl From<RouteEntry> for RouteTarget {
    fn from(entry: RouteEntry) -> Self {
        RouteTarget::Entry(entry)
    }
}

impl fmt::Debug for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTarget::Component(_) => f.write_str("RouteTarget::Component"),
            RouteTarget::Entry(entry) => f.debug_tuple("RouteTarget::Entry").field(entry).finish(),
        }
    }
}

/// The declarative route table: the authoring surface handed to the
/// registry.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteTarget>,
}

impl RouteTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bare component route.
    #[must_use]
    pub fn component(mut self, key: impl Into<String>, component: Component) -> Self {
        self.routes.insert(key.into(), component.into());
        self
    }

    /// Register a route target (structured entry or bare component).
    #[must_use]
    pub fn entry(mut self, key: impl Into<String>, target: impl Into<RouteTarget>) -> Self {
        self.routes.insert(key.into(), target.into());
        self
    }

    /// Insert a route target.
    pub fn insert(&mut self, key: impl Into<String>, target: impl Into<RouteTarget>) {
        self.routes.insert(key.into(), target.into());
    }

    /// Look up a route target.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RouteTarget> {
        self.routes.get(key)
    }

    /// Check whether a key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn into_routes(self) -> HashMap<String, RouteTarget> {
        self.routes
    }
}
