//! # wayline-core
//!
//! Route registry, navigation pipeline, and hierarchy builder for the
//! Wayline navigation engine.
//!
//! The crate turns a declarative route table into a running pipeline: given
//! a requested path, it determines which components render, supplies them
//! with data, supports lazily-loaded components, speculatively preloads
//! likely next routes, and folds the matched components into one nested
//! parent/child prop tree for the rendering engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ RouteTable │────▶│ RouteRegistry │────▶│ Pipeline (steps) │
//! └────────────┘     └───────────────┘     └──────────────────┘
//!                                                    │
//!                                                    ▼
//!                    ┌──────────────┐     ┌──────────────────┐
//!                    │   EventBus   │◀────│ HierarchyBuilder │──▶ Renderer
//!                    └──────────────┘     └──────────────────┘
//! ```
//!
//! Path matching itself lives upstream: the matching engine constructs a
//! [`NavigationContext`] per navigation and hands it, with the matched route
//! keys, to a [`Navigator`].

pub mod component;
pub mod context;
pub mod hierarchy;
pub mod middleware;
pub mod navigator;
pub mod pipeline;
pub mod registry;
pub mod route;

pub use component::{loader_fn, Component, LoadError, Loader, LoaderFn};
pub use context::{
    DataMap, MatchedComponent, NavigationContext, STATE_PATH_KEY, WHOLE_MATCH_KEY,
};
pub use hierarchy::{
    fold, HierarchyBuilder, NavigationBus, PageNode, PageProps, Renderer, RootProps,
    EVENT_BEFORE_NAVIGATION, EVENT_CHANGE, EVENT_NAVIGATION,
};
pub use middleware::{compile, merge_route_data, RouteStep};
pub use navigator::{CurrentNavigation, Navigator};
pub use pipeline::{NavigationError, Pipeline, Step};
pub use registry::{RegistryConfig, RegistryStats, ResolvedRoute, RouteError, RouteRegistry};
pub use route::{RouteEntry, RouteTable, RouteTarget};
