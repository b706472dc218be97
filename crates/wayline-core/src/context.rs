//! Per-navigation state.

use crate::component::Component;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Arbitrary key/value data attached to routes and navigations.
pub type DataMap = Map<String, Value>;

/// Params key under which the matching engine may store the whole-path
/// match. Discarded when params are merged into route data.
pub const WHOLE_MATCH_KEY: &str = "0";

/// State key that mirrors the navigation path upstream. Excluded from merged
/// route data.
pub const STATE_PATH_KEY: &str = "path";

/// A component matched for one route segment, with its merged data.
#[derive(Debug, Clone)]
pub struct MatchedComponent {
    /// The renderable for this segment.
    pub component: Component,
    /// Merged route data for this segment.
    pub data: DataMap,
}

/// The mutable per-navigation record.
///
/// Created by the upstream matching engine, appended to by each pipeline
/// step, consumed once by the hierarchy builder, then discarded.
#[derive(Debug, Default, Serialize)]
pub struct NavigationContext {
    /// The requested path.
    pub path: String,
    /// Route variables matched upstream. May contain [`WHOLE_MATCH_KEY`].
    pub params: HashMap<String, String>,
    /// Navigation-scoped state. May contain [`STATE_PATH_KEY`].
    pub state: DataMap,
    /// Matched components in route-segment order, appended during the run.
    #[serde(skip)]
    pub components: Vec<MatchedComponent>,
}

impl NavigationContext {
    /// Create a context for a path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Attach matched params.
    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Attach one matched param.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Attach navigation state.
    #[must_use]
    pub fn with_state(mut self, state: DataMap) -> Self {
        self.state = state;
        self
    }

    /// Attach one state value.
    #[must_use]
    pub fn with_state_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.state.insert(key.into(), value);
        self
    }

    /// Number of components matched so far.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.components.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_builders() {
        let ctx = NavigationContext::new("/users/42")
            .with_param("id", "42")
            .with_param(WHOLE_MATCH_KEY, "/users/42")
            .with_state_value("referrer", json!("/home"));

        assert_eq!(ctx.path, "/users/42");
        assert_eq!(ctx.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(ctx.state.get("referrer"), Some(&json!("/home")));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_context_serializes_without_components() {
        let ctx = NavigationContext::new("/a").with_param("id", "1");
        let value = serde_json::to_value(&ctx).unwrap();

        assert_eq!(value["path"], json!("/a"));
        assert_eq!(value["params"]["id"], json!("1"));
        assert!(value.get("components").is_none());
    }
}
