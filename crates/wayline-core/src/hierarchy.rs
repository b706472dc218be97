//! Hierarchy building: folding matched components into a nested prop tree.
//!
//! The first matched component becomes the outermost wrapper and each later
//! component nests inside the previous node's `page` slot, reflecting route
//! segment nesting. Committing the tree is bracketed by the
//! `router:beforeNavigation` and `router:navigation` events.

use crate::component::Component;
use crate::context::{DataMap, NavigationContext};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};
use wayline_events::EventBus;

/// Event published when the active navigation context changes.
pub const EVENT_CHANGE: &str = "change";

/// Event published after the tree is folded, before it is rendered.
pub const EVENT_BEFORE_NAVIGATION: &str = "router:beforeNavigation";

/// Event published after the tree is handed to the renderer.
pub const EVENT_NAVIGATION: &str = "router:navigation";

/// The bus navigation lifecycle events travel on.
pub type NavigationBus = EventBus<Arc<NavigationContext>>;

/// Props for one nested page.
#[derive(Debug, Clone)]
pub struct PageProps {
    /// Merged route data for this segment.
    pub data: DataMap,
    /// The nested child page. Always structurally present (possibly
    /// `None`) so nesting works uniformly at every depth.
    pub page: Option<Box<PageNode>>,
}

/// One node of the rendered hierarchy.
#[derive(Debug, Clone)]
pub struct PageNode {
    /// The component to render at this depth.
    pub child: Component,
    /// Props passed to it.
    pub props: PageProps,
}

/// The root prop tree committed to the rendering engine.
#[derive(Debug, Clone)]
pub struct RootProps {
    /// The outermost matched page, if any.
    pub page: Option<Box<PageNode>>,
    /// The navigation path.
    pub path: String,
    /// The full navigation context.
    pub context: Arc<NavigationContext>,
}

impl RootProps {
    /// Nesting depth of the folded tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.page.as_deref();
        while let Some(current) = node {
            depth += 1;
            node = current.props.page.as_deref();
        }
        depth
    }
}

/// The rendering engine seam.
///
/// Receives exactly one root tree per completed navigation and owns all
/// mounting and unmounting.
pub trait Renderer: Send + Sync {
    /// Commit the new root tree.
    fn render(&self, root: RootProps);
}

/// Fold the context's matched components into the root prop tree.
///
/// Depth equals the number of matched components, outer-to-inner in match
/// order. An empty match list still yields a root with `page: None`.
#[must_use]
pub fn fold(ctx: &Arc<NavigationContext>) -> RootProps {
    let mut root = RootProps {
        page: None,
        path: ctx.path.clone(),
        context: Arc::clone(ctx),
    };

    let mut slot = &mut root.page;
    for matched in &ctx.components {
        let node = slot.insert(Box::new(PageNode {
            child: matched.component.clone(),
            props: PageProps {
                data: matched.data.clone(),
                page: None,
            },
        }));
        slot = &mut node.props.page;
    }

    root
}

/// Builds and commits the page hierarchy for completed navigations.
pub struct HierarchyBuilder {
    bus: Arc<NavigationBus>,
    renderer: Arc<dyn Renderer>,
}

impl HierarchyBuilder {
    /// Create a builder publishing on `bus` and committing to `renderer`.
    #[must_use]
    pub fn new(bus: Arc<NavigationBus>, renderer: Arc<dyn Renderer>) -> Self {
        Self { bus, renderer }
    }

    /// Commit one completed navigation.
    ///
    /// Folds the matched components, publishes [`EVENT_BEFORE_NAVIGATION`],
    /// hands the tree to the renderer, then publishes [`EVENT_NAVIGATION`].
    /// Exactly one tree is committed per call, even when no components
    /// matched.
    pub fn commit(&self, ctx: &Arc<NavigationContext>) {
        let root = fold(ctx);
        trace!(path = %ctx.path, depth = root.depth(), "Folded hierarchy");

        self.bus.publish(EVENT_BEFORE_NAVIGATION, ctx);
        self.renderer.render(root);
        self.bus.publish(EVENT_NAVIGATION, ctx);

        debug!(path = %ctx.path, "Committed navigation");
    }
}

impl fmt::Debug for HierarchyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyBuilder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MatchedComponent;
    use serde_json::json;
    use std::sync::Mutex;
    use wayline_events::Handler;

    struct RecordingRenderer {
        log: Arc<Mutex<Vec<&'static str>>>,
        trees: Mutex<Vec<RootProps>>,
    }

    impl RecordingRenderer {
        fn new(log: &Arc<Mutex<Vec<&'static str>>>) -> Self {
            Self {
                log: Arc::clone(log),
                trees: Mutex::new(Vec::new()),
            }
        }
    }

    impl Renderer for RecordingRenderer {
        fn render(&self, root: RootProps) {
            self.log.lock().unwrap().push("render");
            self.trees.lock().unwrap().push(root);
        }
    }

    fn matched(name: &'static str, data: DataMap) -> MatchedComponent {
        MatchedComponent {
            component: Component::new(name),
            data,
        }
    }

    #[test]
    fn test_fold_empty_context() {
        let ctx = Arc::new(NavigationContext::new("/nowhere"));
        let root = fold(&ctx);

        assert!(root.page.is_none());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.path, "/nowhere");
        assert!(Arc::ptr_eq(&root.context, &ctx));
    }

    #[test]
    fn test_fold_nests_in_match_order() {
        let mut ctx = NavigationContext::new("/settings/profile");
        let mut layout_data = DataMap::new();
        layout_data.insert("title".to_string(), json!("Settings"));
        ctx.components.push(matched("Layout", layout_data));
        ctx.components.push(matched("Settings", DataMap::new()));
        ctx.components.push(matched("Profile", DataMap::new()));
        let ctx = Arc::new(ctx);

        let root = fold(&ctx);
        assert_eq!(root.depth(), 3);

        // First matched component is the outermost wrapper
        let outer = root.page.as_ref().unwrap();
        assert_eq!(outer.child.downcast_ref::<&str>(), Some(&"Layout"));
        assert_eq!(outer.props.data.get("title"), Some(&json!("Settings")));

        let middle = outer.props.page.as_ref().unwrap();
        assert_eq!(middle.child.downcast_ref::<&str>(), Some(&"Settings"));

        let inner = middle.props.page.as_ref().unwrap();
        assert_eq!(inner.child.downcast_ref::<&str>(), Some(&"Profile"));
        assert!(inner.props.page.is_none());
    }

    #[test]
    fn test_commit_brackets_render_with_events() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = Arc::new(NavigationBus::new());

        let before_log = Arc::clone(&log);
        let before: Handler<Arc<NavigationContext>> =
            Arc::new(move |_| before_log.lock().unwrap().push("before"));
        bus.subscribe(EVENT_BEFORE_NAVIGATION, before);

        let after_log = Arc::clone(&log);
        let after: Handler<Arc<NavigationContext>> =
            Arc::new(move |_| after_log.lock().unwrap().push("after"));
        bus.subscribe(EVENT_NAVIGATION, after);

        let renderer = Arc::new(RecordingRenderer::new(&log));
        let builder = HierarchyBuilder::new(bus, Arc::clone(&renderer) as Arc<dyn Renderer>);

        let ctx = Arc::new(NavigationContext::new("/"));
        builder.commit(&ctx);

        assert_eq!(*log.lock().unwrap(), vec!["before", "render", "after"]);
        assert_eq!(renderer.trees.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_commit_with_no_components_still_renders() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let renderer = Arc::new(RecordingRenderer::new(&log));
        let builder = HierarchyBuilder::new(Arc::new(NavigationBus::new()), Arc::clone(&renderer) as Arc<dyn Renderer>);

        builder.commit(&Arc::new(NavigationContext::new("/empty")));

        let trees = renderer.trees.lock().unwrap();
        assert_eq!(trees.len(), 1);
        assert!(trees[0].page.is_none());
        assert_eq!(trees[0].path, "/empty");
    }
}
