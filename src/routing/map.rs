//! Route map registry.
//!
//! # Responsibilities
//! - Map path segments to view/viewmodel bindings
//! - Hold the optional `init` rewrite hook applied before routing
//! - Remember which nested entry is the default child
//! - Resolve a route (single or multi segment) to its deepest entry
//!
//! # Design Decisions
//! - Registry is immutable once built; reloads build a new one (see `resolver.rs`)
//! - Lookup by key is a depth-first search: keys are unique per scope, and
//!   the first match in declaration order wins across scopes
//! - A lookup miss is `None`, never an error

use std::fmt;
use std::sync::Arc;

use crate::config::RouteMapConfig;
use crate::routing::request::NavigationRequest;
use crate::routing::route::{Route, RouteData};

/// Rewrites a request before it is routed.
pub type InitHook = Arc<dyn Fn(NavigationRequest) -> NavigationRequest + Send + Sync>;

/// Converts untyped route data into the parameters a view model expects.
pub type DataConverter = Arc<dyn Fn(&RouteData) -> RouteData + Send + Sync>;

/// Typed data contract declared by a binding.
#[derive(Clone)]
pub struct DataContract {
    pub type_name: String,
    pub untyped_to_query: Option<DataConverter>,
}

impl fmt::Debug for DataContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContract")
            .field("type_name", &self.type_name)
            .field("untyped_to_query", &self.untyped_to_query.is_some())
            .finish()
    }
}

/// View/viewmodel binding for a route map entry.
#[derive(Debug, Clone, Default)]
pub struct ViewBinding {
    pub view: Option<String>,
    pub view_model: Option<String>,
    pub data: Option<DataContract>,
}

/// One entry of the route map.
#[derive(Clone)]
pub struct RouteMap {
    pub path: String,
    pub view: Option<ViewBinding>,
    pub init: Option<InitHook>,
    pub is_default: bool,
    /// Path this entry expects to be navigated underneath.
    pub depends_on: Option<String>,
    pub nested: Vec<RouteMap>,
}

impl RouteMap {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            view: None,
            init: None,
            is_default: false,
            depends_on: None,
            nested: Vec::new(),
        }
    }

    pub fn with_view(mut self, binding: ViewBinding) -> Self {
        self.view = Some(binding);
        self
    }

    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(NavigationRequest) -> NavigationRequest + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    /// Rewrite non-internal requests for this path onto `target`.
    pub fn redirect_to(mut self, target: &str) -> Self {
        self.init = Some(redirect_hook(target));
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn depends_on(mut self, path: impl Into<String>) -> Self {
        self.depends_on = Some(path.into());
        self
    }

    pub fn with_nested(mut self, nested: Vec<RouteMap>) -> Self {
        self.nested = nested;
        self
    }

    /// The nested entry flagged as default child, if any.
    pub fn default_child(&self) -> Option<&RouteMap> {
        self.nested.iter().find(|m| m.is_default)
    }

    /// Data conversion declared by this entry's binding.
    pub fn untyped_to_query(&self) -> Option<&DataConverter> {
        self.view
            .as_ref()?
            .data
            .as_ref()?
            .untyped_to_query
            .as_ref()
    }

    fn find_by_path(&self, path: &str) -> Option<&RouteMap> {
        if self.path == path {
            return Some(self);
        }
        self.nested.iter().find_map(|m| m.find_by_path(path))
    }
}

impl fmt::Debug for RouteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMap")
            .field("path", &self.path)
            .field("view", &self.view)
            .field("init", &self.init.is_some())
            .field("is_default", &self.is_default)
            .field("depends_on", &self.depends_on)
            .field("nested", &self.nested)
            .finish()
    }
}

impl From<&RouteMapConfig> for RouteMap {
    fn from(config: &RouteMapConfig) -> Self {
        let view = (config.view.is_some() || config.view_model.is_some()).then(|| ViewBinding {
            view: config.view.clone(),
            view_model: config.view_model.clone(),
            data: None,
        });
        RouteMap {
            path: config.path.clone(),
            view,
            init: config.redirect.as_deref().map(redirect_hook),
            is_default: config.is_default,
            depends_on: config.depends_on.clone(),
            nested: config.nested.iter().map(RouteMap::from).collect(),
        }
    }
}

fn redirect_hook(target: &str) -> InitHook {
    let target = Route::parse(target);
    Arc::new(move |request: NavigationRequest| {
        if request.route.is_internal() {
            return request;
        }
        let route = request.route.rebase(&target);
        request.with_route(route)
    })
}

/// Static lookup from path segment to route map entry.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    maps: Vec<RouteMap>,
}

impl RouteRegistry {
    pub fn new(maps: Vec<RouteMap>) -> Self {
        Self { maps }
    }

    pub fn from_config(routes: &[RouteMapConfig]) -> Self {
        Self::new(routes.iter().map(RouteMap::from).collect())
    }

    pub fn maps(&self) -> &[RouteMap] {
        &self.maps
    }

    /// Entry used when navigating to the root with nothing left to route:
    /// the first top-level entry flagged default, else the first top-level entry.
    pub fn default_entry(&self) -> Option<&RouteMap> {
        self.maps
            .iter()
            .find(|m| m.is_default)
            .or_else(|| self.maps.first())
    }

    /// Find the entry registered under `path`, searching nested scopes.
    pub fn find_by_path(&self, path: &str) -> Option<&RouteMap> {
        if path.is_empty() {
            return None;
        }
        self.maps.iter().find_map(|m| m.find_by_path(path))
    }

    /// Resolve a route to the deepest entry reachable along its segments.
    ///
    /// The base is looked up anywhere in the registry; each following segment
    /// must then be a nested entry of the previous one.
    pub fn find(&self, route: &Route) -> Option<&RouteMap> {
        let mut current = self.find_by_path(route.base())?;
        for segment in route.path() {
            match current.nested.iter().find(|m| &m.path == segment) {
                Some(nested) => current = nested,
                None => break,
            }
        }
        Some(current)
    }
}
