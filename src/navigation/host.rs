//! Navigation host.
//!
//! # Responsibilities
//! - Own the region tree, the route resolver and the update tracker
//! - Hand out navigators for regions
//! - Build a region tree from configuration
//! - Entry point for top-level navigations (from the root region)
//!
//! # Design Decisions
//! - Navigators borrow the host, so the host outlives every in-flight navigation
//! - The resolver is shared (`Arc`) so a config watcher task can swap routes

use std::sync::Arc;

use crate::config::{NavigationConfig, NavigatorConfig, RegionConfig};
use crate::navigation::dialog::DialogNavigatorFactory;
use crate::navigation::navigator::Navigator;
use crate::navigation::response::{ActiveNavigator, ResponseNavigator};
use crate::navigation::tracker::{RouteUpdateTracker, TracingRouteUpdater};
use crate::navigation::{AnyNavigator, NavResult, NavigationError};
use crate::observability::metrics;
use crate::region::{RegionId, RegionTree, RegionView, Surface};
use crate::routing::{NavigationRequest, Route, RouteRegistry, RouteResolver};

/// Owner of a region tree and everything needed to navigate it.
pub struct NavigationHost {
    tree: RegionTree,
    resolver: Arc<RouteResolver>,
    tracker: Arc<dyn RouteUpdateTracker>,
    config: NavigationConfig,
}

impl NavigationHost {
    pub fn new(routes: RouteRegistry) -> Self {
        Self {
            tree: RegionTree::new(),
            resolver: Arc::new(RouteResolver::new(routes)),
            tracker: Arc::new(TracingRouteUpdater::new()),
            config: NavigationConfig::default(),
        }
    }

    /// Build a host with the configured routes, settings and static regions.
    pub fn from_config(config: &NavigatorConfig) -> Result<Self, NavigationError> {
        let host = Self::new(RouteRegistry::from_config(&config.routes))
            .with_config(config.navigation.clone());
        if let Some(region) = &config.region {
            host.mount(region)?;
        }
        Ok(host)
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn RouteUpdateTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_config(mut self, config: NavigationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tree(&self) -> &RegionTree {
        &self.tree
    }

    pub fn resolver(&self) -> &Arc<RouteResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub(crate) fn tracker(&self) -> &dyn RouteUpdateTracker {
        &*self.tracker
    }

    pub fn navigator(&self, region: RegionId) -> Navigator<'_> {
        Navigator::new(self, region)
    }

    /// Make dialog navigation available to every region.
    pub fn register_dialog_factory(&self, factory: Arc<dyn DialogNavigatorFactory>) {
        self.tree.app_services().add_instance(factory);
    }

    /// The navigator most recently published into `region`'s scope.
    pub fn active_navigator(&self, region: RegionId) -> Option<AnyNavigator<'_>> {
        let services = self.tree.services(region).ok()?;
        let active = services.get_local::<ActiveNavigator>()?;
        Some(match &*active {
            ActiveNavigator::Region(id) => AnyNavigator::Standard(self.navigator(*id)),
            ActiveNavigator::Response(sink) => {
                AnyNavigator::Response(ResponseNavigator::new(self.navigator(sink.region()), sink.clone()))
            }
        })
    }

    /// Navigate from the root region.
    pub async fn navigate(&self, route: impl Into<Route>) -> NavResult {
        self.navigate_request(NavigationRequest::new(route)).await
    }

    pub async fn navigate_request(&self, request: NavigationRequest) -> NavResult {
        let Some(root) = self.tree.root() else {
            metrics::record_outcome("error");
            return Err(NavigationError::NoRoot);
        };
        let result = self.navigator(root).navigate(request).await;
        metrics::record_outcome(match &result {
            Ok(Some(_)) => "handled",
            Ok(None) => "unhandled",
            Err(_) => "error",
        });
        result
    }

    /// Insert `config` as the root region, with its children, and return the root id.
    pub fn mount(&self, config: &RegionConfig) -> Result<RegionId, NavigationError> {
        let root = self.tree.insert_root(config.name.clone(), Self::surface(config))?;
        self.mount_children(root, config)?;
        Ok(root)
    }

    /// Insert `config` (and its children) under `parent`.
    pub fn mount_under(&self, parent: RegionId, config: &RegionConfig) -> Result<RegionId, NavigationError> {
        let id = self
            .tree
            .insert_child(parent, config.name.clone(), Self::surface(config))?;
        self.mount_children(id, config)?;
        Ok(id)
    }

    fn mount_children(&self, parent: RegionId, config: &RegionConfig) -> Result<(), NavigationError> {
        for child in &config.children {
            self.mount_under(parent, child)?;
        }
        Ok(())
    }

    fn surface(config: &RegionConfig) -> Arc<dyn RegionView> {
        Arc::new(Surface::from_content(&config.content))
    }
}

impl std::fmt::Debug for NavigationHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationHost")
            .field("tree", &self.tree)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
