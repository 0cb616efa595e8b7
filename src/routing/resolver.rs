//! Reloadable access to the route registry.
//!
//! # Design Decisions
//! - The registry sits behind an `ArcSwap`; readers take an `Arc` snapshot
//! - A navigation takes one snapshot where it enters the region tree and
//!   hands it to every region it reaches, so a reload never changes the
//!   rules halfway through a traversal

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::map::RouteRegistry;

/// Shared, hot-swappable route registry.
#[derive(Debug)]
pub struct RouteResolver {
    routes: ArcSwap<RouteRegistry>,
}

impl RouteResolver {
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            routes: ArcSwap::from_pointee(registry),
        }
    }

    /// Current registry snapshot.
    pub fn routes(&self) -> Arc<RouteRegistry> {
        self.routes.load_full()
    }

    /// Atomically replace the registry.
    pub fn replace(&self, registry: RouteRegistry) {
        tracing::info!(entries = registry.maps().len(), "Route map replaced");
        self.routes.store(Arc::new(registry));
    }
}

impl Default for RouteResolver {
    fn default() -> Self {
        Self::new(RouteRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::map::RouteMap;

    #[test]
    fn test_snapshot_survives_replace() {
        let resolver = RouteResolver::new(RouteRegistry::new(vec![RouteMap::new("old")]));
        let snapshot = resolver.routes();
        resolver.replace(RouteRegistry::new(vec![RouteMap::new("new")]));

        assert!(snapshot.find_by_path("old").is_some());
        assert!(resolver.routes().find_by_path("new").is_some());
        assert!(resolver.routes().find_by_path("old").is_none());
    }
}
