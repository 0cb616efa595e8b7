//! Navigation data published into a region scope.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::RouteData;

/// Single-slot holder for the parameters of the latest navigation in a scope.
///
/// Each navigation overwrites the slot; concurrent navigations into the same
/// region are last-write-wins.
#[derive(Debug, Default)]
pub struct NavigationDataProvider {
    parameters: ArcSwap<RouteData>,
}

impl NavigationDataProvider {
    pub fn set_parameters(&self, parameters: RouteData) {
        self.parameters.store(Arc::new(parameters));
    }

    pub fn parameters(&self) -> Arc<RouteData> {
        self.parameters.load_full()
    }
}
