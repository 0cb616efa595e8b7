//! Shared fixtures for navigation integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt};

use region_nav::navigation::{
    DialogNavigatorFactory, DialogPresenter, NavResult, RecordingRouteUpdater,
};
use region_nav::region::RegionView;
use region_nav::{
    NavigationError, NavigationHost, NavigationRequest, NavigationResponse, Qualifier, RegionId,
    Route, RouteRegistry,
};

/// Host with a recording tracker and a pass-through root region.
pub fn host(routes: RouteRegistry) -> (NavigationHost, Arc<RecordingRouteUpdater>, RegionId) {
    let tracker = RecordingRouteUpdater::new();
    let host = NavigationHost::new(routes).with_tracker(tracker.clone());
    let root = host
        .tree()
        .insert_root("", Arc::new(region_nav::Surface::pass_through()))
        .unwrap();
    (host, tracker, root)
}

/// Surface that shows `page` after an optional delay, reporting the shown
/// route as `page@tag` so tests can tell sibling responses apart.
pub struct TaggedSurface {
    page: String,
    tag: String,
    delay: Duration,
}

impl TaggedSurface {
    pub fn new(page: &str, tag: &str) -> Self {
        Self {
            page: page.into(),
            tag: tag.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl RegionView for TaggedSurface {
    fn ensure_loaded(&self) -> BoxFuture<'_, Result<(), NavigationError>> {
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            Ok(())
        }
        .boxed()
    }

    fn can_show(&self, route: &Route) -> bool {
        route.base() == self.page
    }

    fn show<'a>(&'a self, route: &'a Route) -> BoxFuture<'a, Result<Option<Route>, NavigationError>> {
        let shown = self
            .can_show(route)
            .then(|| Route::new(Qualifier::None, [format!("{}@{}", self.page, self.tag)]));
        future::ready(Ok(shown)).boxed()
    }
}

/// Surface whose readiness check always fails.
pub struct BrokenSurface;

impl RegionView for BrokenSurface {
    fn ensure_loaded(&self) -> BoxFuture<'_, Result<(), NavigationError>> {
        future::ready(Err(NavigationError::Surface("surface detached".into()))).boxed()
    }
}

/// Dialog factory that records every request and answers with its route.
#[derive(Default)]
pub struct RecordingDialogs {
    requests: Mutex<Vec<NavigationRequest>>,
}

impl RecordingDialogs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

struct Presenter {
    dialogs: Arc<RecordingDialogs>,
}

impl DialogPresenter for Presenter {
    fn present(&self, request: NavigationRequest) -> BoxFuture<'_, NavResult> {
        let route = request.route.trim_qualifier(Qualifier::Dialog);
        self.dialogs
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        future::ready(Ok(Some(NavigationResponse::new(route.append("presented"))))).boxed()
    }

    fn name(&self) -> String {
        "recording".into()
    }
}

pub struct RecordingDialogFactory(pub Arc<RecordingDialogs>);

impl DialogNavigatorFactory for RecordingDialogFactory {
    fn create(&self, _region: RegionId, _request: &NavigationRequest) -> Option<Arc<dyn DialogPresenter>> {
        Some(Arc::new(Presenter {
            dialogs: self.0.clone(),
        }))
    }
}
