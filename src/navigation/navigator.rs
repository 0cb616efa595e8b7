//! Per-region navigator.
//!
//! # Responsibilities
//! - Normalize a request through the route map `init` hooks
//! - Decide whether a request is handled here, forwarded to the parent,
//!   or opened as a dialog
//! - Show content on the region surface and record the current route
//! - Fan the request out to matching children and pick one response
//!
//! # Data Flow
//! ```text
//! navigate(request)
//!     → initialise_request (bounded init rewrites)
//!     → dispatch_qualifier (parent / root / pass-through / dialog)
//!     → ensure_loaded (surface ready, with timeout)
//!     → response_navigate (data provider, active navigator, own-name advance)
//!     → core_navigate (show, default child, children in parallel)
//! ```
//!
//! # Design Decisions
//! - A navigator is a `Copy` handle (host + region id); all state lives in
//!   the region tree, so recursion is plain boxed futures over borrowed state
//! - Children run concurrently and are all awaited before a result is picked;
//!   the first non-empty response in registration order wins
//! - Routing dead ends are `Ok(None)` plus an error log, never `Err`
//! - The route registry snapshot taken where a navigation enters the tree
//!   is handed to every parent and child it reaches

use std::fmt;
use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture, FutureExt};
use tracing::Instrument;

use crate::config::ChildFailurePolicy;
use crate::navigation::dialog::{DialogNavigator, DialogNavigatorFactory};
use crate::navigation::host::NavigationHost;
use crate::navigation::response::{ActiveNavigator, ResultSink};
use crate::navigation::tracker::TrackingGuard;
use crate::navigation::{NavResult, Navigate, NavigationDataProvider, NavigationError};
use crate::observability::metrics;
use crate::region::{ChildRef, RegionId, RegionSnapshot};
use crate::routing::{NavigationRequest, NavigationResponse, Qualifier, Route, RouteRegistry};

/// Outcome of qualifier handling.
enum Dispatch {
    /// The request was answered (or dropped) without local handling.
    Done(Option<NavigationResponse>),
    /// Handle locally with this request.
    Continue(NavigationRequest),
}

/// The navigator bound to one region.
#[derive(Clone, Copy)]
pub struct Navigator<'h> {
    host: &'h NavigationHost,
    region: RegionId,
}

impl<'h> Navigator<'h> {
    pub(crate) fn new(host: &'h NavigationHost, region: RegionId) -> Self {
        Self { host, region }
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Route most recently executed by this navigator.
    pub fn current_route(&self) -> Option<Route> {
        self.host.tree().current_route(self.region)
    }

    /// Navigate this region (and, as routing decides, its parent or children).
    pub fn navigate(&self, request: NavigationRequest) -> BoxFuture<'h, NavResult> {
        self.navigate_with(request, None)
    }

    /// Navigate with the registry snapshot of an enclosing traversal, or a
    /// fresh one when `routes` is `None`.
    fn navigate_with(
        &self,
        request: NavigationRequest,
        routes: Option<Arc<RouteRegistry>>,
    ) -> BoxFuture<'h, NavResult> {
        let this = *self;
        let span = tracing::info_span!("navigate", region = %self.region, route = %request.route);
        async move { this.run(request, routes).await }.instrument(span).boxed()
    }

    async fn run(self, request: NavigationRequest, routes: Option<Arc<RouteRegistry>>) -> NavResult {
        let tree = self.host.tree();
        let root = tree.root_of(self.region).unwrap_or(self.region);
        tracing::info!(request = %request, "Pre-navigation");
        tracing::debug!(tree = %tree.describe(root), "Pre-navigation tree");

        let _tracking = TrackingGuard::start(self.host.tracker(), self.region);
        let result = self.route_request(request, routes).await;

        tracing::info!(route = %tree.route_of(root), "Post-navigation");
        tracing::debug!(tree = %tree.describe(root), "Post-navigation tree");
        result
    }

    async fn route_request(
        self,
        request: NavigationRequest,
        routes: Option<Arc<RouteRegistry>>,
    ) -> NavResult {
        let region = self.host.tree().snapshot(self.region)?;
        let routes = routes.unwrap_or_else(|| self.host.resolver().routes());
        let mut request = self.initialise_request(&routes, request)?;

        if !request.route.is_internal() {
            request = match self.dispatch_qualifier(&region, &routes, request).await? {
                Dispatch::Done(response) => return Ok(response),
                Dispatch::Continue(request) => request,
            };

            let route = request.route.as_internal();
            request = request.with_route(route);

            if request.route.is_dialog() {
                return self.dialog_navigate(&region, request).await;
            }
        }

        self.ensure_loaded(&region).await?;
        self.response_navigate(&region, &routes, request).await
    }

    /// Apply `init` hooks until the route base stops changing.
    fn initialise_request(
        &self,
        routes: &RouteRegistry,
        mut request: NavigationRequest,
    ) -> Result<NavigationRequest, NavigationError> {
        let Some(init) = routes
            .find_by_path(request.route.base())
            .and_then(|map| map.init.clone())
        else {
            return Ok(request);
        };

        let limit = self.host.config().max_rewrite_iterations;
        let mut rewritten = init(request.clone());
        let mut iterations = 1;
        while !request.same_route_base(&rewritten) {
            if iterations >= limit {
                return Err(NavigationError::RewriteLoop {
                    base: rewritten.route.base().to_string(),
                    iterations,
                });
            }
            request = rewritten;
            rewritten = match routes
                .find_by_path(request.route.base())
                .and_then(|map| map.init.as_ref())
            {
                Some(init) => {
                    iterations += 1;
                    init(request.clone())
                }
                None => request.clone(),
            };
        }

        if iterations > 1 || rewritten.route != request.route {
            tracing::debug!(route = %rewritten.route, iterations, "Request rewritten by route map");
        }
        Ok(rewritten)
    }

    async fn dispatch_qualifier(
        &self,
        region: &RegionSnapshot,
        routes: &Arc<RouteRegistry>,
        mut request: NavigationRequest,
    ) -> Result<Dispatch, NavigationError> {
        if !self.qualifier_is_supported(region, &request.route) {
            if request.route.is_parent() {
                let route = request.route.trim_qualifier(Qualifier::Parent(1));
                request = request.with_route(route);
            }
            if request.route.is_empty() {
                return Ok(Dispatch::Done(None));
            }
            return match region.parent {
                Some(parent) => {
                    tracing::debug!(parent = %parent, route = %request.route, "Forwarding request to parent");
                    let response = Navigator::new(self.host, parent)
                        .navigate_with(request, Some(routes.clone()))
                        .await?;
                    Ok(Dispatch::Done(response))
                }
                None => {
                    tracing::error!(request = %request, "No parent to forward request to");
                    metrics::record_unroutable("no_parent");
                    Ok(Dispatch::Done(None))
                }
            };
        }

        if request.route.is_root() {
            if region.parent.is_some() {
                tracing::error!(request = %request, "Root qualifier sent to a non-root navigator");
                metrics::record_unroutable("root_on_child");
                return Ok(Dispatch::Done(None));
            }
            let mut route = request.route.trim_qualifier(Qualifier::Root);
            if route.is_empty() {
                self.host.tree().set_current_route(self.region, None);
                if let Some(map) = routes.default_entry() {
                    route = route.append(&map.path);
                }
            }
            request = request.with_route(route);
        }

        if request.route.is_change_content() && !region.is_named() {
            if let Some(parent) = region.parent {
                let response = Navigator::new(self.host, parent)
                    .navigate_with(request, Some(routes.clone()))
                    .await?;
                return Ok(Dispatch::Done(response));
            }
        }

        Ok(Dispatch::Continue(request))
    }

    /// True when this navigator may act on `route` itself instead of
    /// forwarding it to its parent.
    fn qualifier_is_supported(&self, region: &RegionSnapshot, route: &Route) -> bool {
        let current_base = self.current_base();
        let nested = route.is_nested()
            && region
                .children
                .iter()
                .any(|child| Self::child_matches(child, route, current_base.as_deref()));
        let at_root = region.parent.is_none() && (route.is_root() || route.is_dialog());
        let content = route.is_change_content() && (region.parent.is_none() || region.view.can_show(route));
        nested || at_root || content
    }

    fn can_navigate_to_route(&self, region: &RegionSnapshot, route: &Route) -> bool {
        !route.is_empty() && !route.is_nested() && self.qualifier_is_supported(region, route)
    }

    async fn dialog_navigate(&self, region: &RegionSnapshot, request: NavigationRequest) -> NavResult {
        let presenter = region
            .services
            .get::<Arc<dyn DialogNavigatorFactory>>()
            .and_then(|factory| factory.create(self.region, &request));
        match presenter {
            Some(presenter) => DialogNavigator::new(self.region, presenter).navigate(request).await,
            None => {
                tracing::debug!(request = %request, "No dialog navigator available");
                Ok(None)
            }
        }
    }

    async fn ensure_loaded(&self, region: &RegionSnapshot) -> Result<(), NavigationError> {
        tracing::debug!("Ensuring region has loaded - start");
        let loading = region.view.ensure_loaded();
        match self.host.config().surface_ready_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, loading).await.map_err(|_| {
                NavigationError::SurfaceTimeout {
                    region: self.region,
                    timeout_ms: timeout.as_millis() as u64,
                }
            })??,
            None => loading.await?,
        }
        tracing::debug!("Ensuring region has loaded - end");
        Ok(())
    }

    async fn response_navigate(
        &self,
        region: &RegionSnapshot,
        routes: &Arc<RouteRegistry>,
        mut request: NavigationRequest,
    ) -> NavResult {
        if let Some(convert) = routes.find(&request.route).and_then(|map| map.untyped_to_query()) {
            if let Some(data) = request.route.data() {
                let route = request.route.with_data(convert(data));
                request = request.with_route(route);
            }
        }

        let provider = region.services.get_required::<NavigationDataProvider>()?;
        provider.set_parameters(request.route.data().cloned().unwrap_or_default());

        let pending = match request.result {
            Some(marker) => {
                let (sink, receiver) = ResultSink::new(self.region, marker);
                region.services.add_instance(ActiveNavigator::Response(sink));
                Some(receiver)
            }
            None => {
                region.services.add_instance(ActiveNavigator::Region(self.region));
                None
            }
        };

        if region.is_named() && region.name == request.route.base() {
            let next = request.route.next();
            if self.can_navigate_to_route(region, &next) {
                request = request.with_route(next);
            }
        }

        let response = self.core_navigate(region, routes, request).await?;
        Ok(match pending {
            Some(receiver) => response.map(|response| response.with_result(receiver)),
            None => response,
        })
    }

    async fn core_navigate(
        &self,
        region: &RegionSnapshot,
        routes: &Arc<RouteRegistry>,
        mut request: NavigationRequest,
    ) -> NavResult {
        let route = request.route.trim_qualifier(Qualifier::Nested);
        request = request.with_route(route);

        let mut shown = None;
        if region.view.can_show(&request.route) {
            if let Some(executed) = region.view.show(&request.route).await? {
                self.host.tree().set_current_route(self.region, Some(executed.clone()));
                let next = request.route.next();
                request = request.with_route(next);
                shown = Some(executed);
            }
        }

        if request.route.is_empty() {
            let default_child = self
                .current_base()
                .and_then(|base| routes.find_by_path(&base).and_then(|map| map.default_child()))
                .map(|map| map.path.clone());
            if let Some(path) = default_child {
                let route = request.route.append(&path);
                request = request.with_route(route);
            }
            if request.route.is_empty() {
                return Ok(shown.map(NavigationResponse::new));
            }
        }

        if region.is_named() && request.result.is_some() {
            request = request.without_result();
        }

        let current_base = self.current_base();
        let selected: Vec<&ChildRef> = region
            .children
            .iter()
            .filter(|child| Self::child_matches(child, &request.route, current_base.as_deref()))
            .collect();

        let responses = join_all(
            selected
                .iter()
                .map(|child| {
                    Navigator::new(self.host, child.id)
                        .navigate_with(request.clone(), Some(routes.clone()))
                }),
        )
        .await;

        let mut first = None;
        for (child, response) in selected.iter().zip(responses) {
            match response {
                Ok(response) => {
                    if first.is_none() {
                        first = response;
                    }
                }
                Err(err) => match self.host.config().child_failure {
                    ChildFailurePolicy::Isolate => {
                        tracing::warn!(child = %child.id, error = %err, "Child navigation failed");
                    }
                    ChildFailurePolicy::FailFast => {
                        return Err(NavigationError::Child {
                            region: child.id,
                            source: Box::new(err),
                        });
                    }
                },
            }
        }

        Ok(match (shown, first) {
            (Some(executed), Some(child)) => {
                Some(child.map_route(|route| executed.append(&route.full_path())))
            }
            (Some(executed), None) => Some(NavigationResponse::new(executed)),
            (None, child) => child,
        })
    }

    fn current_base(&self) -> Option<String> {
        self.current_route()
            .map(|route| route.base().to_string())
            .filter(|base| !base.is_empty())
    }

    /// Unnamed children, children named after the route base, and the child
    /// named after this region's current route (e.g. the selected tab).
    fn child_matches(child: &ChildRef, route: &Route, current_base: Option<&str>) -> bool {
        let name = child.name.trim();
        name.is_empty() || name == route.base() || Some(name) == current_base
    }
}

impl Navigate for Navigator<'_> {
    fn navigate(&self, request: NavigationRequest) -> BoxFuture<'_, NavResult> {
        Navigator::navigate(self, request)
    }

    fn can_handle(&self, route: &Route) -> bool {
        match self.host.tree().snapshot(self.region) {
            Ok(region) => route.is_internal() || self.qualifier_is_supported(&region, route),
            Err(_) => false,
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Navigator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host.tree().name(self.region) {
            Ok(name) if !name.trim().is_empty() => write!(f, "Navigator({} '{}')", self.region, name),
            _ => write!(f, "Navigator({})", self.region),
        }
    }
}

impl fmt::Debug for Navigator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
