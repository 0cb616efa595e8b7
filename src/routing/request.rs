//! Navigation requests and responses.
//!
//! # Responsibilities
//! - Carry a route from the caller through the region tree
//! - Identify the sender and the expected result type, if any
//! - Carry the executed route (and an optional pending result) back
//!
//! # Design Decisions
//! - Requests are rewritten by value (`with_route`, `without_result`), never mutated in place
//! - A response result is delivered through a one-shot channel so the caller
//!   can await it after the navigation itself has completed
//! - Every region a request/response navigation passes through can deliver
//!   the result; the caller gets whichever arrives first

use std::any::{Any, TypeId};
use std::fmt;

use futures_util::future;
use tokio::sync::oneshot;

use crate::region::RegionId;
use crate::routing::route::Route;

/// Marker for the type of result a request/response navigation expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultMarker {
    type_id: TypeId,
    type_name: &'static str,
}

impl ResultMarker {
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A request to navigate to a route.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub route: Route,
    /// Region that issued the request, `None` for external callers.
    pub sender: Option<RegionId>,
    /// Expected result type; only set for request/response navigations.
    pub result: Option<ResultMarker>,
}

impl NavigationRequest {
    pub fn new(route: impl Into<Route>) -> Self {
        Self {
            route: route.into(),
            sender: None,
            result: None,
        }
    }

    pub fn from_region(mut self, sender: RegionId) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Ask for a result of type `T` once the navigated content completes.
    pub fn expecting<T: Any + Send>(mut self) -> Self {
        self.result = Some(ResultMarker::of::<T>());
        self
    }

    pub fn with_route(self, route: Route) -> Self {
        Self { route, ..self }
    }

    pub fn without_result(self) -> Self {
        Self {
            result: None,
            ..self
        }
    }

    /// True when both requests route to the same base segment.
    pub fn same_route_base(&self, other: &NavigationRequest) -> bool {
        self.route.same_base(&other.route)
    }
}

impl fmt::Display for NavigationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NavigationRequest({}", self.route)?;
        if let Some(sender) = self.sender {
            write!(f, " from {sender}")?;
        }
        if let Some(result) = self.result {
            write!(f, " -> {}", result.type_name())?;
        }
        f.write_str(")")
    }
}

/// Receiving half of a pending navigation result.
///
/// Holds one channel per region that can deliver the result; never empty.
pub struct ResultReceiver {
    marker: ResultMarker,
    sources: Vec<oneshot::Receiver<Box<dyn Any + Send>>>,
}

impl ResultReceiver {
    pub(crate) fn new(marker: ResultMarker, rx: oneshot::Receiver<Box<dyn Any + Send>>) -> Self {
        Self {
            marker,
            sources: vec![rx],
        }
    }

    pub fn marker(&self) -> ResultMarker {
        self.marker
    }

    /// Also accept the result from `other`.
    pub(crate) fn merge(mut self, other: ResultReceiver) -> Self {
        self.sources.extend(other.sources);
        self
    }

    /// Wait for the first result delivered by any source. `None` if every
    /// sender went away or the type differs.
    pub async fn recv<T: Any>(self) -> Option<T> {
        let (value, _rest) = future::select_ok(self.sources).await.ok()?;
        value.downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for ResultReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultReceiver")
            .field("type", &self.marker.type_name())
            .field("sources", &self.sources.len())
            .finish()
    }
}

/// Outcome of a navigation handled by some region.
#[derive(Debug)]
pub struct NavigationResponse {
    /// The route that was actually executed.
    pub route: Route,
    result: Option<ResultReceiver>,
}

impl NavigationResponse {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            result: None,
        }
    }

    /// Attach a pending result, keeping any attached further down the tree.
    pub fn with_result(mut self, result: ResultReceiver) -> Self {
        self.result = Some(match self.result.take() {
            Some(inner) => inner.merge(result),
            None => result,
        });
        self
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Replace the executed route, keeping any pending result.
    pub fn map_route(self, f: impl FnOnce(Route) -> Route) -> Self {
        Self {
            route: f(self.route),
            ..self
        }
    }

    /// Wait for the typed result of a request/response navigation.
    pub async fn into_result<T: Any>(self) -> Option<T> {
        self.result?.recv::<T>().await
    }
}
