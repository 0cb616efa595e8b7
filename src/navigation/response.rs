//! Request/response navigation.
//!
//! A navigation that expects a result installs a `ResultSink` in the scope
//! of every region it passes through. Content shown by that navigation
//! resolves its region's active navigator and completes the sink; the
//! caller awaits a `ResultReceiver` fed by all of those sinks.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use crate::navigation::navigator::Navigator;
use crate::navigation::{NavResult, Navigate};
use crate::region::RegionId;
use crate::routing::{NavigationRequest, ResultMarker, ResultReceiver, Route};

type Payload = Box<dyn Any + Send>;

/// Sending half of a pending navigation result.
pub struct ResultSink {
    region: RegionId,
    marker: ResultMarker,
    sender: Mutex<Option<oneshot::Sender<Payload>>>,
}

impl ResultSink {
    pub fn new(region: RegionId, marker: ResultMarker) -> (Arc<Self>, ResultReceiver) {
        let (tx, rx) = oneshot::channel();
        let sink = Arc::new(Self {
            region,
            marker,
            sender: Mutex::new(Some(tx)),
        });
        (sink, ResultReceiver::new(marker, rx))
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn marker(&self) -> ResultMarker {
        self.marker
    }

    /// Deliver the result. False if the type does not match the request, the
    /// result was already sent, or the receiver is gone.
    pub fn send<T: Any + Send>(&self, value: T) -> bool {
        if self.marker != ResultMarker::of::<T>() {
            tracing::warn!(
                region = %self.region,
                expected = self.marker.type_name(),
                actual = std::any::type_name::<T>(),
                "Navigation result has the wrong type"
            );
            return false;
        }
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => tx.send(Box::new(value)).is_ok(),
            None => false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSink")
            .field("region", &self.region)
            .field("type", &self.marker.type_name())
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Who is currently navigating a region, as published into its scope.
#[derive(Debug, Clone)]
pub enum ActiveNavigator {
    /// The region's own navigator; no result is pending.
    Region(RegionId),
    /// A navigation into this region is waiting for a result.
    Response(Arc<ResultSink>),
}

/// Navigator adapter that can complete a pending result.
#[derive(Clone)]
pub struct ResponseNavigator<'h> {
    inner: Navigator<'h>,
    sink: Arc<ResultSink>,
}

impl<'h> ResponseNavigator<'h> {
    pub(crate) fn new(inner: Navigator<'h>, sink: Arc<ResultSink>) -> Self {
        Self { inner, sink }
    }

    pub fn region(&self) -> RegionId {
        self.inner.region()
    }

    pub fn expects(&self) -> ResultMarker {
        self.sink.marker()
    }

    /// Complete the pending navigation with `value`.
    pub fn complete<T: Any + Send>(&self, value: T) -> bool {
        let sent = self.sink.send(value);
        tracing::debug!(region = %self.region(), sent, "Navigation result completed");
        sent
    }
}

impl<'h> Navigate for ResponseNavigator<'h> {
    fn navigate(&self, request: NavigationRequest) -> BoxFuture<'_, NavResult> {
        self.inner.navigate(request)
    }

    fn can_handle(&self, route: &Route) -> bool {
        self.inner.can_handle(route)
    }

    fn describe(&self) -> String {
        format!(
            "ResponseNavigator({} -> {})",
            self.inner.describe(),
            self.sink.marker().type_name()
        )
    }
}

impl fmt::Debug for ResponseNavigator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
