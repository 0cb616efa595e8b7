//! Navigation engine.
//!
//! # Data Flow
//! ```text
//! NavigationHost::navigate(route)
//!     → Navigator (root region)
//!         → parent navigator   (../, unnamed pass-through)
//!         → DialogNavigator    (!, via scope factory)
//!         → child navigators   (in parallel, first non-empty response)
//!     → NavigationResponse (executed route, optional pending result)
//! ```
//!
//! # Design Decisions
//! - Three navigator variants behind one `Navigate` capability, collected
//!   in the closed `AnyNavigator` enum
//! - Each region traversal is paired start/end on the route update tracker
//! - Only collaborator failures are errors; routing dead ends are `Ok(None)`

pub mod data;
pub mod dialog;
pub mod error;
pub mod host;
pub mod navigator;
pub mod response;
pub mod tracker;

use futures_util::future::BoxFuture;

use crate::routing::{NavigationRequest, Route};

pub use data::NavigationDataProvider;
pub use dialog::{DialogNavigator, DialogNavigatorFactory, DialogPresenter};
pub use error::{NavResult, NavigationError};
pub use host::NavigationHost;
pub use navigator::Navigator;
pub use response::{ActiveNavigator, ResponseNavigator, ResultSink};
pub use tracker::{
    NavigationToken, RecordingRouteUpdater, RouteUpdateTracker, TrackerEvent, TracingRouteUpdater,
    TrackingGuard,
};

/// Capability shared by every navigator variant.
pub trait Navigate: Send + Sync {
    fn navigate(&self, request: NavigationRequest) -> BoxFuture<'_, NavResult>;

    /// True when this navigator would act on `route` itself.
    fn can_handle(&self, route: &Route) -> bool;

    fn describe(&self) -> String;
}

/// One of the navigator variants.
#[derive(Debug, Clone)]
pub enum AnyNavigator<'h> {
    Standard(Navigator<'h>),
    Dialog(DialogNavigator),
    Response(ResponseNavigator<'h>),
}

impl Navigate for AnyNavigator<'_> {
    fn navigate(&self, request: NavigationRequest) -> BoxFuture<'_, NavResult> {
        match self {
            AnyNavigator::Standard(navigator) => Navigate::navigate(navigator, request),
            AnyNavigator::Dialog(navigator) => navigator.navigate(request),
            AnyNavigator::Response(navigator) => navigator.navigate(request),
        }
    }

    fn can_handle(&self, route: &Route) -> bool {
        match self {
            AnyNavigator::Standard(navigator) => navigator.can_handle(route),
            AnyNavigator::Dialog(navigator) => navigator.can_handle(route),
            AnyNavigator::Response(navigator) => navigator.can_handle(route),
        }
    }

    fn describe(&self) -> String {
        match self {
            AnyNavigator::Standard(navigator) => navigator.describe(),
            AnyNavigator::Dialog(navigator) => navigator.describe(),
            AnyNavigator::Response(navigator) => navigator.describe(),
        }
    }
}
