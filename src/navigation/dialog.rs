//! Dialog dispatch.
//!
//! # Design Decisions
//! - Dialog presentation is a host concern; the engine only resolves a
//!   `DialogNavigatorFactory` from the region scope and hands the request over
//! - A dialog navigator is terminal: it never forwards to a parent, and its
//!   response is returned to the caller unmodified

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::navigation::{NavResult, Navigate};
use crate::region::RegionId;
use crate::routing::{NavigationRequest, Route};

/// Presents a dialog for one request.
pub trait DialogPresenter: Send + Sync {
    fn present(&self, request: NavigationRequest) -> BoxFuture<'_, NavResult>;

    fn name(&self) -> String {
        "dialog".to_string()
    }
}

/// Creates the presenter for a dialog request raised in `region`.
///
/// Registered in a scope as `Arc<dyn DialogNavigatorFactory>`.
pub trait DialogNavigatorFactory: Send + Sync {
    fn create(&self, region: RegionId, request: &NavigationRequest) -> Option<Arc<dyn DialogPresenter>>;
}

/// Navigator variant that routes dialog-qualified requests to a presenter.
#[derive(Clone)]
pub struct DialogNavigator {
    region: RegionId,
    presenter: Arc<dyn DialogPresenter>,
}

impl DialogNavigator {
    pub fn new(region: RegionId, presenter: Arc<dyn DialogPresenter>) -> Self {
        Self { region, presenter }
    }

    pub fn region(&self) -> RegionId {
        self.region
    }
}

impl Navigate for DialogNavigator {
    fn navigate(&self, request: NavigationRequest) -> BoxFuture<'_, NavResult> {
        tracing::debug!(region = %self.region, presenter = %self.presenter.name(), request = %request, "Presenting dialog");
        self.presenter.present(request)
    }

    fn can_handle(&self, route: &Route) -> bool {
        route.is_dialog()
    }

    fn describe(&self) -> String {
        format!("DialogNavigator({} '{}')", self.region, self.presenter.name())
    }
}

impl fmt::Debug for DialogNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
