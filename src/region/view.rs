//! Region view surfaces.
//!
//! # Responsibilities
//! - Report when a region's hosted surface is ready for navigation
//! - Decide whether the surface displays content for a route base
//! - Display it and report the executed route
//!
//! # Design Decisions
//! - `RegionView` is the seam to whatever actually renders; the engine only
//!   awaits readiness and asks for content to be shown
//! - Readiness is a `watch` channel so any number of navigations can wait on it
//! - `Surface` is the in-crate implementation used by the CLI host and tests

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::sync::watch;

use crate::navigation::NavigationError;
use crate::routing::Route;

/// Handle to the surface hosted by a region.
pub trait RegionView: Send + Sync {
    /// Resolve once the surface is attached and ready.
    fn ensure_loaded(&self) -> BoxFuture<'_, Result<(), NavigationError>>;

    /// True when this surface displays content for `route`'s base segment.
    fn can_show(&self, _route: &Route) -> bool {
        false
    }

    /// Display content for `route`'s base segment and return the executed route.
    fn show<'a>(&'a self, _route: &'a Route) -> BoxFuture<'a, Result<Option<Route>, NavigationError>> {
        future::ready(Ok(None)).boxed()
    }
}

#[derive(Debug, Clone)]
enum Content {
    PassThrough,
    Any,
    Pages(Vec<String>),
}

/// A surface with an explicit ready signal and a fixed set of pages.
#[derive(Debug)]
pub struct Surface {
    loaded: watch::Sender<bool>,
    content: Content,
    shown: ArcSwapOption<Route>,
}

impl Surface {
    fn with_content(content: Content) -> Self {
        let (loaded, _) = watch::channel(true);
        Self {
            loaded,
            content,
            shown: ArcSwapOption::empty(),
        }
    }

    /// Displays nothing; navigation passes straight through to children.
    pub fn pass_through() -> Self {
        Self::with_content(Content::PassThrough)
    }

    /// Displays the listed route bases.
    pub fn pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_content(Content::Pages(pages.into_iter().map(Into::into).collect()))
    }

    /// Displays any route base.
    pub fn any_page() -> Self {
        Self::with_content(Content::Any)
    }

    /// Build from a region's declared content (`"*"` = any page).
    pub fn from_content(content: &[String]) -> Self {
        if content.is_empty() {
            Self::pass_through()
        } else if content.iter().any(|c| c == "*") {
            Self::any_page()
        } else {
            Self::pages(content.iter().cloned())
        }
    }

    /// Start in the not-ready state; navigation waits for `mark_loaded`.
    pub fn unloaded(self) -> Self {
        self.loaded.send_replace(false);
        self
    }

    pub fn mark_loaded(&self) {
        self.loaded.send_replace(true);
    }

    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Route most recently shown by this surface.
    pub fn last_shown(&self) -> Option<Arc<Route>> {
        self.shown.load_full()
    }
}

impl RegionView for Surface {
    fn ensure_loaded(&self) -> BoxFuture<'_, Result<(), NavigationError>> {
        let mut rx = self.loaded.subscribe();
        async move {
            rx.wait_for(|loaded| *loaded)
                .await
                .map(|_| ())
                .map_err(|_| NavigationError::Surface("surface dropped before it loaded".into()))
        }
        .boxed()
    }

    fn can_show(&self, route: &Route) -> bool {
        if route.base().is_empty() {
            return false;
        }
        match &self.content {
            Content::PassThrough => false,
            Content::Any => true,
            Content::Pages(pages) => pages.iter().any(|p| p == route.base()),
        }
    }

    fn show<'a>(&'a self, route: &'a Route) -> BoxFuture<'a, Result<Option<Route>, NavigationError>> {
        let executed = self.can_show(route).then(|| route.base_only());
        if let Some(executed) = &executed {
            tracing::debug!(route = %executed, "Surface showing content");
            self.shown.store(Some(Arc::new(executed.clone())));
        }
        future::ready(Ok(executed)).boxed()
    }
}
