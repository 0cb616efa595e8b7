//! Navigation error definitions.
//!
//! Routing dead ends (nothing matched, unroutable qualifier) are not errors:
//! they resolve to `Ok(None)` and a log line. The variants here are the
//! failures that do cross the navigator boundary.

use thiserror::Error;

use crate::region::RegionId;
use crate::routing::NavigationResponse;

/// Errors that can occur while navigating.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Region id does not resolve (never inserted, or removed).
    #[error("Region {0} does not exist")]
    UnknownRegion(RegionId),

    /// The tree already has a root region.
    #[error("Region tree already has a root ({0})")]
    RootExists(RegionId),

    /// Region names are immutable once set.
    #[error("Region {region} is already named '{name}'")]
    NameImmutable { region: RegionId, name: String },

    /// Navigation needs a root region and the tree has none.
    #[error("Region tree has no root region")]
    NoRoot,

    /// A region surface did not become ready in time.
    #[error("Surface of region {region} not ready after {timeout_ms} ms")]
    SurfaceTimeout { region: RegionId, timeout_ms: u64 },

    /// A region surface failed while loading or showing content.
    #[error("Surface error: {0}")]
    Surface(String),

    /// A required service is not registered in the region scope.
    #[error("Required service {0} is not registered")]
    MissingService(&'static str),

    /// Route rewriting did not reach a fixed point.
    #[error("Rewriting route '{base}' did not converge after {iterations} iterations")]
    RewriteLoop { base: String, iterations: usize },

    /// A child navigation failed (fail-fast policy).
    #[error("Navigation in child region {region} failed: {source}")]
    Child {
        region: RegionId,
        #[source]
        source: Box<NavigationError>,
    },
}

/// Result of a single navigation: `Ok(None)` when no region handled the route.
pub type NavResult = Result<Option<NavigationResponse>, NavigationError>;
