//! Hierarchical region navigation.
//!
//! A tree of regions, one navigator per region, and route expressions with
//! qualifiers (`/` root, `./` nested, `../` parent, `!` dialog) resolved
//! against a route map registry.

pub mod config;
pub mod navigation;
pub mod observability;
pub mod region;
pub mod routing;

pub use config::NavigatorConfig;
pub use navigation::{Navigate, NavigationError, NavigationHost, NavResult, Navigator};
pub use region::{RegionId, RegionTree, RegionView, Surface};
pub use routing::{NavigationRequest, NavigationResponse, Qualifier, Route, RouteMap, RouteRegistry};
