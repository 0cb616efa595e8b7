//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller text ("../tabbed/doc0?id=1")
//!     → route.rs (parse qualifier, segments, data)
//!     → request.rs (wrap with sender + expected result)
//!     → map.rs (look up binding, apply init rewrite)
//!     → navigation engine (see crate::navigation)
//!     → request.rs (NavigationResponse with executed route)
//! ```
//!
//! # Design Decisions
//! - Routes are immutable values, rewritten by returning new routes
//! - Registry lookups never fail; a miss is simply "no binding"
//! - The registry is swapped as a whole on reload (resolver.rs)

pub mod map;
pub mod request;
pub mod resolver;
pub mod route;

pub use map::{DataContract, DataConverter, InitHook, RouteMap, RouteRegistry, ViewBinding};
pub use request::{NavigationRequest, NavigationResponse, ResultMarker, ResultReceiver};
pub use resolver::RouteResolver;
pub use route::{Qualifier, Route, RouteData};
