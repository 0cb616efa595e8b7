//! Region subsystem.
//!
//! # Data Flow
//! ```text
//! RegionConfig / host code
//!     → tree.rs (arena of regions, parent/child links, current routes)
//!     → services.rs (per-region scope chained to the parent scope)
//!     → view.rs (surface readiness and content display)
//! ```

pub mod services;
pub mod tree;
pub mod view;

pub use services::Services;
pub use tree::{ChildRef, RegionId, RegionSnapshot, RegionTree};
pub use view::{RegionView, Surface};
