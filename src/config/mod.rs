//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NavigatorConfig (validated, immutable)
//!     → RouteRegistry built from `routes`, region tree from `region`
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → RouteResolver swaps in the new registry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Only the route map is hot-reloaded; the region tree is built once

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ChildFailurePolicy;
pub use schema::NavigationConfig;
pub use schema::NavigatorConfig;
pub use schema::ObservabilityConfig;
pub use schema::RegionConfig;
pub use schema::RouteMapConfig;
