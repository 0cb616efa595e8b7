//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the navigator.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Navigation engine settings.
    pub navigation: NavigationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route map entries (path → binding, redirect, default child).
    pub routes: Vec<RouteMapConfig>,

    /// Optional static region tree, rooted at a single region.
    pub region: Option<RegionConfig>,
}

/// What a navigator does when one of its child navigations fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChildFailurePolicy {
    /// Log the failure and treat that child as having produced no response.
    #[default]
    Isolate,
    /// Wait for all siblings, then propagate the first failure in child order.
    FailFast,
}

/// Navigation engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Upper bound on `init` rewrites applied to a single request.
    pub max_rewrite_iterations: usize,

    /// How long to wait for a region surface to become ready (0 = no limit).
    pub surface_ready_timeout_ms: u64,

    /// Child failure handling.
    pub child_failure: ChildFailurePolicy,
}

impl NavigationConfig {
    pub fn surface_ready_timeout(&self) -> Option<Duration> {
        (self.surface_ready_timeout_ms > 0)
            .then(|| Duration::from_millis(self.surface_ready_timeout_ms))
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_rewrite_iterations: 32,
            surface_ready_timeout_ms: 5_000,
            child_failure: ChildFailurePolicy::Isolate,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Route map entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteMapConfig {
    /// Path segment key, unique within its parent scope.
    pub path: String,

    /// View bound to this path.
    pub view: Option<String>,

    /// View model bound to this path.
    pub view_model: Option<String>,

    /// Default child of its parent scope.
    #[serde(default)]
    pub is_default: bool,

    /// Rewrite requests for this path onto another path (e.g. "tabbed/doc0").
    pub redirect: Option<String>,

    /// Path this entry expects to be shown underneath.
    pub depends_on: Option<String>,

    /// Nested entries.
    #[serde(default)]
    pub nested: Vec<RouteMapConfig>,
}

impl RouteMapConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            view: None,
            view_model: None,
            is_default: false,
            redirect: None,
            depends_on: None,
            nested: Vec::new(),
        }
    }
}

/// Static region declaration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RegionConfig {
    /// Region name; empty for an unnamed (pass-through) region.
    #[serde(default)]
    pub name: String,

    /// Route bases this region's surface displays. Empty = displays nothing,
    /// `"*"` = displays any base.
    #[serde(default)]
    pub content: Vec<String>,

    /// Child regions, in registration order.
    #[serde(default)]
    pub children: Vec<RegionConfig>,
}
