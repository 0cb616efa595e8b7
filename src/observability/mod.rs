//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Navigator / tracker / config watcher produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (human-readable or JSON lines)
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (`region`, `route`) on every navigation event
//! - Metric updates are fire-and-forget; without a recorder they are no-ops
//! - Initialization lives here so library users can skip it and bring their own

pub mod logging;
pub mod metrics;
