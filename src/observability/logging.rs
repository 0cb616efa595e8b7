//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Pick the log filter from the environment or config
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level so operators can override
//!   without touching the config file
//! - JSON lines for machine parsing, the default fmt layer otherwise

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
}

/// A bare level applies to this crate only; anything else is passed through
/// as a full filter directive.
fn filter_directive(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        level @ ("trace" | "debug" | "info" | "warn" | "error") => {
            format!("region_nav={level}")
        }
        _ => level.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "region_nav=debug");
        assert_eq!(filter_directive(" WARN "), "region_nav=warn");
        assert_eq!(
            filter_directive("region_nav=trace,tokio=info"),
            "region_nav=trace,tokio=info"
        );
    }
}
