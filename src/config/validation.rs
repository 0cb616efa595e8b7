//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Path keys: non-empty, no separators or qualifier characters, unique per scope
//! - At most one default entry per scope
//! - Redirect targets exist and redirects do not form cycles
//! - Engine limits are usable (rewrite bound > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: NavigatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted, at startup and on every reload

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::{NavigatorConfig, RouteMapConfig};
use crate::routing::Route;

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route path must not be empty (under '{scope}')")]
    EmptyPath { scope: String },

    #[error("route path '{path}' must be a single segment without qualifiers")]
    InvalidPath { path: String },

    #[error("route path '{path}' is declared more than once under '{scope}'")]
    DuplicatePath { scope: String, path: String },

    #[error("more than one default route under '{scope}'")]
    MultipleDefaults { scope: String },

    #[error("route '{path}' redirects to unknown path '{target}'")]
    UnknownRedirect { path: String, target: String },

    #[error("route '{path}' is part of a redirect cycle")]
    RedirectCycle { path: String },

    #[error("navigation.max_rewrite_iterations must be greater than zero")]
    ZeroRewriteBound,
}

const ROOT_SCOPE: &str = "<root>";

/// Validate a parsed configuration.
pub fn validate_config(config: &NavigatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.navigation.max_rewrite_iterations == 0 {
        errors.push(ValidationError::ZeroRewriteBound);
    }

    check_scope(ROOT_SCOPE, &config.routes, &mut errors);

    let mut redirects = HashMap::new();
    let mut known = HashSet::new();
    collect(&config.routes, &mut known, &mut redirects);
    check_redirects(&known, &redirects, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_scope(scope: &str, routes: &[RouteMapConfig], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    let mut defaults = 0;

    for route in routes {
        if route.path.trim().is_empty() {
            errors.push(ValidationError::EmptyPath {
                scope: scope.to_string(),
            });
        } else if route.path.contains(['/', '?', '!', '&']) || route.path.starts_with('.') {
            errors.push(ValidationError::InvalidPath {
                path: route.path.clone(),
            });
        } else if !seen.insert(route.path.as_str()) {
            errors.push(ValidationError::DuplicatePath {
                scope: scope.to_string(),
                path: route.path.clone(),
            });
        }

        if route.is_default {
            defaults += 1;
        }

        check_scope(&route.path, &route.nested, errors);
    }

    if defaults > 1 {
        errors.push(ValidationError::MultipleDefaults {
            scope: scope.to_string(),
        });
    }
}

fn collect<'a>(
    routes: &'a [RouteMapConfig],
    known: &mut HashSet<&'a str>,
    redirects: &mut HashMap<&'a str, String>,
) {
    // Depth-first, like registry lookups: a path resolves to its first entry.
    for route in routes {
        if known.insert(route.path.as_str()) {
            if let Some(target) = &route.redirect {
                redirects.insert(route.path.as_str(), Route::parse(target).base().to_string());
            }
        }
        collect(&route.nested, known, redirects);
    }
}

fn check_redirects(
    known: &HashSet<&str>,
    redirects: &HashMap<&str, String>,
    errors: &mut Vec<ValidationError>,
) {
    let mut paths: Vec<_> = redirects.keys().copied().collect();
    paths.sort_unstable();

    for path in paths {
        let target = &redirects[path];
        if !known.contains(target.as_str()) {
            errors.push(ValidationError::UnknownRedirect {
                path: path.to_string(),
                target: target.clone(),
            });
            continue;
        }

        // Follow the chain; a redirect onto its own base is a fixed point.
        let mut visited = HashSet::from([path]);
        let mut current = path;
        while let Some(next) = redirects.get(current) {
            if next == current {
                break;
            }
            if !visited.insert(next.as_str()) {
                errors.push(ValidationError::RedirectCycle {
                    path: path.to_string(),
                });
                break;
            }
            current = next.as_str();
        }
    }
}
