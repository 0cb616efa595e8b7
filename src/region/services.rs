//! Scope-local service context.
//!
//! # Responsibilities
//! - Store one instance per type for a region scope
//! - Fall back to the parent scope on lookup
//! - Report a missing required service as an error, not a panic
//!
//! # Design Decisions
//! - Keyed by `TypeId` in a `DashMap`; publishing from concurrent
//!   navigations is last-write-wins per type
//! - Writes always land in the local scope, never in a parent

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::navigation::NavigationError;

type Instance = Arc<dyn Any + Send + Sync>;

/// A region's service scope.
#[derive(Default)]
pub struct Services {
    parent: Option<Arc<Services>>,
    instances: DashMap<TypeId, Instance>,
}

impl Services {
    /// A root scope with no parent.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A child scope that falls back to `self` on lookup misses.
    pub fn create_scope(self: &Arc<Self>) -> Arc<Services> {
        Arc::new(Self {
            parent: Some(Arc::clone(self)),
            instances: DashMap::new(),
        })
    }

    /// Register (or replace) the local instance of `T`.
    pub fn add_instance<T: Any + Send + Sync>(&self, value: T) {
        self.instances.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Look up `T` in this scope, then in its ancestors.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_local::<T>()
            .or_else(|| self.parent.as_ref().and_then(|p| p.get::<T>()))
    }

    /// Look up `T` in this scope only.
    pub fn get_local<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let instance = self.instances.get(&TypeId::of::<T>())?.value().clone();
        instance.downcast::<T>().ok()
    }

    pub fn get_required<T: Any + Send + Sync>(&self) -> Result<Arc<T>, NavigationError> {
        self.get::<T>()
            .ok_or(NavigationError::MissingService(std::any::type_name::<T>()))
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("instances", &self.instances.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
