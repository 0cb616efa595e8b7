//! Region tree arena.
//!
//! # Responsibilities
//! - Own every region record, keyed by a stable `RegionId`
//! - Keep parent (lookup only) and ordered child links
//! - Give each region its own service scope, chained to its parent's
//! - Hand out per-traversal snapshots of a region
//! - Track each region's current route
//!
//! # Design Decisions
//! - Records live in a `DashMap`; ids are never reused, so a removed id
//!   simply stops resolving
//! - Parents are ids, not owners: no reference cycles
//! - Snapshots copy the child list, so a traversal step is unaffected by
//!   children added or removed while it runs
//! - No map guard is held across an await point

use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;

use crate::navigation::{NavigationDataProvider, NavigationError};
use crate::region::services::Services;
use crate::region::view::RegionView;
use crate::routing::Route;

/// Stable identifier of a region in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct RegionNode {
    name: String,
    parent: Option<RegionId>,
    children: Vec<RegionId>,
    services: Arc<Services>,
    view: Arc<dyn RegionView>,
    current_route: ArcSwapOption<Route>,
}

/// A child as seen from its parent at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    pub id: RegionId,
    pub name: String,
}

/// Point-in-time copy of one region.
#[derive(Clone)]
pub struct RegionSnapshot {
    pub id: RegionId,
    pub name: String,
    pub parent: Option<RegionId>,
    pub children: Vec<ChildRef>,
    pub services: Arc<Services>,
    pub view: Arc<dyn RegionView>,
}

impl RegionSnapshot {
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl fmt::Debug for RegionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionSnapshot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Arena of regions with exactly one root.
pub struct RegionTree {
    nodes: DashMap<RegionId, RegionNode>,
    next_id: AtomicU64,
    /// 0 = no root yet.
    root: AtomicU64,
    app_services: Arc<Services>,
}

impl RegionTree {
    pub fn new() -> Self {
        Self::with_services(Services::new())
    }

    /// Region scopes chain up to `app_services`.
    pub fn with_services(app_services: Arc<Services>) -> Self {
        Self {
            nodes: DashMap::new(),
            next_id: AtomicU64::new(1),
            root: AtomicU64::new(0),
            app_services,
        }
    }

    pub fn app_services(&self) -> &Arc<Services> {
        &self.app_services
    }

    pub fn root(&self) -> Option<RegionId> {
        match self.root.load(Ordering::Acquire) {
            0 => None,
            id => Some(RegionId(id)),
        }
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert the root region. Fails if the tree already has one.
    pub fn insert_root(
        &self,
        name: impl Into<String>,
        view: Arc<dyn RegionView>,
    ) -> Result<RegionId, NavigationError> {
        let id = self.allocate();
        if let Err(existing) =
            self.root
                .compare_exchange(0, id.0, Ordering::AcqRel, Ordering::Acquire)
        {
            return Err(NavigationError::RootExists(RegionId(existing)));
        }
        let services = self.app_services.create_scope();
        self.nodes.insert(id, Self::node(name.into(), None, services, view));
        tracing::debug!(region = %id, "Root region inserted");
        Ok(id)
    }

    /// Insert a child under `parent`, after its existing children.
    pub fn insert_child(
        &self,
        parent: RegionId,
        name: impl Into<String>,
        view: Arc<dyn RegionView>,
    ) -> Result<RegionId, NavigationError> {
        let parent_services = self.services(parent)?;
        let id = self.allocate();
        let node = Self::node(name.into(), Some(parent), parent_services.create_scope(), view);
        self.nodes.insert(id, node);

        match self.nodes.get_mut(&parent) {
            Some(mut p) => p.children.push(id),
            None => {
                // Parent removed concurrently.
                self.nodes.remove(&id);
                return Err(NavigationError::UnknownRegion(parent));
            }
        }
        tracing::debug!(region = %id, parent = %parent, "Child region inserted");
        Ok(id)
    }

    /// Remove a region and its whole subtree.
    pub fn remove(&self, id: RegionId) -> Result<(), NavigationError> {
        let (_, node) = self
            .nodes
            .remove(&id)
            .ok_or(NavigationError::UnknownRegion(id))?;

        if let Some(parent) = node.parent {
            if let Some(mut p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
        } else {
            let _ = self
                .root
                .compare_exchange(id.0, 0, Ordering::AcqRel, Ordering::Acquire);
        }

        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some((_, removed)) = self.nodes.remove(&child) {
                pending.extend(removed.children);
            }
        }
        tracing::debug!(region = %id, "Region removed");
        Ok(())
    }

    /// Name an unnamed region. A region's name cannot change once set.
    pub fn rename(&self, id: RegionId, name: impl Into<String>) -> Result<(), NavigationError> {
        let mut node = self
            .nodes
            .get_mut(&id)
            .ok_or(NavigationError::UnknownRegion(id))?;
        if !node.name.trim().is_empty() {
            return Err(NavigationError::NameImmutable {
                region: id,
                name: node.name.clone(),
            });
        }
        node.name = name.into();
        Ok(())
    }

    pub fn snapshot(&self, id: RegionId) -> Result<RegionSnapshot, NavigationError> {
        let (name, parent, child_ids, services, view) = {
            let node = self.nodes.get(&id).ok_or(NavigationError::UnknownRegion(id))?;
            (
                node.name.clone(),
                node.parent,
                node.children.clone(),
                node.services.clone(),
                node.view.clone(),
            )
        };
        let children = child_ids
            .into_iter()
            .filter_map(|child| {
                self.nodes.get(&child).map(|n| ChildRef {
                    id: child,
                    name: n.name.clone(),
                })
            })
            .collect();
        Ok(RegionSnapshot {
            id,
            name,
            parent,
            children,
            services,
            view,
        })
    }

    pub fn name(&self, id: RegionId) -> Result<String, NavigationError> {
        self.read(id, |n| n.name.clone())
    }

    pub fn parent(&self, id: RegionId) -> Result<Option<RegionId>, NavigationError> {
        self.read(id, |n| n.parent)
    }

    pub fn children(&self, id: RegionId) -> Result<Vec<RegionId>, NavigationError> {
        self.read(id, |n| n.children.clone())
    }

    pub fn services(&self, id: RegionId) -> Result<Arc<Services>, NavigationError> {
        self.read(id, |n| n.services.clone())
    }

    pub fn view(&self, id: RegionId) -> Result<Arc<dyn RegionView>, NavigationError> {
        self.read(id, |n| n.view.clone())
    }

    /// Route most recently executed by this region's navigator.
    pub fn current_route(&self, id: RegionId) -> Option<Route> {
        self.nodes
            .get(&id)
            .and_then(|n| n.current_route.load_full())
            .map(|r| (*r).clone())
    }

    pub fn set_current_route(&self, id: RegionId, route: Option<Route>) {
        if let Some(node) = self.nodes.get(&id) {
            node.current_route.store(route.map(Arc::new));
        }
    }

    /// Walk parent links up to the root of `id`'s tree.
    pub fn root_of(&self, id: RegionId) -> Result<RegionId, NavigationError> {
        let mut current = id;
        while let Some(parent) = self.parent(current)? {
            current = parent;
        }
        Ok(current)
    }

    /// Concatenated current routes from `id` down through the first child
    /// (in registration order) that has something to show.
    pub fn route_of(&self, id: RegionId) -> String {
        let mut segments: Vec<String> = self
            .current_route(id)
            .map(|r| r.segments().map(str::to_string).collect())
            .unwrap_or_default();
        let children = self.children(id).unwrap_or_default();
        if let Some(tail) = children
            .into_iter()
            .map(|c| self.route_of(c))
            .find(|r| !r.is_empty())
        {
            segments.push(tail);
        }
        segments.join("/")
    }

    /// Indented dump of the subtree at `id`, with each region's current route.
    pub fn describe(&self, id: RegionId) -> String {
        let mut out = String::new();
        self.describe_into(id, 0, &mut out);
        out
    }

    fn describe_into(&self, id: RegionId, depth: usize, out: &mut String) {
        let Ok(name) = self.name(id) else {
            return;
        };
        let label = if name.trim().is_empty() { "<unnamed>" } else { name.as_str() };
        let _ = write!(out, "{:indent$}{label} {id}", "", indent = depth * 2);
        if let Some(route) = self.current_route(id) {
            let _ = write!(out, " [{route}]");
        }
        out.push('\n');
        for child in self.children(id).unwrap_or_default() {
            self.describe_into(child, depth + 1, out);
        }
    }

    fn allocate(&self) -> RegionId {
        RegionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn node(
        name: String,
        parent: Option<RegionId>,
        services: Arc<Services>,
        view: Arc<dyn RegionView>,
    ) -> RegionNode {
        services.add_instance(NavigationDataProvider::default());
        RegionNode {
            name,
            parent,
            children: Vec::new(),
            services,
            view,
            current_route: ArcSwapOption::empty(),
        }
    }

    fn read<T>(&self, id: RegionId, f: impl FnOnce(&RegionNode) -> T) -> Result<T, NavigationError> {
        self.nodes
            .get(&id)
            .map(|n| f(n.value()))
            .ok_or(NavigationError::UnknownRegion(id))
    }
}

impl Default for RegionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionTree")
            .field("regions", &self.nodes.len())
            .field("root", &self.root())
            .finish()
    }
}
