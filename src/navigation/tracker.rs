//! Route update tracking.
//!
//! # Responsibilities
//! - Pair the start and end of every navigation through a region
//! - Hand out a correlation token per start
//! - Feed duration/in-flight metrics
//!
//! # Design Decisions
//! - End is driven by an RAII guard, so it fires on every exit path
//!   (early return, error, panic unwinding)
//! - Tracking never influences routing decisions

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use dashmap::DashMap;
use uuid::Uuid;

use crate::observability::metrics;
use crate::region::RegionId;

/// Correlation token for one region's part of a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigationToken(Uuid);

impl NavigationToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NavigationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NavigationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observer of navigation start/end per region.
pub trait RouteUpdateTracker: Send + Sync {
    fn start_navigation(&self, region: RegionId) -> NavigationToken;
    fn end_navigation(&self, token: NavigationToken);
}

/// Ends tracking when dropped.
pub struct TrackingGuard<'a> {
    tracker: &'a dyn RouteUpdateTracker,
    token: NavigationToken,
}

impl<'a> TrackingGuard<'a> {
    pub fn start(tracker: &'a dyn RouteUpdateTracker, region: RegionId) -> Self {
        let token = tracker.start_navigation(region);
        Self { tracker, token }
    }

    pub fn token(&self) -> NavigationToken {
        self.token
    }
}

impl Drop for TrackingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.end_navigation(self.token);
    }
}

/// Default tracker: logs and records metrics for each pairing.
#[derive(Debug, Default)]
pub struct TracingRouteUpdater {
    in_flight: DashMap<NavigationToken, (RegionId, Instant)>,
}

impl TracingRouteUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigations started but not yet ended.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl RouteUpdateTracker for TracingRouteUpdater {
    fn start_navigation(&self, region: RegionId) -> NavigationToken {
        let token = NavigationToken::new();
        self.in_flight.insert(token, (region, Instant::now()));
        metrics::navigation_started();
        tracing::trace!(%token, %region, "Route update started");
        token
    }

    fn end_navigation(&self, token: NavigationToken) {
        match self.in_flight.remove(&token) {
            Some((_, (region, started))) => {
                let elapsed = started.elapsed();
                metrics::navigation_finished(elapsed);
                tracing::trace!(%token, %region, elapsed_ms = elapsed.as_millis() as u64, "Route update ended");
            }
            None => tracing::warn!(%token, "Route update ended without a matching start"),
        }
    }
}

/// What a `RecordingRouteUpdater` saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    Started(RegionId, NavigationToken),
    Ended(NavigationToken),
}

/// Tracker that keeps every event in order, for inspection.
#[derive(Debug, Default)]
pub struct RecordingRouteUpdater {
    events: Mutex<Vec<TrackerEvent>>,
}

impl RecordingRouteUpdater {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TrackerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many navigations started in `region`.
    pub fn starts(&self, region: RegionId) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TrackerEvent::Started(r, _) if *r == region))
            .count()
    }

    /// True when every start has exactly one matching end.
    pub fn balanced(&self) -> bool {
        let events = self.events();
        events.iter().all(|event| match event {
            TrackerEvent::Started(_, token) => {
                events
                    .iter()
                    .filter(|e| **e == TrackerEvent::Ended(*token))
                    .count()
                    == 1
            }
            TrackerEvent::Ended(_) => true,
        })
    }

    fn push(&self, event: TrackerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl RouteUpdateTracker for RecordingRouteUpdater {
    fn start_navigation(&self, region: RegionId) -> NavigationToken {
        let token = NavigationToken::new();
        self.push(TrackerEvent::Started(region, token));
        token
    }

    fn end_navigation(&self, token: NavigationToken) {
        self.push(TrackerEvent::Ended(token));
    }
}
