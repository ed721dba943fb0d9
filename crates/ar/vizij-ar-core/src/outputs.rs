//! Output contracts from the session.
//!
//! Outputs carry the plane lifecycle events produced during one `update`.
//! Adapters (Bevy, hosts) forward them to their own event systems.

use serde::{Deserialize, Serialize};

use crate::planes::BoundedPlane;
use crate::provider::SessionStatus;

/// Plane lifecycle notification. Payloads are snapshots taken when the event
/// was raised.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "plane", rename_all = "snake_case")]
pub enum PlaneEvent {
    Added(BoundedPlane),
    Updated(BoundedPlane),
    /// Raised both when the vendor stops reporting a plane and when the plane
    /// is subsumed by another one.
    Removed(BoundedPlane),
}

impl PlaneEvent {
    #[inline]
    pub fn plane(&self) -> &BoundedPlane {
        match self {
            PlaneEvent::Added(p) | PlaneEvent::Updated(p) | PlaneEvent::Removed(p) => p,
        }
    }
}

/// Receives plane events synchronously while a reconciliation pass runs.
pub trait PlaneEventSink {
    fn emit(&mut self, event: PlaneEvent);
}

impl PlaneEventSink for Vec<PlaneEvent> {
    #[inline]
    fn emit(&mut self, event: PlaneEvent) {
        self.push(event);
    }
}

/// Outputs returned by `ArSession::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    /// Status observed after pumping the vendor this frame.
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub events: Vec<PlaneEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: PlaneEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl PlaneEventSink for Outputs {
    #[inline]
    fn emit(&mut self, event: PlaneEvent) {
        self.push_event(event);
    }
}
