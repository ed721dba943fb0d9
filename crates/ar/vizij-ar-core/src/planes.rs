//! Plane reconciliation.
//!
//! The vendor reports a fresh list of native planes every frame. Native
//! handles are stable for a plane's lifetime, but the geometry jitters and
//! planes come and go (or get merged into each other). [`PlaneReconciler`]
//! turns that stream into identity-preserving [`BoundedPlane`] records and a
//! sequence of [`PlaneEvent`]s.
//!
//! Storage is an arena of records addressed by [`PlaneKey`], plus a side table
//! from native handle to key. A pass runs in three steps:
//! 1. planes already tracked: subsumed → removed, otherwise updated when the
//!    geometry moved past the threshold;
//! 2. planes not tracked yet (and not subsumed) → added;
//! 3. tracked planes missing from this frame → removed.

use std::hash::Hash;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PLANE_CHANGE_EPSILON;
use crate::ids::{PlaneId, PlaneKey};
use crate::outputs::{PlaneEvent, PlaneEventSink};
use crate::pose::{distance2, distance3, Pose};

/// A detected surface as exposed to consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundedPlane {
    pub id: PlaneId,
    pub center: [f32; 3],
    pub rotation: [f32; 4],
    /// Half-size along plane-local X and Z.
    pub extents: [f32; 2],
}

impl BoundedPlane {
    fn from_native<H>(id: PlaneId, native: &NativePlane<H>) -> Self {
        Self {
            id,
            center: native.center.position,
            rotation: native.center.rotation,
            extents: native.extents(),
        }
    }

    fn assign_from<H>(&mut self, native: &NativePlane<H>) {
        self.center = native.center.position;
        self.rotation = native.center.rotation;
        self.extents = native.extents();
    }

    /// Whether `native` differs enough from this record to report an update.
    /// Rotation is compared exactly.
    pub fn differs_from<H>(&self, native: &NativePlane<H>, epsilon: f32) -> bool {
        distance2(self.extents, native.extents()) > epsilon
            || self.rotation != native.center.rotation
            || distance3(self.center, native.center.position) > epsilon
    }
}

/// Per-frame snapshot of a vendor plane.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativePlane<H> {
    pub handle: H,
    pub center: Pose,
    pub extent_x: f32,
    pub extent_z: f32,
    /// Set once the vendor has merged this plane into another one.
    pub subsumed_by: Option<H>,
}

impl<H> NativePlane<H> {
    #[inline]
    pub fn extents(&self) -> [f32; 2] {
        [self.extent_x, self.extent_z]
    }
}

#[derive(Debug)]
struct Slot {
    plane: BoundedPlane,
    /// Pass in which the native plane was last reported.
    seen: u64,
}

/// Dense storage with slot reuse. Keys stay valid until removed.
#[derive(Debug, Default)]
struct PlaneArena {
    slots: Vec<Option<Slot>>,
    free: Vec<u32>,
}

impl PlaneArena {
    fn insert(&mut self, slot: Slot) -> PlaneKey {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(slot);
                PlaneKey(idx)
            }
            None => {
                self.slots.push(Some(slot));
                PlaneKey((self.slots.len() - 1) as u32)
            }
        }
    }

    fn get(&self, key: PlaneKey) -> Option<&Slot> {
        self.slots.get(key.0 as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, key: PlaneKey) -> Option<&mut Slot> {
        self.slots.get_mut(key.0 as usize).and_then(Option::as_mut)
    }

    fn remove(&mut self, key: PlaneKey) -> Option<Slot> {
        let slot = self.slots.get_mut(key.0 as usize)?.take()?;
        self.free.push(key.0);
        Some(slot)
    }

    fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

/// Owns every tracked [`BoundedPlane`]; see the module docs for the pass.
#[derive(Debug)]
pub struct PlaneReconciler<H> {
    index: HashMap<H, PlaneKey>,
    arena: PlaneArena,
    epsilon: f32,
    pass: u64,
    stale: Vec<H>,
}

impl<H: Copy + Eq + Hash> Default for PlaneReconciler<H> {
    fn default() -> Self {
        Self::new(DEFAULT_PLANE_CHANGE_EPSILON)
    }
}

impl<H: Copy + Eq + Hash> PlaneReconciler<H> {
    pub fn new(epsilon: f32) -> Self {
        Self {
            index: HashMap::new(),
            arena: PlaneArena::default(),
            epsilon,
            pass: 0,
            stale: Vec::new(),
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Diff `planes` (the vendor's full current set, in vendor order) against
    /// the tracked set and emit the resulting events into `sink`.
    pub fn reconcile<S: PlaneEventSink + ?Sized>(&mut self, planes: &[NativePlane<H>], sink: &mut S) {
        self.pass = self.pass.wrapping_add(1);
        let pass = self.pass;

        // 1. tracked planes
        for native in planes {
            let Some(&key) = self.index.get(&native.handle) else {
                continue;
            };
            if native.subsumed_by.is_some() {
                self.index.remove(&native.handle);
                if let Some(slot) = self.arena.remove(key) {
                    log::trace!("plane {} subsumed", slot.plane.id);
                    sink.emit(PlaneEvent::Removed(slot.plane));
                }
                continue;
            }
            let Some(slot) = self.arena.get_mut(key) else {
                continue;
            };
            slot.seen = pass;
            if slot.plane.differs_from(native, self.epsilon) {
                slot.plane.assign_from(native);
                log::trace!("plane {} updated", slot.plane.id);
                sink.emit(PlaneEvent::Updated(slot.plane.clone()));
            }
        }

        // 2. new planes
        for native in planes {
            if native.subsumed_by.is_some() || self.index.contains_key(&native.handle) {
                continue;
            }
            let plane = BoundedPlane::from_native(PlaneId::new_random(), native);
            log::trace!("plane {} added", plane.id);
            let key = self.arena.insert(Slot {
                plane: plane.clone(),
                seen: pass,
            });
            self.index.insert(native.handle, key);
            sink.emit(PlaneEvent::Added(plane));
        }

        // 3. planes the vendor stopped reporting
        self.stale.clear();
        for (handle, &key) in self.index.iter() {
            let seen = self.arena.get(key).map(|slot| slot.seen);
            if seen != Some(pass) {
                self.stale.push(*handle);
            }
        }
        for handle in self.stale.drain(..) {
            let Some(key) = self.index.remove(&handle) else {
                continue;
            };
            if let Some(slot) = self.arena.remove(key) {
                log::trace!("plane {} no longer reported", slot.plane.id);
                sink.emit(PlaneEvent::Removed(slot.plane));
            }
        }
    }

    pub fn get(&self, id: PlaneId) -> Option<&BoundedPlane> {
        self.iter().find(|p| p.id == id)
    }

    /// Tracked plane for a native handle, if any.
    pub fn get_by_handle(&self, handle: &H) -> Option<&BoundedPlane> {
        let key = *self.index.get(handle)?;
        self.arena.get(key).map(|slot| &slot.plane)
    }

    pub fn contains_handle(&self, handle: &H) -> bool {
        self.index.contains_key(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundedPlane> {
        self.arena.iter().map(|slot| &slot.plane)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Forget every tracked plane without emitting events.
    pub fn clear(&mut self) {
        self.index.clear();
        self.arena.clear();
        self.stale.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn native(handle: u32, x: f32) -> NativePlane<u32> {
        NativePlane {
            handle,
            center: Pose::from_position([x, 0.0, 0.0]),
            extent_x: 0.5,
            extent_z: 0.5,
            subsumed_by: None,
        }
    }

    fn run(rec: &mut PlaneReconciler<u32>, planes: &[NativePlane<u32>]) -> Vec<PlaneEvent> {
        let mut events = Vec::new();
        rec.reconcile(planes, &mut events);
        events
    }

    #[test]
    fn first_sighting_emits_one_added_with_fresh_id() {
        let mut rec = PlaneReconciler::default();
        let mut seen_ids = HashSet::new();
        for handle in 0..16 {
            let events = run(&mut rec, &[native(handle, 0.0)]);
            let added: Vec<_> = events
                .iter()
                .filter(|e| matches!(e, PlaneEvent::Added(_)))
                .collect();
            assert_eq!(added.len(), 1, "one Added per new handle");
            assert!(seen_ids.insert(added[0].plane().id), "ids are never reused");
        }
    }

    #[test]
    fn center_threshold() {
        let mut rec = PlaneReconciler::default();
        let added = run(&mut rec, &[native(1, 0.0)]);
        let id = added[0].plane().id;

        assert!(run(&mut rec, &[native(1, 0.004)]).is_empty());

        let events = run(&mut rec, &[native(1, 0.006)]);
        assert_eq!(events.len(), 1);
        match &events[0] {
            PlaneEvent::Updated(p) => {
                assert_eq!(p.id, id);
                assert_eq!(p.center, [0.006, 0.0, 0.0]);
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn jitter_is_measured_against_last_reported_geometry() {
        let mut rec = PlaneReconciler::default();
        run(&mut rec, &[native(1, 0.0)]);
        assert!(run(&mut rec, &[native(1, 0.003)]).is_empty());
        // 0.0045 from the stored center, still below threshold.
        assert!(run(&mut rec, &[native(1, 0.0045)]).is_empty());
        assert_eq!(run(&mut rec, &[native(1, 0.0051)]).len(), 1);
    }

    #[test]
    fn extent_change_and_any_rotation_change_update() {
        let mut rec = PlaneReconciler::default();
        run(&mut rec, &[native(1, 0.0)]);

        let mut grown = native(1, 0.0);
        grown.extent_x = 0.51;
        assert_eq!(run(&mut rec, &[grown]).len(), 1);

        let mut turned = grown;
        turned.center.rotation = [0.0, 1e-6, 0.0, 1.0];
        let events = run(&mut rec, &[turned]);
        assert!(matches!(events.as_slice(), [PlaneEvent::Updated(_)]));
    }

    #[test]
    fn absent_plane_is_removed_once() {
        let mut rec = PlaneReconciler::default();
        let id = run(&mut rec, &[native(1, 0.0), native(2, 1.0)])[0].plane().id;

        let events = run(&mut rec, &[native(2, 1.0)]);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], PlaneEvent::Removed(p) if p.id == id));
        assert!(!rec.contains_handle(&1));
        assert!(rec.get(id).is_none());
        assert_eq!(rec.len(), 1);

        assert!(run(&mut rec, &[native(2, 1.0)]).is_empty());
    }

    #[test]
    fn subsumption_wins_over_update() {
        let mut rec = PlaneReconciler::default();
        run(&mut rec, &[native(1, 0.0), native(2, 1.0)]);

        let mut merged = native(1, 0.5);
        merged.subsumed_by = Some(2);
        let events = run(&mut rec, &[merged, native(2, 1.0)]);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PlaneEvent::Removed(_)));
        assert!(!rec.contains_handle(&1));

        // Still reported as subsumed next frame: not re-added.
        assert!(run(&mut rec, &[merged, native(2, 1.0)]).is_empty());
    }

    #[test]
    fn pass_order_is_updates_then_adds_then_orphans() {
        let mut rec = PlaneReconciler::default();
        run(&mut rec, &[native(1, 0.0), native(2, 0.0)]);

        let events = run(&mut rec, &[native(3, 0.0), native(1, 1.0)]);
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                PlaneEvent::Added(_) => "added",
                PlaneEvent::Updated(_) => "updated",
                PlaneEvent::Removed(_) => "removed",
            })
            .collect();
        assert_eq!(kinds, ["updated", "added", "removed"]);
    }

    #[test]
    fn mapping_holds_one_record_per_live_handle() {
        let mut rec = PlaneReconciler::default();
        run(&mut rec, &[native(1, 0.0), native(1, 0.0), native(2, 0.0)]);
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.iter().count(), 2);

        // Slot reuse after removal keeps lookups consistent.
        run(&mut rec, &[native(2, 0.0)]);
        run(&mut rec, &[native(2, 0.0), native(4, 3.0)]);
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get_by_handle(&4).map(|p| p.center[0]), Some(3.0));
    }

    #[test]
    fn clear_drops_everything_silently() {
        let mut rec = PlaneReconciler::default();
        run(&mut rec, &[native(1, 0.0)]);
        rec.clear();
        assert!(rec.is_empty());
        assert_eq!(run(&mut rec, &[native(1, 0.0)]).len(), 1);
    }
}
