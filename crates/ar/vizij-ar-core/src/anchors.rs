//! Application anchors.
//!
//! An anchor is an application-chosen id pinned to a vendor anchor. The store
//! only keeps the last known pose; mirroring onto engine objects is up to the
//! adapter. Poses flow one way, vendor → store, once per tracking frame.

use hashbrown::HashMap;

use crate::pose::Pose;

#[derive(Clone, Debug)]
struct AnchorEntry<A> {
    native: A,
    pose: Pose,
}

#[derive(Clone, Debug)]
pub struct AnchorStore<A> {
    entries: HashMap<String, AnchorEntry<A>>,
}

impl<A> Default for AnchorStore<A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<A: Copy> AnchorStore<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `native` under `id`. Returns the native handle previously stored
    /// under the same id so the caller can detach it.
    pub fn insert(&mut self, id: impl Into<String>, native: A, pose: Pose) -> Option<A> {
        self.entries
            .insert(id.into(), AnchorEntry { native, pose })
            .map(|old| old.native)
    }

    pub fn remove(&mut self, id: &str) -> Option<A> {
        self.entries.remove(id).map(|e| e.native)
    }

    pub fn pose(&self, id: &str) -> Option<Pose> {
        self.entries.get(id).map(|e| e.pose)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Pull fresh poses from the vendor. Anchors the vendor cannot currently
    /// locate keep their last pose.
    pub fn sync(&mut self, mut vendor_pose: impl FnMut(A) -> Option<Pose>) {
        for entry in self.entries.values_mut() {
            if let Some(pose) = vendor_pose(entry.native) {
                entry.pose = pose;
            }
        }
    }

    /// Remove everything, handing each native handle to `detach`.
    pub fn drain(&mut self, mut detach: impl FnMut(A)) {
        for (_, entry) in self.entries.drain() {
            detach(entry.native);
        }
    }
}
