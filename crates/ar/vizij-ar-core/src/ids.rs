//! Identifiers handed out to consumers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a tracked plane. Generated fresh for every plane the
/// reconciler starts tracking and never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PlaneId(pub Uuid);

impl PlaneId {
    #[inline]
    pub fn new_random() -> Self {
        PlaneId(Uuid::new_v4())
    }
}

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Index into the reconciler's plane arena. Internal; never leaves the crate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct PlaneKey(pub(crate) u32);
