use bevy::prelude::*;

/// Marks an entity whose `Transform` follows the session anchor with this id.
///
/// The anchor must be registered with `ArSession::apply_anchor`; entities whose
/// id is unknown to the session are left where they are.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ArAnchor {
    pub id: String,
}

impl ArAnchor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
