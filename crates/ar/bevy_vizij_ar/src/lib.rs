//! Bevy integration for the Vizij AR session.
//!
//! [`VizijArPlugin`] drives an [`ArSession`] stored in [`ArSessionResource`]
//! once per frame in `PreUpdate`, forwards plane changes as Bevy events, keeps
//! [`ArDisplayTransform`] current, fills [`ArCameraImage`] when the app asks for
//! it, and mirrors anchor poses onto entities tagged with [`ArAnchor`].

use std::marker::PhantomData;

use bevy::prelude::*;
use vizij_ar_core::{ArProvider, ArSession, BoundedPlane};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::ArAnchor;
pub use resources::{ArCameraImage, ArDisplayTransform, ArSessionResource, ArStatus};

/// A plane the provider started tracking.
#[derive(Event, Debug, Clone)]
pub struct PlaneAdded(pub BoundedPlane);

/// A tracked plane moved or changed size.
#[derive(Event, Debug, Clone)]
pub struct PlaneUpdated(pub BoundedPlane);

/// A tracked plane was subsumed or is no longer reported.
#[derive(Event, Debug, Clone)]
pub struct PlaneRemoved(pub BoundedPlane);

/// Plugin for a session backed by provider `P`.
///
/// The session itself is inserted by the app once the platform provider is
/// ready; until then the systems are no-ops.
pub struct VizijArPlugin<P>(PhantomData<fn() -> P>);

impl<P> Default for VizijArPlugin<P> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<P> Plugin for VizijArPlugin<P>
where
    P: ArProvider + 'static,
    ArSession<P>: Send + Sync,
{
    fn build(&self, app: &mut App) {
        app.add_event::<PlaneAdded>()
            .add_event::<PlaneUpdated>()
            .add_event::<PlaneRemoved>()
            .init_resource::<ArStatus>()
            .init_resource::<ArDisplayTransform>()
            .add_systems(
                PreUpdate,
                (
                    systems::session_update_system::<P>,
                    systems::camera_image_system::<P>,
                    systems::anchor_transform_system::<P>,
                )
                    .chain(),
            );
    }
}
