use bevy::prelude::*;
use vizij_ar_core::{ArProvider, ArSession, PlaneEvent};

use crate::components::ArAnchor;
use crate::resources::{ArCameraImage, ArDisplayTransform, ArSessionResource, ArStatus};
use crate::{PlaneAdded, PlaneRemoved, PlaneUpdated};

/// Advances the session one frame, forwards plane events and refreshes the
/// status and display transform resources.
pub fn session_update_system<P>(
    session: Option<ResMut<ArSessionResource<P>>>,
    mut status: ResMut<ArStatus>,
    mut display: ResMut<ArDisplayTransform>,
    mut added: EventWriter<PlaneAdded>,
    mut updated: EventWriter<PlaneUpdated>,
    mut removed: EventWriter<PlaneRemoved>,
) where
    P: ArProvider + 'static,
    ArSession<P>: Send + Sync,
{
    let Some(mut session) = session else {
        return;
    };
    let outputs = session.0.update();
    status.0 = outputs.status;
    for event in &outputs.events {
        match event {
            PlaneEvent::Added(plane) => {
                added.send(PlaneAdded(plane.clone()));
            }
            PlaneEvent::Updated(plane) => {
                updated.send(PlaneUpdated(plane.clone()));
            }
            PlaneEvent::Removed(plane) => {
                removed.send(PlaneRemoved(plane.clone()));
            }
        }
    }
    let transform = session.0.display_transform();
    if display.0 != transform {
        display.0 = transform;
    }
}

/// Transcodes the current camera image when the app has opted in by
/// inserting [`ArCameraImage`].
pub fn camera_image_system<P>(
    session: Option<ResMut<ArSessionResource<P>>>,
    image: Option<ResMut<ArCameraImage>>,
) where
    P: ArProvider + 'static,
    ArSession<P>: Send + Sync,
{
    let (Some(mut session), Some(mut image)) = (session, image) else {
        return;
    };
    let image = &mut *image;
    image.valid = session.0.try_get_camera_image(&mut image.buffer);
}

/// Copies synced anchor poses onto tagged entities.
pub fn anchor_transform_system<P>(
    session: Option<Res<ArSessionResource<P>>>,
    mut anchors: Query<(&ArAnchor, &mut Transform)>,
) where
    P: ArProvider + 'static,
    ArSession<P>: Send + Sync,
{
    let Some(session) = session else {
        return;
    };
    for (anchor, mut transform) in anchors.iter_mut() {
        if let Some(pose) = session.0.anchor_pose(&anchor.id) {
            transform.translation = Vec3::from_array(pose.position);
            transform.rotation = Quat::from_array(pose.rotation).normalize();
        }
    }
}
