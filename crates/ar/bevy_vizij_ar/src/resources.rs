use bevy::prelude::*;
use vizij_ar_core::{ArProvider, ArSession, CameraImageBuffer, DisplayTransform, SessionStatus};

/// The running session. Insert it once the platform provider has connected.
pub struct ArSessionResource<P: ArProvider>(pub ArSession<P>);

impl<P> Resource for ArSessionResource<P>
where
    P: ArProvider + 'static,
    ArSession<P>: Send + Sync,
{
}

/// Status reported by the most recent update.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArStatus(pub SessionStatus);

/// UV transform for the camera background quad, refreshed every frame.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct ArDisplayTransform(pub DisplayTransform);

/// Optional; when present the latest camera image is transcoded into it.
/// `valid` is false when this frame had no usable image, in which case
/// `buffer` still holds the last good one.
#[derive(Resource, Debug, Default)]
pub struct ArCameraImage {
    pub buffer: CameraImageBuffer,
    pub valid: bool,
}
