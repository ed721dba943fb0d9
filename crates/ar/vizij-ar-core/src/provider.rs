//! Boundary to the vendor AR SDK.
//!
//! Everything vendor-specific (session negotiation, trackable storage, camera
//! access, anchors) lives behind [`ArProvider`]. The core only ever sees
//! snapshots: [`NativePlane`] values, borrowed [`CameraFrame`]s and poses.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::config::ArConfig;
use crate::image::CameraFrame;
use crate::orientation::ScreenOrientation;
use crate::planes::NativePlane;
use crate::pose::Pose;

/// Vendor session status. Values are grouped: `0x1xx` tracking family,
/// `0x2xx` errors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum SessionStatus {
    #[default]
    None = 0x000,
    Initializing = 0x001,
    Tracking = 0x100,
    LostTracking = 0x101,
    NotTracking = 0x102,
    FatalError = 0x200,
    ErrorApkNotAvailable = 0x201,
    ErrorPermissionNotGranted = 0x202,
    ErrorSessionConfigurationNotSupported = 0x203,
    ErrorCameraNotAvailable = 0x204,
    ErrorIllegalState = 0x205,
}

impl SessionStatus {
    #[inline]
    fn bits(self) -> u16 {
        self as u16
    }

    /// Session has not finished connecting yet.
    #[inline]
    pub fn is_not_initialized(self) -> bool {
        matches!(self, SessionStatus::None | SessionStatus::Initializing)
    }

    /// Connected and usable, whether or not tracking is currently good.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.bits() & 0x100 != 0
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self.bits() & 0x200 != 0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackableFilter {
    /// Every trackable the session knows about, subsumed ones included.
    #[default]
    All,
    /// Only trackables first reported during the current frame.
    New,
}

/// The vendor SDK as seen by [`ArSession`](crate::ArSession).
///
/// All calls happen on the frame thread. `begin_frame` is the only place the
/// vendor's own task queue is pumped.
pub trait ArProvider {
    /// Vendor identity of a detected plane, valid for the session's lifetime.
    type PlaneHandle: Copy + Eq + Hash + Debug;
    type AnchorHandle: Copy + Eq + Debug;

    /// Negotiate the session. Returns the status reached; error statuses are
    /// treated as fatal by the caller.
    fn connect(&mut self, config: &ArConfig) -> SessionStatus;
    fn disconnect(&mut self);

    /// Advance to the next vendor frame.
    fn begin_frame(&mut self);
    fn status(&self) -> SessionStatus;

    /// Replace `out` with the current native planes, in vendor order.
    fn planes(&self, filter: TrackableFilter, out: &mut Vec<NativePlane<Self::PlaneHandle>>);

    fn camera_pose(&self) -> Pose;
    /// Borrow the current camera image. The borrow is the access scope.
    fn camera_image(&self) -> CameraFrame<'_>;
    /// Replace `out` with this frame's feature points.
    fn point_cloud(&self, out: &mut Vec<[f32; 3]>);
    /// Average pixel intensity when the vendor's estimate is valid.
    fn pixel_intensity(&self) -> Option<f32>;
    fn screen_orientation(&self) -> ScreenOrientation;

    fn create_anchor(&mut self, pose: Pose) -> Option<Self::AnchorHandle>;
    /// Current pose of an anchor, `None` if the vendor stopped tracking it.
    fn anchor_pose(&self, anchor: Self::AnchorHandle) -> Option<Pose>;
    fn detach_anchor(&mut self, anchor: Self::AnchorHandle);
}
