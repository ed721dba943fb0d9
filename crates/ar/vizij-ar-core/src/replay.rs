//! Recorded sessions and a provider that replays them.
//!
//! A [`Recording`] is a JSON-friendly list of vendor frames. [`ReplayProvider`]
//! serves one frame per `begin_frame` and then holds on the last one, which is
//! enough to drive the session deterministically in tests and offline tools.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::ArConfig;
use crate::image::{CameraFrame, ImagePlane};
use crate::orientation::ScreenOrientation;
use crate::planes::NativePlane;
use crate::pose::Pose;
use crate::provider::{ArProvider, SessionStatus, TrackableFilter};

/// Planar image as captured. Strides default to a tightly packed luma plane
/// and semi-planar (pixel stride 2) chroma planes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedImage {
    pub width: usize,
    pub height: usize,
    pub y: Vec<u8>,
    pub u: Vec<u8>,
    pub v: Vec<u8>,
    #[serde(default)]
    pub y_row_stride: Option<usize>,
    #[serde(default)]
    pub uv_row_stride: Option<usize>,
    #[serde(default = "default_uv_pixel_stride")]
    pub uv_pixel_stride: usize,
}

fn default_uv_pixel_stride() -> usize {
    2
}

impl RecordedImage {
    fn as_frame(&self) -> CameraFrame<'_> {
        let y_row = self.y_row_stride.unwrap_or(self.width);
        let uv_row = self.uv_row_stride.unwrap_or(self.width);
        CameraFrame {
            available: true,
            width: self.width,
            height: self.height,
            y: ImagePlane::new(&self.y, y_row, 1),
            u: ImagePlane::new(&self.u, uv_row, self.uv_pixel_stride),
            v: ImagePlane::new(&self.v, uv_row, self.uv_pixel_stride),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedFrame {
    pub status: SessionStatus,
    pub planes: Vec<NativePlane<u64>>,
    pub camera_pose: Pose,
    pub points: Vec<[f32; 3]>,
    pub pixel_intensity: Option<f32>,
    pub orientation: ScreenOrientation,
    pub image: Option<RecordedImage>,
}

impl Default for RecordedFrame {
    fn default() -> Self {
        Self {
            status: SessionStatus::Tracking,
            planes: Vec::new(),
            camera_pose: Pose::IDENTITY,
            points: Vec::new(),
            pixel_intensity: None,
            orientation: ScreenOrientation::Unknown,
            image: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    /// Status reported by `connect`.
    pub connect_status: SessionStatus,
    pub frames: Vec<RecordedFrame>,
}

impl Default for Recording {
    fn default() -> Self {
        Self {
            connect_status: SessionStatus::Initializing,
            frames: Vec::new(),
        }
    }
}

impl Recording {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// [`ArProvider`] backed by a [`Recording`]. Plane handles are the recorded
/// `u64` ids; anchors are indices into a local table.
#[derive(Debug)]
pub struct ReplayProvider {
    recording: Recording,
    connected: bool,
    cursor: Option<usize>,
    known_planes: HashSet<u64>,
    new_planes: HashSet<u64>,
    anchors: Vec<Option<Pose>>,
}

impl ReplayProvider {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording,
            connected: false,
            cursor: None,
            known_planes: HashSet::new(),
            new_planes: HashSet::new(),
            anchors: Vec::new(),
        }
    }

    /// Index of the frame currently served, `None` before the first frame.
    pub fn frame_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Simulate the vendor relocating (or losing, with `None`) an anchor.
    pub fn set_anchor_pose(&mut self, anchor: u32, pose: Option<Pose>) {
        if let Some(slot) = self.anchors.get_mut(anchor as usize) {
            *slot = pose;
        }
    }

    /// Anchors created and not yet detached.
    pub fn live_anchors(&self) -> usize {
        self.anchors.iter().filter(|a| a.is_some()).count()
    }

    fn frame(&self) -> Option<&RecordedFrame> {
        if !self.connected {
            return None;
        }
        self.recording.frames.get(self.cursor?)
    }
}

impl ArProvider for ReplayProvider {
    type PlaneHandle = u64;
    type AnchorHandle = u32;

    fn connect(&mut self, _config: &ArConfig) -> SessionStatus {
        self.connected = !self.recording.connect_status.is_error();
        self.recording.connect_status
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.cursor = None;
        self.known_planes.clear();
        self.new_planes.clear();
        self.anchors.clear();
    }

    fn begin_frame(&mut self) {
        if !self.connected || self.recording.frames.is_empty() {
            return;
        }
        let last = self.recording.frames.len() - 1;
        let next = self.cursor.map_or(0, |c| (c + 1).min(last));
        self.cursor = Some(next);

        self.new_planes.clear();
        for plane in &self.recording.frames[next].planes {
            if self.known_planes.insert(plane.handle) {
                self.new_planes.insert(plane.handle);
            }
        }
    }

    fn status(&self) -> SessionStatus {
        if !self.connected {
            return SessionStatus::None;
        }
        match self.frame() {
            Some(frame) => frame.status,
            None => self.recording.connect_status,
        }
    }

    fn planes(&self, filter: TrackableFilter, out: &mut Vec<NativePlane<u64>>) {
        out.clear();
        let Some(frame) = self.frame() else {
            return;
        };
        match filter {
            TrackableFilter::All => out.extend_from_slice(&frame.planes),
            TrackableFilter::New => out.extend(
                frame
                    .planes
                    .iter()
                    .filter(|p| self.new_planes.contains(&p.handle))
                    .copied(),
            ),
        }
    }

    fn camera_pose(&self) -> Pose {
        self.frame().map_or(Pose::IDENTITY, |f| f.camera_pose)
    }

    fn camera_image(&self) -> CameraFrame<'_> {
        match self.frame().and_then(|f| f.image.as_ref()) {
            Some(image) => image.as_frame(),
            None => CameraFrame::unavailable(),
        }
    }

    fn point_cloud(&self, out: &mut Vec<[f32; 3]>) {
        out.clear();
        if let Some(frame) = self.frame() {
            out.extend_from_slice(&frame.points);
        }
    }

    fn pixel_intensity(&self) -> Option<f32> {
        self.frame()?.pixel_intensity
    }

    fn screen_orientation(&self) -> ScreenOrientation {
        self.frame()
            .map_or(ScreenOrientation::Unknown, |f| f.orientation)
    }

    fn create_anchor(&mut self, pose: Pose) -> Option<u32> {
        if self.status() != SessionStatus::Tracking {
            return None;
        }
        self.anchors.push(Some(pose));
        Some((self.anchors.len() - 1) as u32)
    }

    fn anchor_pose(&self, anchor: u32) -> Option<Pose> {
        self.anchors.get(anchor as usize).copied().flatten()
    }

    fn detach_anchor(&mut self, anchor: u32) {
        if let Some(slot) = self.anchors.get_mut(anchor as usize) {
            *slot = None;
        }
    }
}
