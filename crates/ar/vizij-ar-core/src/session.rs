//! Session: owns the provider and the per-frame state, and exposes the
//! pull-based queries hosts call once per rendered frame.
//!
//! Methods:
//! - start, stop, update (pump vendor → reconcile planes → sync anchors → notify)
//! - try_get_pose, try_get_camera_image, try_get_point_cloud, light_estimate,
//!   display_transform
//! - apply_anchor, destroy_anchor, anchor_pose

use std::fmt;

use crate::anchors::AnchorStore;
use crate::config::ArConfig;
use crate::error::{SessionError, TranscodeRejection};
use crate::ids::PlaneId;
use crate::image::{transcode, CameraImageBuffer, ChromaAbsence, ChromaOutcome};
use crate::orientation::{DisplayTransform, DisplayTransformCache};
use crate::outputs::{Outputs, PlaneEvent};
use crate::planes::{BoundedPlane, NativePlane, PlaneReconciler};
use crate::pose::{LightEstimate, LightEstimateCapabilities, PointCloud, Pose};
use crate::provider::{ArProvider, SessionStatus, TrackableFilter};

/// Push-based plane listener, called synchronously from [`ArSession::update`].
pub type PlaneListener = Box<dyn FnMut(&PlaneEvent) + Send + Sync>;

pub struct ArSession<P: ArProvider> {
    provider: P,
    config: ArConfig,
    running: bool,
    status: SessionStatus,

    planes: PlaneReconciler<P::PlaneHandle>,
    anchors: AnchorStore<P::AnchorHandle>,
    display: DisplayTransformCache,

    // Per-frame scratch and outputs
    native_planes: Vec<NativePlane<P::PlaneHandle>>,
    outputs: Outputs,
    listeners: Vec<PlaneListener>,
    last_image: Option<Result<ChromaOutcome, TranscodeRejection>>,
}

impl<P: ArProvider> fmt::Debug for ArSession<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArSession")
            .field("config", &self.config)
            .field("running", &self.running)
            .field("status", &self.status)
            .field("planes", &self.planes.len())
            .field("anchors", &self.anchors.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<P: ArProvider> ArSession<P> {
    /// Connect `provider` with `config`.
    ///
    /// Fatal vendor statuses (permission denied, unsupported configuration,
    /// missing service, ...) abort startup. Any other status starts the
    /// session; tracking may begin on a later frame.
    pub fn start(mut provider: P, config: ArConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let status = provider.connect(&config);
        if let Some(err) = SessionError::from_status(status) {
            log::error!("AR session failed to start: {err}");
            provider.disconnect();
            return Err(err);
        }
        log::info!("AR session started (status {status:?})");
        Ok(Self {
            planes: PlaneReconciler::new(config.plane_change_epsilon),
            provider,
            config,
            running: true,
            status,
            anchors: AnchorStore::new(),
            display: DisplayTransformCache::new(),
            native_planes: Vec::new(),
            outputs: Outputs::default(),
            listeners: Vec::new(),
            last_image: None,
        })
    }

    /// Disconnect and drop all planes and anchors. No events are raised.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        let provider = &mut self.provider;
        self.anchors.drain(|native| provider.detach_anchor(native));
        self.planes.clear();
        self.display.invalidate();
        self.outputs.clear();
        self.provider.disconnect();
        self.running = false;
        self.status = SessionStatus::None;
        log::info!("AR session stopped");
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[inline]
    pub fn config(&self) -> &ArConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Register a plane listener for the rest of the session.
    pub fn subscribe(&mut self, listener: impl FnMut(&PlaneEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Advance one frame.
    ///
    /// Plane reconciliation is skipped entirely unless the session is running,
    /// tracking, and plane detection is enabled.
    pub fn update(&mut self) -> &Outputs {
        self.outputs.clear();
        if !self.running {
            self.outputs.status = self.status;
            return &self.outputs;
        }

        self.provider.begin_frame();
        let status = self.provider.status();
        if status != self.status {
            log::debug!("AR session status {:?} -> {:?}", self.status, status);
            self.status = status;
        }
        self.outputs.status = status;
        if status != SessionStatus::Tracking {
            return &self.outputs;
        }

        if self.config.enable_plane_detection {
            self.provider
                .planes(TrackableFilter::All, &mut self.native_planes);
            self.planes.reconcile(&self.native_planes, &mut self.outputs);
        }

        let provider = &self.provider;
        self.anchors.sync(|native| provider.anchor_pose(native));

        for event in &self.outputs.events {
            for listener in self.listeners.iter_mut() {
                listener(event);
            }
        }
        &self.outputs
    }

    /// Outputs of the most recent [`update`](Self::update).
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn planes(&self) -> impl Iterator<Item = &BoundedPlane> {
        self.planes.iter()
    }

    pub fn plane(&self, id: PlaneId) -> Option<&BoundedPlane> {
        self.planes.get(id)
    }

    /// Camera pose, only while tracking.
    pub fn try_get_pose(&self) -> Option<Pose> {
        if self.running && self.status == SessionStatus::Tracking {
            Some(self.provider.camera_pose())
        } else {
            None
        }
    }

    /// Fill `out` with the current camera image. `false` means nothing usable
    /// this frame; try again next frame.
    pub fn try_get_camera_image(&mut self, out: &mut CameraImageBuffer) -> bool {
        if !self.running {
            return false;
        }
        let frame = self.provider.camera_image();
        let result = transcode(&frame, self.config.camera_image_luma_only, out);
        if self.last_image != Some(result) {
            log_image_layout(&result);
            self.last_image = Some(result);
        }
        result.is_ok()
    }

    pub fn try_get_point_cloud(&self, out: &mut PointCloud) -> bool {
        if !self.running
            || !self.config.enable_point_cloud
            || self.status != SessionStatus::Tracking
        {
            return false;
        }
        self.provider.point_cloud(&mut out.points);
        true
    }

    pub fn light_estimate(&self) -> Option<LightEstimate> {
        if !self.running || !self.config.enable_light_estimation {
            return None;
        }
        let intensity = self.provider.pixel_intensity()?;
        Some(LightEstimate {
            capabilities: LightEstimateCapabilities {
                ambient_intensity: true,
                ambient_color_temperature: false,
            },
            ambient_intensity: intensity,
            ambient_color_temperature: 0.0,
        })
    }

    /// Display transform for the provider's current screen orientation.
    pub fn display_transform(&mut self) -> DisplayTransform {
        self.display.get(self.provider.screen_orientation())
    }

    /// Pin a vendor anchor at `pose` under `id`, replacing any anchor already
    /// stored under that id. Requires tracking.
    pub fn apply_anchor(&mut self, id: impl Into<String>, pose: Pose) -> bool {
        if !self.running || self.status != SessionStatus::Tracking {
            return false;
        }
        let Some(native) = self.provider.create_anchor(pose) else {
            return false;
        };
        if let Some(previous) = self.anchors.insert(id, native, pose) {
            self.provider.detach_anchor(previous);
        }
        true
    }

    pub fn destroy_anchor(&mut self, id: &str) -> bool {
        match self.anchors.remove(id) {
            Some(native) => {
                self.provider.detach_anchor(native);
                true
            }
            None => false,
        }
    }

    pub fn anchor_pose(&self, id: &str) -> Option<Pose> {
        self.anchors.pose(id)
    }

    pub fn anchor_ids(&self) -> impl Iterator<Item = &str> {
        self.anchors.ids()
    }
}

fn log_image_layout(result: &Result<ChromaOutcome, TranscodeRejection>) {
    match result {
        Ok(ChromaOutcome::Absent(ChromaAbsence::LumaOnly)) | Ok(ChromaOutcome::Interleaved) => {}
        Ok(ChromaOutcome::Absent(reason)) => {
            log::debug!("camera chroma layout unsupported, serving luma only: {reason:?}");
        }
        Err(TranscodeRejection::Unavailable) => {}
        Err(rejection) => log::debug!("camera image rejected: {rejection}"),
    }
}
