//! Session configuration for vizij-ar-core.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Movement/size threshold (world units) below which plane geometry changes
/// are treated as tracking jitter.
pub const DEFAULT_PLANE_CHANGE_EPSILON: f32 = 0.005;

/// Feature toggles requested from the vendor session.
/// Missing JSON fields fall back to [`ArConfig::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArConfig {
    pub enable_plane_detection: bool,
    pub enable_point_cloud: bool,
    pub enable_light_estimation: bool,

    /// Skip chroma entirely when producing camera images.
    pub camera_image_luma_only: bool,

    /// Threshold used by the plane reconciler for center and extent changes.
    pub plane_change_epsilon: f32,
}

impl Default for ArConfig {
    fn default() -> Self {
        Self {
            enable_plane_detection: true,
            enable_point_cloud: true,
            enable_light_estimation: true,
            camera_image_luma_only: false,
            plane_change_epsilon: DEFAULT_PLANE_CHANGE_EPSILON,
        }
    }
}

impl ArConfig {
    /// Parse a JSON config blob and validate it.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: ArConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let eps = self.plane_change_epsilon;
        if !eps.is_finite() || eps < 0.0 {
            return Err(ConfigError::InvalidPlaneEpsilon(eps));
        }
        Ok(())
    }
}
