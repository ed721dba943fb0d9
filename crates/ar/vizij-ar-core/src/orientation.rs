//! Display transform for the camera background.
//!
//! The vendor camera texture is always delivered in the sensor's native
//! (landscape) orientation. The display transform rotates/reflects texture
//! coordinates so the background lines up with the screen for the current
//! device orientation.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    AutoRotation,
    #[default]
    Unknown,
}

/// Row-major 4x4 matrix. Only the upper-left 2x2 block ever differs from
/// identity.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    pub m: [[f32; 4]; 4],
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DisplayTransform {
    pub const IDENTITY: DisplayTransform = DisplayTransform {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    fn from_cos_sin(cos: f32, sin: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.m[0][0] = cos;
        t.m[0][1] = sin;
        t.m[1][0] = sin;
        t.m[1][1] = -cos;
        t
    }

    /// Apply the 2x2 block to a texture coordinate.
    #[inline]
    pub fn transform_uv(&self, uv: [f32; 2]) -> [f32; 2] {
        [
            self.m[0][0] * uv[0] + self.m[0][1] * uv[1],
            self.m[1][0] * uv[0] + self.m[1][1] * uv[1],
        ]
    }
}

/// Compute the display transform for an orientation.
///
/// Orientations without a fixed rotation (`AutoRotation`, `Unknown`) use the
/// landscape-left matrix. Hosts on platforms that never report an orientation
/// rely on that fallback.
pub fn display_transform(orientation: ScreenOrientation) -> DisplayTransform {
    let (cos, sin) = match orientation {
        ScreenOrientation::Portrait => (0.0, -1.0),
        ScreenOrientation::PortraitUpsideDown => (0.0, 1.0),
        ScreenOrientation::LandscapeLeft => (1.0, 0.0),
        ScreenOrientation::LandscapeRight => (-1.0, 0.0),
        _ => (1.0, 0.0),
    };
    DisplayTransform::from_cos_sin(cos, sin)
}

/// Keeps the last computed transform and only recomputes on orientation change.
#[derive(Clone, Debug, Default)]
pub struct DisplayTransformCache {
    last: Option<(ScreenOrientation, DisplayTransform)>,
}

impl DisplayTransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, orientation: ScreenOrientation) -> DisplayTransform {
        match self.last {
            Some((cached, transform)) if cached == orientation => transform,
            _ => {
                let transform = display_transform(orientation);
                log::debug!("display transform recomputed for {orientation:?}");
                self.last = Some((orientation, transform));
                transform
            }
        }
    }

    /// Orientation the cached transform was computed for.
    pub fn orientation(&self) -> Option<ScreenOrientation> {
        self.last.map(|(o, _)| o)
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
