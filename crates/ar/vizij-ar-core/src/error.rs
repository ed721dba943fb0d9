//! Error types.
//!
//! Only [`SessionError`] is fatal. [`TranscodeRejection`] is an expected,
//! per-frame outcome that callers retry on the next frame.

use thiserror::Error;

use crate::provider::SessionStatus;

/// Startup failures reported by the vendor session. Never retried.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("camera permission is needed to run this application")]
    PermissionNotGranted,
    #[error("the AR service is not installed or is out of date on this device")]
    ProviderUnavailable,
    #[error("the requested session configuration is not supported on this device")]
    ConfigurationNotSupported,
    #[error("the camera is in use by another application or is not available")]
    CameraNotAvailable,
    #[error("the AR session was used in an illegal state")]
    IllegalState,
    #[error("the AR session hit a fatal error while connecting; restart the application")]
    Fatal,
    #[error("invalid session configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Map an error status to its fatal startup error. `None` for non-error statuses.
    pub fn from_status(status: SessionStatus) -> Option<Self> {
        match status {
            SessionStatus::ErrorPermissionNotGranted => Some(SessionError::PermissionNotGranted),
            SessionStatus::ErrorApkNotAvailable => Some(SessionError::ProviderUnavailable),
            SessionStatus::ErrorSessionConfigurationNotSupported => {
                Some(SessionError::ConfigurationNotSupported)
            }
            SessionStatus::ErrorCameraNotAvailable => Some(SessionError::CameraNotAvailable),
            SessionStatus::ErrorIllegalState => Some(SessionError::IllegalState),
            SessionStatus::FatalError => Some(SessionError::Fatal),
            _ => None,
        }
    }
}

/// Errors produced while loading an [`ArConfig`](crate::ArConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("plane_change_epsilon must be finite and non-negative, got {0}")]
    InvalidPlaneEpsilon(f32),
}

/// Why a camera frame produced no image at all this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TranscodeRejection {
    #[error("camera image not available")]
    Unavailable,
    #[error("frame dimensions {width}x{height} overflow the addressable size")]
    Dimensions { width: usize, height: usize },
    #[error("luma row stride {row_stride} does not match width {width}")]
    LumaStride { row_stride: usize, width: usize },
    #[error("luma plane holds {len} bytes, need {needed}")]
    LumaTooShort { len: usize, needed: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_error_statuses_are_fatal() {
        assert!(matches!(
            SessionError::from_status(SessionStatus::ErrorPermissionNotGranted),
            Some(SessionError::PermissionNotGranted)
        ));
        assert!(SessionError::from_status(SessionStatus::Tracking).is_none());
        assert!(SessionError::from_status(SessionStatus::Initializing).is_none());
    }
}
