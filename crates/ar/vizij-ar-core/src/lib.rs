//! Vizij AR Core (engine-agnostic)
//!
//! Adapts a vendor AR tracking SDK, modelled by the [`ArProvider`] trait, into a
//! stable per-frame interface. The interesting work lives in three places:
//! - [`planes`]: reconciles the vendor's detected planes into identity-preserving
//!   [`BoundedPlane`] records and emits added/updated/removed events.
//! - [`image`]: turns a planar YUV camera frame into a luma buffer plus an
//!   interleaved chroma buffer.
//! - [`orientation`]: the display transform used to map camera texture
//!   coordinates to the screen.
//!
//! [`ArSession`] ties them together and is what adapters (Bevy, hosts) drive
//! once per rendered frame.

pub mod anchors;
pub mod config;
pub mod error;
pub mod ids;
pub mod image;
pub mod orientation;
pub mod outputs;
pub mod planes;
pub mod pose;
pub mod provider;
pub mod replay;
pub mod session;

// Re-exports for consumers (adapters)
pub use anchors::AnchorStore;
pub use config::ArConfig;
pub use error::{ConfigError, SessionError, TranscodeRejection};
pub use ids::PlaneId;
pub use image::{transcode, CameraFrame, CameraImageBuffer, ChromaAbsence, ChromaOutcome, ImagePlane};
pub use orientation::{display_transform, DisplayTransform, DisplayTransformCache, ScreenOrientation};
pub use outputs::{Outputs, PlaneEvent, PlaneEventSink};
pub use planes::{BoundedPlane, NativePlane, PlaneReconciler};
pub use pose::{LightEstimate, LightEstimateCapabilities, PointCloud, Pose};
pub use provider::{ArProvider, SessionStatus, TrackableFilter};
pub use replay::{Recording, ReplayProvider};
pub use session::ArSession;
