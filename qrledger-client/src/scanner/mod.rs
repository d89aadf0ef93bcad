//! Scan loop and the decoder capability it drives.

mod camera;
mod cooldown;
mod line;
mod scan_loop;

pub use camera::CameraError;
pub use cooldown::CooldownFilter;
pub use line::{CAMERA_ERROR_PREFIX, LineDecoder};
pub use scan_loop::{ScanHandler, ScanLoop, ScanState};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("camera unavailable: {0}")]
    Camera(CameraError),

    #[error("decoder input failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CameraError> for ScannerError {
    fn from(error: CameraError) -> Self {
        ScannerError::Camera(error)
    }
}

/// Tuning passed to decoding engines that support it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderHints {
    pub max_scans_per_second: u32,
    pub preferred_camera: String,
    /// Side of the square scan region as a fraction of the smaller frame side.
    pub scan_region: f32,
}

impl Default for DecoderHints {
    fn default() -> Self {
        Self {
            max_scans_per_second: 3,
            preferred_camera: "environment".to_string(),
            scan_region: 0.7,
        }
    }
}

/// A swappable decoding engine.
///
/// `start` and `stop` may be called repeatedly; payloads decoded while the
/// engine is stopped must never be returned from `on_result`.
#[async_trait]
pub trait Decoder: Send {
    async fn start(&mut self) -> Result<(), ScannerError>;

    async fn stop(&mut self);

    /// Next decoded payload. `Ok(None)` means the source is exhausted.
    async fn on_result(&mut self) -> Result<Option<String>, ScannerError>;
}
