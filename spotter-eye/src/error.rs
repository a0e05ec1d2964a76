//! Error types for spotter-eye

use spotter_core::Error as CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Camera model not calibrated")]
    NotCalibrated,

    #[error(
        "Dimension mismatch: color frame is {color_width}x{color_height}, depth frame is {depth_width}x{depth_height}"
    )]
    DimensionMismatch {
        color_width: u32,
        color_height: u32,
        depth_width: u32,
        depth_height: u32,
    },

    #[error("Invalid color range '{name}': {reason}")]
    InvalidRange { name: String, reason: String },

    /// Raised per contour; the locator drops the contour and keeps going
    #[error("No valid depth samples around pixel ({x}, {y})")]
    AllDepthInvalid { x: i32, y: i32 },

    #[error("Calibration error: {0}")]
    Calibration(String),

    #[error("Frame error: {0}")]
    Frame(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OpenCV error: {0}")]
    OpenCv(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl VisionError {
    pub(crate) fn invalid_range(name: &str, reason: impl Into<String>) -> Self {
        VisionError::InvalidRange {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<VisionError> for CoreError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Core(inner) => inner,
            other => CoreError::Vision(other.to_string()),
        }
    }
}

impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}

pub type Result<T> = std::result::Result<T, VisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_error_display() {
        let err = VisionError::DimensionMismatch {
            color_width: 640,
            color_height: 480,
            depth_width: 320,
            depth_height: 240,
        };
        let msg = err.to_string();
        assert!(msg.contains("640x480"));
        assert!(msg.contains("320x240"));

        let err = VisionError::invalid_range("blue", "lower hue 40 exceeds upper hue 20");
        assert!(err.to_string().contains("'blue'"));
    }

    #[test]
    fn test_vision_error_to_core_error() {
        let core_err: CoreError = VisionError::NotCalibrated.into();
        match core_err {
            CoreError::Vision(msg) => assert!(msg.contains("not calibrated")),
            _ => panic!("Expected Vision error"),
        }
    }

    #[test]
    fn test_core_error_round_trip() {
        let vision_err: VisionError = CoreError::Configuration("rate".to_string()).into();
        let core_err: CoreError = vision_err.into();
        assert!(matches!(core_err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_from_opencv() {
        let err: VisionError = opencv::Error::new(0, "boom".to_string()).into();
        match err {
            VisionError::OpenCv(msg) => assert_eq!(msg, "boom"),
            _ => panic!("Expected OpenCv error"),
        }
    }
}
