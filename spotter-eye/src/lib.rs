//! spotter-eye: color object localization
//!
//! Thresholds a color frame in HSV space, cleans each mask with a
//! morphological opening, takes the external contours as candidate objects
//! and places each one in 3D using a registered depth frame and a pinhole
//! camera model.

pub mod camera;
pub mod color;
pub mod config;
pub mod debug;
pub mod error;
pub mod frame;
pub mod locator;
pub mod processing;
pub mod utils;

pub use camera::{camera_to_output, CameraInfo, CameraModel};
pub use color::{ColorRange, ColorTable, HsvBox, HueConvention};
pub use config::{LocatorConfig, MorphologyConfig};
pub use debug::{hsv_scale_image, DebugImages};
pub use error::VisionError;
pub use frame::{ColorFrame, DepthFrame, FrameBundle, PixelOrder};
pub use locator::{ColorObjectLocator, Detection, LocateOutput};
pub use processing::{Blob, BoundingBox, PixelPoint};
