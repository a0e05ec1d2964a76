//! Pinhole camera model built from a calibration message

use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use spotter_core::Point3;

/// Calibration as published alongside a rectified image stream.
///
/// Matrices are row-major: `k` is 3x3 intrinsics, `r` the 3x3 rectification
/// rotation, `p` the 3x4 projection of the rectified image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_distortion_model")]
    pub distortion_model: String,
    #[serde(default)]
    pub d: Vec<f64>,
    pub k: [f64; 9],
    #[serde(default = "identity3")]
    pub r: [f64; 9],
    pub p: [f64; 12],
}

fn default_distortion_model() -> String {
    "plumb_bob".to_string()
}

fn identity3() -> [f64; 9] {
    [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
}

impl CameraInfo {
    /// Distortion-free calibration with identical K and P
    pub fn ideal(width: u32, height: u32, fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            width,
            height,
            distortion_model: default_distortion_model(),
            d: vec![0.0; 5],
            k: [fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0],
            r: identity3(),
            p: [fx, 0.0, cx, 0.0, 0.0, fy, cy, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }
}

/// Read-only pinhole model; pixel coordinates refer to the rectified image
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    info: CameraInfo,
}

impl CameraModel {
    pub fn from_camera_info(info: &CameraInfo) -> Result<Self> {
        let model = Self { info: info.clone() };

        for (name, value) in [("fx", model.fx()), ("fy", model.fy())] {
            if !value.is_finite() || value == 0.0 {
                return Err(VisionError::Calibration(format!(
                    "focal length {} must be finite and non-zero, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [("cx", model.cx()), ("cy", model.cy())] {
            if !value.is_finite() {
                return Err(VisionError::Calibration(format!(
                    "principal point {} must be finite, got {}",
                    name, value
                )));
            }
        }

        Ok(model)
    }

    pub fn camera_info(&self) -> &CameraInfo {
        &self.info
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn fx(&self) -> f64 {
        self.info.p[0]
    }

    pub fn fy(&self) -> f64 {
        self.info.p[5]
    }

    pub fn cx(&self) -> f64 {
        self.info.p[2]
    }

    pub fn cy(&self) -> f64 {
        self.info.p[6]
    }

    /// Stereo baseline term of the projection matrix
    pub fn tx(&self) -> f64 {
        self.info.p[3]
    }

    pub fn ty(&self) -> f64 {
        self.info.p[7]
    }

    pub fn distortion(&self) -> &[f64] {
        &self.info.d
    }

    /// Unit ray through a pixel, camera convention (x right, y down, z forward)
    pub fn project_pixel_to_3d_ray(&self, u: f64, v: f64) -> Point3 {
        let x = (u - self.cx()) / self.fx();
        let y = (v - self.cy()) / self.fy();
        let norm = (x * x + y * y + 1.0).sqrt();
        Point3::new(x / norm, y / norm, 1.0 / norm)
    }

    /// Pixel a camera-frame point lands on, `None` when it projects to infinity
    pub fn project_3d_to_pixel(&self, point: &Point3) -> Option<(f64, f64)> {
        let p = &self.info.p;
        let x = p[0] * point.x + p[1] * point.y + p[2] * point.z + p[3];
        let y = p[4] * point.x + p[5] * point.y + p[6] * point.z + p[7];
        let w = p[8] * point.x + p[9] * point.y + p[10] * point.z + p[11];
        if w == 0.0 {
            return None;
        }
        Some((x / w, y / w))
    }
}

/// Camera axes (x right, y down, z forward) to output axes
/// (x forward, y left, z up).
pub fn camera_to_output(point: &Point3) -> Point3 {
    Point3::new(point.z, -point.x, -point.y)
}
