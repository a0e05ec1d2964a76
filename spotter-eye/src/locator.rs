//! Color blob detection projected into 3D

use crate::camera::{camera_to_output, CameraInfo, CameraModel};
use crate::color::ColorRange;
use crate::config::LocatorConfig;
use crate::debug::{DebugCanvas, DebugImages};
use crate::error::{Result, VisionError};
use crate::frame::{check_dimensions, ColorFrame, DepthFrame, FrameBundle};
use crate::processing::contours::{self, Blob, BoundingBox, PixelPoint};
use crate::processing::{depth, mask};
use crate::utils::frame_to_mat;
use serde::{Deserialize, Serialize};
use spotter_core::Point3;
use tracing::{debug, info};

/// One colored blob located in 3D
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Name of the color range that produced the blob
    pub color: String,
    pub centroid: PixelPoint,
    pub bbox: BoundingBox,
    /// Mean valid depth around the centroid, metres
    pub depth: f64,
    /// x forward, y left, z up
    pub position: Point3,
}

/// Detections plus debug imagery when enabled
pub struct LocateOutput {
    pub detections: Vec<Detection>,
    pub debug: Option<DebugImages>,
}

/// Finds colored blobs in a color frame and places them in 3D using a
/// registered depth frame and the camera calibration.
///
/// Configuration is fixed at construction; the calibration is set through
/// [`set_calibration`](Self::set_calibration) before the first locate call.
pub struct ColorObjectLocator {
    config: LocatorConfig,
    search: Vec<ColorRange>,
    camera: Option<CameraModel>,
}

impl ColorObjectLocator {
    pub fn new(config: LocatorConfig) -> Result<Self> {
        config.validate().map_err(VisionError::Config)?;
        config.color_table.validate()?;
        let search = config.color_table.select(&config.search_colors)?;

        info!(
            "Color locator ready, searching for {:?} (opening {}x{} x{}, depth window ±{})",
            config.search_colors,
            config.morphology.kernel_size,
            config.morphology.kernel_size,
            config.morphology.iterations,
            config.depth_window_radius
        );

        Ok(Self {
            config,
            search,
            camera: None,
        })
    }

    /// Construct and calibrate in one step
    pub fn with_calibration(config: LocatorConfig, info: &CameraInfo) -> Result<Self> {
        let mut locator = Self::new(config)?;
        locator.set_calibration(info)?;
        Ok(locator)
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Ranges searched by [`locate`](Self::locate)
    pub fn search_ranges(&self) -> &[ColorRange] {
        &self.search
    }

    /// Replace the camera model; a rejected calibration leaves the old one in place
    pub fn set_calibration(&mut self, info: &CameraInfo) -> Result<()> {
        let model = CameraModel::from_camera_info(info)?;
        debug!(
            "Camera calibration set: {}x{} fx={} fy={} cx={} cy={}",
            model.width(),
            model.height(),
            model.fx(),
            model.fy(),
            model.cx(),
            model.cy()
        );
        self.camera = Some(model);
        Ok(())
    }

    pub fn clear_calibration(&mut self) {
        self.camera = None;
    }

    pub fn is_calibrated(&self) -> bool {
        self.camera.is_some()
    }

    pub fn camera_model(&self) -> Option<&CameraModel> {
        self.camera.as_ref()
    }

    /// Search the configured colors
    pub fn locate(&self, color: &ColorFrame, depth: &DepthFrame) -> Result<Vec<Detection>> {
        Ok(self.run(color, depth, &self.search, false)?.detections)
    }

    /// Search an explicit set of ranges
    pub fn locate_colors(
        &self,
        color: &ColorFrame,
        depth: &DepthFrame,
        ranges: &[ColorRange],
    ) -> Result<Vec<Detection>> {
        Ok(self.run(color, depth, ranges, false)?.detections)
    }

    pub fn locate_bundle(&self, bundle: &FrameBundle) -> Result<Vec<Detection>> {
        self.locate(&bundle.color, &bundle.depth)
    }

    /// Search the configured colors, with debug imagery if the locator was
    /// built with `debug` set
    pub fn locate_with_debug(&self, color: &ColorFrame, depth: &DepthFrame) -> Result<LocateOutput> {
        self.run(color, depth, &self.search, self.config.debug)
    }

    fn run(
        &self,
        color: &ColorFrame,
        depth: &DepthFrame,
        ranges: &[ColorRange],
        with_debug: bool,
    ) -> Result<LocateOutput> {
        let camera = self.camera.as_ref().ok_or(VisionError::NotCalibrated)?;
        check_dimensions(color, depth)?;
        for range in ranges {
            range.validate()?;
        }

        let frame = frame_to_mat(color)?;
        let hsv = mask::to_hsv(&frame, color.order(), self.config.color_table.convention())?;
        let mut canvas = if with_debug {
            Some(DebugCanvas::new(&frame, color.order())?)
        } else {
            None
        };

        let mut detections = Vec::new();
        for range in ranges {
            let cleaned = mask::cleaned_mask(&hsv, range, &self.config.morphology)?;
            let found = contours::external_contours(&cleaned)?;
            debug!("{} contour(s) for color '{}'", found.len(), range.name);

            if let Some(canvas) = canvas.as_mut() {
                canvas.add_mask(&cleaned)?;
            }

            for (index, contour) in found.iter().enumerate() {
                let Some(blob) = contours::describe(contour.iter()) else {
                    continue;
                };

                let detection = match self.place(camera, depth, &range.name, &blob) {
                    Ok(detection) => detection,
                    Err(VisionError::AllDepthInvalid { x, y }) => {
                        debug!(
                            "Dropping '{}' blob at ({}, {}) from {} contour points: no valid depth",
                            range.name, x, y, blob.point_count
                        );
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                debug!(
                    "'{}' blob at ({}, {}) from {} contour points, depth {:.3} m",
                    range.name, blob.centroid.x, blob.centroid.y, blob.point_count, detection.depth
                );
                if let Some(canvas) = canvas.as_mut() {
                    canvas.draw_blob(&found, index as i32, self.config.palette_rgb(&range.name), &blob)?;
                }
                detections.push(detection);
            }
        }

        let debug_images = match canvas {
            Some(canvas) => Some(canvas.finish(&hsv)?),
            None => None,
        };

        debug!("Located {} candidate(s)", detections.len());
        Ok(LocateOutput {
            detections,
            debug: debug_images,
        })
    }

    fn place(&self, camera: &CameraModel, depth: &DepthFrame, color: &str, blob: &Blob) -> Result<Detection> {
        let distance = depth::window_mean(depth, blob.centroid, self.config.depth_window_radius)?;
        let ray = camera.project_pixel_to_3d_ray(f64::from(blob.centroid.x), f64::from(blob.centroid.y));
        let position = camera_to_output(&ray.scale(distance));

        Ok(Detection {
            color: color.to_string(),
            centroid: blob.centroid,
            bbox: blob.bbox,
            depth: distance,
            position,
        })
    }
}
