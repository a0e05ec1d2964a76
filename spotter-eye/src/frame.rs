//! Color and depth frames handed to the locator

use crate::error::{Result, VisionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel order of an 8-bit, 3-channel color frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelOrder {
    #[default]
    Rgb8,
    Bgr8,
}

/// 8-bit 3-channel color image
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFrame {
    width: u32,
    height: u32,
    order: PixelOrder,
    data: Vec<u8>,
    stamp: DateTime<Utc>,
}

impl ColorFrame {
    pub fn new(width: u32, height: u32, order: PixelOrder, data: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height)?
            .checked_mul(3)
            .ok_or_else(|| VisionError::Frame("color frame size overflows".to_string()))?;
        if data.len() != expected {
            return Err(VisionError::Frame(format!(
                "color frame {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            order,
            data,
            stamp: Utc::now(),
        })
    }

    /// Frame filled with a single color given in the frame's channel order
    pub fn filled(width: u32, height: u32, order: PixelOrder, pixel: [u8; 3]) -> Result<Self> {
        let count = pixel_count(width, height)?;
        let data = pixel.iter().copied().cycle().take(count * 3).collect();
        Self::new(width, height, order, data)
    }

    pub fn with_stamp(mut self, stamp: DateTime<Utc>) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn order(&self) -> PixelOrder {
        self.order
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn stamp(&self) -> DateTime<Utc> {
        self.stamp
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Overwrite the inclusive rectangle `[x0, x1] x [y0, y1]`, clipped to the frame
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, pixel: [u8; 3]) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let x1 = x1.min(self.width - 1);
        let y1 = y1.min(self.height - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let idx = (y as usize * self.width as usize + x as usize) * 3;
                self.data[idx..idx + 3].copy_from_slice(&pixel);
            }
        }
    }
}

/// Depth image registered to a color frame, in metres.
///
/// Non-finite samples are invalid; zero is a valid reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    width: u32,
    height: u32,
    data: Vec<f32>,
    stamp: DateTime<Utc>,
}

impl DepthFrame {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = pixel_count(width, height)?;
        if data.len() != expected {
            return Err(VisionError::Frame(format!(
                "depth frame {}x{} needs {} samples, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
            stamp: Utc::now(),
        })
    }

    pub fn filled(width: u32, height: u32, depth: f32) -> Result<Self> {
        let count = pixel_count(width, height)?;
        Self::new(width, height, vec![depth; count])
    }

    /// From 16-bit millimetre depth, where 0 means "no return"
    pub fn from_millimetres(width: u32, height: u32, data: &[u16]) -> Result<Self> {
        let metres = data
            .iter()
            .map(|&mm| if mm == 0 { f32::NAN } else { f32::from(mm) / 1000.0 })
            .collect();
        Self::new(width, height, metres)
    }

    pub fn with_stamp(mut self, stamp: DateTime<Utc>) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn stamp(&self) -> DateTime<Utc> {
        self.stamp
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Overwrite the inclusive rectangle `[x0, x1] x [y0, y1]`, clipped to the frame
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, depth: f32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let x1 = x1.min(self.width - 1);
        let y1 = y1.min(self.height - 1);
        for y in y0..=y1 {
            let row = y as usize * self.width as usize;
            for x in x0..=x1 {
                self.data[row + x as usize] = depth;
            }
        }
    }
}

/// A color frame and the depth frame registered to it
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBundle {
    pub color: ColorFrame,
    pub depth: DepthFrame,
}

impl FrameBundle {
    pub fn new(color: ColorFrame, depth: DepthFrame) -> Result<Self> {
        check_dimensions(&color, &depth)?;
        Ok(Self { color, depth })
    }

    pub fn stamp(&self) -> DateTime<Utc> {
        self.color.stamp()
    }
}

pub(crate) fn check_dimensions(color: &ColorFrame, depth: &DepthFrame) -> Result<()> {
    if color.width() != depth.width() || color.height() != depth.height() {
        return Err(VisionError::DimensionMismatch {
            color_width: color.width(),
            color_height: color.height(),
            depth_width: depth.width(),
            depth_height: depth.height(),
        });
    }
    Ok(())
}

fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(VisionError::Frame("frame dimensions must be non-zero".to_string()));
    }
    // OpenCV indexes rows and columns with i32
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(VisionError::Frame("frame dimensions too large".to_string()));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| VisionError::Frame("frame size overflows".to_string()))
}
