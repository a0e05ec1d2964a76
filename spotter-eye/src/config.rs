//! Configuration for the color object locator

use crate::color::ColorTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opening (erosion then dilation) applied to every color mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    /// Side of the square structuring element, odd
    pub kernel_size: u32,
    pub iterations: u32,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            iterations: 10,
        }
    }
}

/// Locator configuration, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Colors searched by `locate`
    pub search_colors: Vec<String>,
    /// HSV thresholds available to search
    pub color_table: ColorTable,
    pub morphology: MorphologyConfig,
    /// Half-width of the square depth window around a centroid
    pub depth_window_radius: u32,
    /// Produce debug imagery alongside detections
    pub debug: bool,
    /// RGB used to paint each color's contours in debug imagery
    pub debug_palette: BTreeMap<String, [u8; 3]>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let debug_palette = [
            ("green", [0, 255, 0]),
            ("red", [255, 0, 0]),
            ("blue_low", [0, 0, 255]),
            ("blue", [0, 0, 255]),
            ("yellow", [0, 255, 255]),
        ]
        .into_iter()
        .map(|(name, rgb)| (name.to_string(), rgb))
        .collect();

        Self {
            search_colors: vec!["blue".to_string()],
            color_table: ColorTable::default(),
            morphology: MorphologyConfig::default(),
            depth_window_radius: 10,
            debug: false,
            debug_palette,
        }
    }
}

impl LocatorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.search_colors.is_empty() {
            return Err("At least one search color is required".to_string());
        }

        if self.morphology.kernel_size == 0 || self.morphology.kernel_size % 2 == 0 {
            return Err("Morphology kernel size must be odd and non-zero".to_string());
        }

        if self.morphology.kernel_size > 31 {
            return Err("Morphology kernel size too large (max 31)".to_string());
        }

        if self.morphology.iterations > 100 {
            return Err("Morphology iterations too large (max 100)".to_string());
        }

        if self.depth_window_radius == 0 || self.depth_window_radius > 500 {
            return Err("Depth window radius must be between 1 and 500".to_string());
        }

        Ok(())
    }

    /// Debug paint color for a label, black when unknown
    pub fn palette_rgb(&self, label: &str) -> [u8; 3] {
        self.debug_palette.get(label).copied().unwrap_or([0, 0, 0])
    }
}
