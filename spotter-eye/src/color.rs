//! HSV threshold ranges
//!
//! Values follow the 8-bit OpenCV convention: hue in `[0, 180]`, saturation
//! and value in `[0, 255]`. A [`ColorRange`] is a union of inclusive boxes so
//! hues that wrap around the circular boundary (reds) are written as two
//! boxes instead of one inverted range.

use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};

const CHANNELS: [&str; 3] = ["hue", "saturation", "value"];

/// One inclusive lower/upper box in HSV space.
///
/// Configuration files may give a box either as `lower`/`upper` in OpenCV
/// units or as `standard_lower`/`standard_upper` in degrees and percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HsvBoxRepr")]
pub struct HsvBox {
    pub lower: [u16; 3],
    pub upper: [u16; 3],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HsvBoxRepr {
    OpenCv {
        lower: [u16; 3],
        upper: [u16; 3],
    },
    Standard {
        standard_lower: [f64; 3],
        standard_upper: [f64; 3],
    },
}

impl From<HsvBoxRepr> for HsvBox {
    fn from(repr: HsvBoxRepr) -> Self {
        match repr {
            HsvBoxRepr::OpenCv { lower, upper } => HsvBox::new(lower, upper),
            HsvBoxRepr::Standard {
                standard_lower,
                standard_upper,
            } => HsvBox::from_standard(standard_lower, standard_upper),
        }
    }
}

impl HsvBox {
    pub const fn new(lower: [u16; 3], upper: [u16; 3]) -> Self {
        Self { lower, upper }
    }

    /// Build a box from "standard" HSV: hue in degrees `[0, 360]`,
    /// saturation and value in percent `[0, 100]`.
    pub fn from_standard(lower: [f64; 3], upper: [f64; 3]) -> Self {
        Self::new(standard_to_opencv(lower), standard_to_opencv(upper))
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| {
            let v = u16::from(hsv[c]);
            self.lower[c] <= v && v <= self.upper[c]
        })
    }

    fn check(&self, name: &str) -> Result<()> {
        for (c, channel) in CHANNELS.iter().enumerate() {
            if self.lower[c] > self.upper[c] {
                return Err(VisionError::invalid_range(
                    name,
                    format!(
                        "lower {} {} exceeds upper {} {}",
                        channel, self.lower[c], channel, self.upper[c]
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn standard_to_opencv(hsv: [f64; 3]) -> [u16; 3] {
    let [h, s, v] = hsv;
    [
        (h.max(0.0) / 2.0) as u16,
        (s.max(0.0) * 255.0 / 100.0) as u16,
        (v.max(0.0) * 255.0 / 100.0) as u16,
    ]
}

/// A named color made of one or more HSV boxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub name: String,
    pub boxes: Vec<HsvBox>,
}

impl ColorRange {
    pub fn new(name: impl Into<String>, boxes: Vec<HsvBox>) -> Result<Self> {
        let range = Self {
            name: name.into(),
            boxes,
        };
        range.validate()?;
        Ok(range)
    }

    /// Single-box range
    pub fn single(name: impl Into<String>, lower: [u16; 3], upper: [u16; 3]) -> Result<Self> {
        Self::new(name, vec![HsvBox::new(lower, upper)])
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VisionError::invalid_range(&self.name, "name must not be empty"));
        }
        if self.boxes.is_empty() {
            return Err(VisionError::invalid_range(&self.name, "at least one HSV box is required"));
        }
        for hsv_box in &self.boxes {
            hsv_box.check(&self.name)?;
        }
        Ok(())
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        self.boxes.iter().any(|b| b.contains(hsv))
    }
}

/// How HSV is computed from a frame before a table's thresholds apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueConvention {
    /// Convert using the frame's declared channel order
    #[default]
    Native,
    /// Convert with red and blue exchanged. Thresholds tuned on RGB data fed
    /// through a BGR conversion only match under this convention.
    SwappedRb,
}

/// Threshold table keyed by color name, with the hue convention its numbers
/// were tuned under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTable {
    #[serde(default)]
    convention: HueConvention,
    ranges: Vec<ColorRange>,
}

impl ColorTable {
    /// Table of thresholds for the native conversion
    pub fn new(ranges: Vec<ColorRange>) -> Result<Self> {
        Self::with_convention(ranges, HueConvention::Native)
    }

    pub fn with_convention(ranges: Vec<ColorRange>, convention: HueConvention) -> Result<Self> {
        let table = Self { convention, ranges };
        table.validate()?;
        Ok(table)
    }

    pub fn convention(&self) -> HueConvention {
        self.convention
    }

    pub fn get(&self, name: &str) -> Option<&ColorRange> {
        self.ranges.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Replace or append a range
    pub fn insert(&mut self, range: ColorRange) -> Result<()> {
        range.validate()?;
        match self.ranges.iter_mut().find(|r| r.name == range.name) {
            Some(existing) => *existing = range,
            None => self.ranges.push(range),
        }
        Ok(())
    }

    /// Resolve names to ranges, failing on the first unknown name
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ColorRange>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).cloned().ok_or_else(|| {
                    VisionError::invalid_range(name, "color is not in the threshold table")
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        for (idx, range) in self.ranges.iter().enumerate() {
            range.validate()?;
            if self.ranges[..idx].iter().any(|r| r.name == range.name) {
                return Err(VisionError::invalid_range(&range.name, "duplicate color name"));
            }
        }
        Ok(())
    }
}

impl Default for ColorTable {
    /// Thresholds as tuned on the robot. Several entries look off (yellow
    /// has a zero-width hue, blue_high only covers the top of the hue
    /// circle); they are kept as calibration data rather than corrected.
    ///
    /// They were tuned with red and blue swapped before the HSV conversion,
    /// so the table carries [`HueConvention::SwappedRb`]. Under it "blue"
    /// matches sky blue and "red" matches red.
    fn default() -> Self {
        let entry = |name: &str, lower: [u16; 3], upper: [u16; 3]| ColorRange {
            name: name.to_string(),
            boxes: vec![HsvBox::new(lower, upper)],
        };

        Self {
            convention: HueConvention::SwappedRb,
            ranges: vec![
                entry("red", [110, 240, 10], [120, 255, 255]),
                entry("green", [45, 50, 10], [85, 255, 255]),
                entry("yellow", [0, 180, 100], [0, 255, 255]),
                entry("blue", [18, 100, 15], [35, 256, 200]),
                entry("blue_high", [150, 0, 0], [180, 255, 255]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_contains_inclusive() {
        let b = HsvBox::new([10, 20, 30], [40, 50, 60]);
        assert!(b.contains([10, 20, 30]));
        assert!(b.contains([40, 50, 60]));
        assert!(b.contains([25, 35, 45]));
        assert!(!b.contains([9, 35, 45]));
        assert!(!b.contains([25, 51, 45]));
    }

    #[test]
    fn test_range_rejects_inverted_channel() {
        let err = ColorRange::single("bad", [10, 200, 0], [20, 100, 255]).unwrap_err();
        match err {
            VisionError::InvalidRange { name, reason } => {
                assert_eq!(name, "bad");
                assert!(reason.contains("saturation"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_range_rejects_empty_boxes() {
        assert!(ColorRange::new("none", vec![]).is_err());
        assert!(ColorRange::single(" ", [0, 0, 0], [1, 1, 1]).is_err());
    }

    #[test]
    fn test_wrapping_hue_as_two_boxes() {
        let red = ColorRange::new(
            "red",
            vec![
                HsvBox::new([170, 100, 100], [180, 255, 255]),
                HsvBox::new([0, 100, 100], [10, 255, 255]),
            ],
        )
        .unwrap();
        assert!(red.contains([175, 200, 200]));
        assert!(red.contains([5, 200, 200]));
        assert!(!red.contains([90, 200, 200]));
    }

    #[test]
    fn test_from_standard() {
        let b = HsvBox::from_standard([200.0, 40.0, 0.0], [260.0, 100.0, 100.0]);
        assert_eq!(b.lower, [100, 102, 0]);
        assert_eq!(b.upper, [130, 255, 255]);
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = ColorTable::default();
        assert!(table.validate().is_ok());
        assert_eq!(table.len(), 5);
        // kept verbatim even though the value ceiling is off-scale
        assert_eq!(table.get("blue").unwrap().boxes[0].upper, [35, 256, 200]);
        assert_eq!(table.get("yellow").unwrap().boxes[0].lower[0], 0);
    }

    #[test]
    fn test_table_select_unknown() {
        let table = ColorTable::default();
        assert_eq!(table.select(&["green", "red"]).unwrap().len(), 2);
        assert!(matches!(
            table.select(&["purple"]),
            Err(VisionError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_table_insert_and_duplicates() {
        let mut table = ColorTable::default();
        table
            .insert(ColorRange::single("green", [50, 60, 70], [60, 255, 255]).unwrap())
            .unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get("green").unwrap().boxes[0].lower, [50, 60, 70]);

        let dup = ColorRange::single("x", [0, 0, 0], [1, 1, 1]).unwrap();
        assert!(ColorTable::new(vec![dup.clone(), dup]).is_err());
    }

    #[test]
    fn test_table_json_shape() {
        let table = ColorTable::new(vec![ColorRange::single("blue", [100, 50, 50], [130, 255, 255]).unwrap()]).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["convention"], "native");
        assert_eq!(json["ranges"][0]["name"], "blue");
        let back: ColorTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_table_convention() {
        assert_eq!(ColorTable::default().convention(), HueConvention::SwappedRb);

        // a table written without a convention is read as native
        let table: ColorTable =
            serde_json::from_str(r#"{"ranges": [{"name": "blue", "boxes": [{"lower": [100, 50, 50], "upper": [130, 255, 255]}]}]}"#)
                .unwrap();
        assert_eq!(table.convention(), HueConvention::Native);

        let legacy = serde_json::to_value(ColorTable::default()).unwrap();
        assert_eq!(legacy["convention"], "swapped_rb");
    }

    #[test]
    fn test_box_in_standard_units() {
        let hsv_box: HsvBox =
            serde_json::from_str(r#"{"standard_lower": [200.0, 40.0, 0.0], "standard_upper": [260.0, 100.0, 100.0]}"#)
                .unwrap();
        assert_eq!(hsv_box, HsvBox::new([100, 102, 0], [130, 255, 255]));

        let hsv_box: HsvBox = serde_json::from_str(r#"{"lower": [1, 2, 3], "upper": [4, 5, 6]}"#).unwrap();
        assert_eq!(hsv_box, HsvBox::new([1, 2, 3], [4, 5, 6]));
    }
}
