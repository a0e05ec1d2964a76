//! HSV conversion, thresholding and mask cleanup

use crate::color::{ColorRange, HsvBox, HueConvention};
use crate::config::MorphologyConfig;
use crate::error::Result;
use crate::frame::PixelOrder;
use opencv::core::{self, Mat, Point, Scalar, Size, CV_8UC1};
use opencv::imgproc;
use opencv::prelude::*;

/// Convert an 8-bit color matrix to 8-bit HSV under a table's hue convention
pub fn to_hsv(color: &Mat, order: PixelOrder, convention: HueConvention) -> Result<Mat> {
    let code = match (order, convention) {
        (PixelOrder::Rgb8, HueConvention::Native) | (PixelOrder::Bgr8, HueConvention::SwappedRb) => {
            imgproc::COLOR_RGB2HSV
        }
        (PixelOrder::Bgr8, HueConvention::Native) | (PixelOrder::Rgb8, HueConvention::SwappedRb) => {
            imgproc::COLOR_BGR2HSV
        }
    };
    let mut hsv = Mat::default();
    imgproc::cvt_color(color, &mut hsv, code, 0)?;
    Ok(hsv)
}

fn box_bounds(hsv_box: &HsvBox) -> (Scalar, Scalar) {
    let [hl, sl, vl] = hsv_box.lower;
    let [hu, su, vu] = hsv_box.upper;
    (
        Scalar::new(f64::from(hl), f64::from(sl), f64::from(vl), 0.0),
        Scalar::new(f64::from(hu), f64::from(su), f64::from(vu), 0.0),
    )
}

/// Binary mask (0 / 255) of pixels inside any of the range's boxes
pub fn color_mask(hsv: &Mat, range: &ColorRange) -> Result<Mat> {
    let mut mask = Mat::new_rows_cols_with_default(hsv.rows(), hsv.cols(), CV_8UC1, Scalar::all(0.0))?;

    for hsv_box in &range.boxes {
        let (lower, upper) = box_bounds(hsv_box);
        let mut part = Mat::default();
        core::in_range(hsv, &lower, &upper, &mut part)?;

        let mut union = Mat::default();
        core::bitwise_or(&mask, &part, &mut union, &Mat::default())?;
        mask = union;
    }

    Ok(mask)
}

/// Morphological opening with a square structuring element
pub fn open(mask: &Mat, morphology: &MorphologyConfig) -> Result<Mat> {
    if morphology.iterations == 0 {
        return Ok(mask.try_clone()?);
    }

    let size = morphology.kernel_size as i32;
    let kernel = imgproc::get_structuring_element(
        imgproc::MORPH_RECT,
        Size::new(size, size),
        Point::new(-1, -1),
    )?;

    let mut opened = Mat::default();
    imgproc::morphology_ex(
        mask,
        &mut opened,
        imgproc::MORPH_OPEN,
        &kernel,
        Point::new(-1, -1),
        morphology.iterations as i32,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;
    Ok(opened)
}

/// Threshold then open, the mask contours are extracted from
pub fn cleaned_mask(hsv: &Mat, range: &ColorRange, morphology: &MorphologyConfig) -> Result<Mat> {
    let raw = color_mask(hsv, range)?;
    open(&raw, morphology)
}
