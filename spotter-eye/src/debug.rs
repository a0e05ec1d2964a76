//! Debug imagery produced when the locator runs with `debug` enabled

use crate::error::Result;
use crate::frame::PixelOrder;
use crate::processing::contours::{Blob, Contours};
use crate::utils::mat_from_bytes;
use opencv::core::{self, Mat, Point, Rect, Scalar, CV_8UC1, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

/// Images describing one locate call
pub struct DebugImages {
    /// Union of every cleaned color mask (mono8)
    pub mask_union: Mat,
    /// Input frame with filled contours, centroids and bounding boxes drawn,
    /// in the input's channel order
    pub annotated: Mat,
    /// Hue channel of the HSV conversion (mono8)
    pub hue: Mat,
}

fn scalar_for(order: PixelOrder, rgb: [u8; 3]) -> Scalar {
    let [r, g, b] = rgb.map(f64::from);
    match order {
        PixelOrder::Rgb8 => Scalar::new(r, g, b, 0.0),
        PixelOrder::Bgr8 => Scalar::new(b, g, r, 0.0),
    }
}

pub(crate) struct DebugCanvas {
    order: PixelOrder,
    mask_union: Mat,
    annotated: Mat,
}

impl DebugCanvas {
    pub(crate) fn new(frame: &Mat, order: PixelOrder) -> Result<Self> {
        Ok(Self {
            order,
            mask_union: Mat::new_rows_cols_with_default(frame.rows(), frame.cols(), CV_8UC1, Scalar::all(0.0))?,
            annotated: frame.try_clone()?,
        })
    }

    pub(crate) fn add_mask(&mut self, mask: &Mat) -> Result<()> {
        let mut union = Mat::default();
        core::bitwise_or(&self.mask_union, mask, &mut union, &Mat::default())?;
        self.mask_union = union;
        Ok(())
    }

    pub(crate) fn draw_blob(&mut self, contours: &Contours, index: i32, fill: [u8; 3], blob: &Blob) -> Result<()> {
        let black = Scalar::all(0.0);

        imgproc::draw_contours(
            &mut self.annotated,
            contours,
            index,
            scalar_for(self.order, fill),
            imgproc::FILLED,
            imgproc::LINE_8,
            &Mat::default(),
            i32::MAX,
            Point::new(0, 0),
        )?;
        imgproc::circle(
            &mut self.annotated,
            Point::new(blob.centroid.x, blob.centroid.y),
            5,
            black,
            2,
            imgproc::LINE_8,
            0,
        )?;
        imgproc::rectangle(
            &mut self.annotated,
            Rect::new(blob.bbox.min_x, blob.bbox.min_y, blob.bbox.width(), blob.bbox.height()),
            black,
            2,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }

    pub(crate) fn finish(self, hsv: &Mat) -> Result<DebugImages> {
        let mut hue = Mat::default();
        core::extract_channel(hsv, &mut hue, 0)?;
        Ok(DebugImages {
            mask_union: self.mask_union,
            annotated: self.annotated,
            hue,
        })
    }
}

/// Hue/saturation chart at full value: 255 rows (saturation) by 180
/// columns (hue), converted to `order`. Handy when tuning thresholds.
pub fn hsv_scale_image(order: PixelOrder) -> Result<Mat> {
    const ROWS: usize = 255;
    const COLS: usize = 180;

    let mut bytes = Vec::with_capacity(ROWS * COLS * 3);
    for saturation in 0..ROWS {
        for hue in 0..COLS {
            bytes.extend_from_slice(&[hue as u8, saturation as u8, 255]);
        }
    }
    let hsv = mat_from_bytes(ROWS as i32, COLS as i32, CV_8UC3, &bytes)?;

    let code = match order {
        PixelOrder::Rgb8 => imgproc::COLOR_HSV2RGB,
        PixelOrder::Bgr8 => imgproc::COLOR_HSV2BGR,
    };
    let mut chart = Mat::default();
    imgproc::cvt_color(&hsv, &mut chart, code, 0)?;
    Ok(chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mat_to_bytes;

    #[test]
    fn test_hsv_scale_image_shape() {
        let chart = hsv_scale_image(PixelOrder::Rgb8).unwrap();
        assert_eq!(chart.rows(), 255);
        assert_eq!(chart.cols(), 180);
        assert_eq!(chart.channels(), 3);

        // zero saturation row is white
        let bytes = mat_to_bytes(&chart).unwrap();
        assert_eq!(&bytes[..3], &[255, 255, 255]);
    }

    #[test]
    fn test_hsv_scale_image_order() {
        let rgb = mat_to_bytes(&hsv_scale_image(PixelOrder::Rgb8).unwrap()).unwrap();
        let bgr = mat_to_bytes(&hsv_scale_image(PixelOrder::Bgr8).unwrap()).unwrap();
        // last row, hue 0: saturated red
        let idx = (254 * 180) * 3;
        assert_eq!(rgb[idx], bgr[idx + 2]);
        assert!(rgb[idx] > 250);
        assert!(rgb[idx + 2] < 5);
    }

    #[test]
    fn test_scalar_for_order() {
        assert_eq!(scalar_for(PixelOrder::Rgb8, [1, 2, 3]), Scalar::new(1.0, 2.0, 3.0, 0.0));
        assert_eq!(scalar_for(PixelOrder::Bgr8, [1, 2, 3]), Scalar::new(3.0, 2.0, 1.0, 0.0));
    }
}
