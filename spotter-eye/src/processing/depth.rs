//! Depth lookup around a pixel

use crate::error::{Result, VisionError};
use crate::frame::DepthFrame;
use crate::processing::contours::PixelPoint;

/// Mean of the valid samples in rows `[y - r, y + r)` and columns
/// `[x - r, x + r)`, clipped to the frame. Non-finite samples are skipped;
/// if none remain the pixel has no usable depth.
pub fn window_mean(depth: &DepthFrame, center: PixelPoint, radius: u32) -> Result<f64> {
    let r = i64::from(radius);
    let clip = |lo: i64, hi: i64, len: u32| -> (usize, usize) {
        let len = i64::from(len);
        (lo.clamp(0, len) as usize, hi.clamp(0, len) as usize)
    };
    let (x0, x1) = clip(i64::from(center.x) - r, i64::from(center.x) + r, depth.width());
    let (y0, y1) = clip(i64::from(center.y) - r, i64::from(center.y) + r, depth.height());

    let width = depth.width() as usize;
    let data = depth.data();
    let mut sum = 0.0f64;
    let mut count = 0usize;

    for y in y0..y1 {
        let row = &data[y * width + x0..y * width + x1];
        for &sample in row.iter().filter(|s| s.is_finite()) {
            sum += f64::from(sample);
            count += 1;
        }
    }

    if count == 0 {
        return Err(VisionError::AllDepthInvalid {
            x: center.x,
            y: center.y,
        });
    }

    Ok(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32) -> PixelPoint {
        PixelPoint { x, y }
    }

    #[test]
    fn test_uniform_depth() {
        let depth = DepthFrame::filled(100, 100, 2.0).unwrap();
        assert_eq!(window_mean(&depth, at(50, 50), 10).unwrap(), 2.0);
    }

    #[test]
    fn test_invalid_samples_ignored() {
        let mut depth = DepthFrame::filled(100, 100, f32::NAN).unwrap();
        depth.fill_rect(45, 45, 46, 46, 1.0);
        depth.fill_rect(50, 50, 51, 51, 3.0);
        depth.fill_rect(52, 52, 52, 52, f32::INFINITY);
        assert_eq!(window_mean(&depth, at(50, 50), 10).unwrap(), 2.0);
    }

    #[test]
    fn test_window_is_half_open() {
        let mut depth = DepthFrame::filled(100, 100, f32::NAN).unwrap();
        // row/column center + r is outside the window
        depth.fill_rect(60, 50, 60, 50, 5.0);
        depth.fill_rect(50, 60, 50, 60, 5.0);
        assert!(window_mean(&depth, at(50, 50), 10).is_err());

        depth.fill_rect(40, 40, 40, 40, 4.0);
        assert_eq!(window_mean(&depth, at(50, 50), 10).unwrap(), 4.0);
    }

    #[test]
    fn test_zero_depth_is_valid() {
        let depth = DepthFrame::filled(20, 20, 0.0).unwrap();
        assert_eq!(window_mean(&depth, at(10, 10), 10).unwrap(), 0.0);
    }

    #[test]
    fn test_all_invalid() {
        let depth = DepthFrame::filled(30, 30, f32::NAN).unwrap();
        match window_mean(&depth, at(3, 4), 10) {
            Err(VisionError::AllDepthInvalid { x, y }) => assert_eq!((x, y), (3, 4)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_window_clipped_at_border() {
        let mut depth = DepthFrame::filled(30, 30, 1.0).unwrap();
        depth.fill_rect(0, 0, 0, 0, 7.0);
        // window [-10, 10) clips to [0, 10): 100 samples, one of them 7.0
        let mean = window_mean(&depth, at(0, 0), 10).unwrap();
        assert!((mean - 1.06).abs() < 1e-9);
    }
}
