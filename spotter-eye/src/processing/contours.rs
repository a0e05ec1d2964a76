//! External contours of a binary mask and the per-contour geometry

use crate::error::Result;
use opencv::core::{Mat, Point, Vector};
use opencv::imgproc;
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate (x = column, y = row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Inclusive pixel bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    pub fn contains(&self, p: PixelPoint) -> bool {
        self.min_x <= p.x && p.x <= self.max_x && self.min_y <= p.y && p.y <= self.max_y
    }
}

/// Geometry of one contour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    pub bbox: BoundingBox,
    /// Mean of the contour's points, truncated. Not the area centroid: for
    /// non-convex blobs the two differ.
    pub centroid: PixelPoint,
    pub point_count: usize,
}

pub type Contours = Vector<Vector<Point>>;

/// Outer boundaries only; holes inside a blob are ignored
pub fn external_contours(mask: &Mat) -> Result<Contours> {
    let mut contours = Contours::new();
    imgproc::find_contours(
        mask,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;
    Ok(contours)
}

/// Bounding box and point-mean centroid, `None` for an empty contour
pub fn describe<I>(points: I) -> Option<Blob>
where
    I: IntoIterator<Item = Point>,
{
    let mut count = 0usize;
    let (mut sum_x, mut sum_y) = (0i64, 0i64);
    let mut bbox = BoundingBox {
        min_x: i32::MAX,
        min_y: i32::MAX,
        max_x: i32::MIN,
        max_y: i32::MIN,
    };

    for p in points {
        count += 1;
        sum_x += i64::from(p.x);
        sum_y += i64::from(p.y);
        bbox.min_x = bbox.min_x.min(p.x);
        bbox.min_y = bbox.min_y.min(p.y);
        bbox.max_x = bbox.max_x.max(p.x);
        bbox.max_y = bbox.max_y.max(p.y);
    }

    if count == 0 {
        return None;
    }

    let centroid = PixelPoint {
        x: (sum_x as f64 / count as f64) as i32,
        y: (sum_y as f64 / count as f64) as i32,
    };

    Some(Blob {
        bbox,
        centroid,
        point_count: count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mat_from_bytes;
    use opencv::core::CV_8UC1;
    use opencv::prelude::*;

    fn mask_with_rects(width: usize, height: usize, rects: &[(usize, usize, usize, usize)]) -> Mat {
        let mut bytes = vec![0u8; width * height];
        for &(x0, y0, x1, y1) in rects {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    bytes[y * width + x] = 255;
                }
            }
        }
        mat_from_bytes(height as i32, width as i32, CV_8UC1, &bytes).unwrap()
    }

    #[test]
    fn test_describe_rectangle_corners() {
        let blob = describe([
            Point::new(10, 20),
            Point::new(10, 29),
            Point::new(19, 29),
            Point::new(19, 20),
        ])
        .unwrap();
        assert_eq!(blob.bbox, BoundingBox { min_x: 10, min_y: 20, max_x: 19, max_y: 29 });
        assert_eq!(blob.centroid, PixelPoint { x: 14, y: 24 });
        assert_eq!(blob.point_count, 4);
        assert_eq!(blob.bbox.width(), 10);
    }

    #[test]
    fn test_describe_empty() {
        assert!(describe(Vec::<Point>::new()).is_none());
    }

    #[test]
    fn test_point_mean_differs_from_area_centroid() {
        // L shape traced by its corners: the point mean is pulled toward the
        // corner cluster rather than the filled area
        let blob = describe([
            Point::new(0, 0),
            Point::new(0, 9),
            Point::new(9, 9),
            Point::new(9, 8),
            Point::new(1, 8),
            Point::new(1, 0),
        ])
        .unwrap();
        assert_eq!(blob.centroid, PixelPoint { x: 3, y: 5 });
    }

    #[test]
    fn test_external_contours_ignore_holes() {
        let mut mask = mask_with_rects(40, 40, &[(5, 5, 30, 30)]);
        // punch a hole
        for y in 12..20 {
            for x in 12..20 {
                *mask.at_2d_mut::<u8>(y, x).unwrap() = 0;
            }
        }
        let contours = external_contours(&mask).unwrap();
        assert_eq!(contours.len(), 1);

        let blob = describe(contours.get(0).unwrap().iter()).unwrap();
        assert_eq!(blob.bbox, BoundingBox { min_x: 5, min_y: 5, max_x: 30, max_y: 30 });
    }

    #[test]
    fn test_external_contours_separate_blobs() {
        let mask = mask_with_rects(60, 30, &[(2, 2, 10, 10), (30, 5, 50, 20)]);
        let contours = external_contours(&mask).unwrap();
        assert_eq!(contours.len(), 2);

        let mut boxes: Vec<BoundingBox> = contours
            .iter()
            .filter_map(|c| describe(c.iter()))
            .map(|b| b.bbox)
            .collect();
        boxes.sort_by_key(|b| b.min_x);
        assert_eq!(boxes[0], BoundingBox { min_x: 2, min_y: 2, max_x: 10, max_y: 10 });
        assert_eq!(boxes[1], BoundingBox { min_x: 30, min_y: 5, max_x: 50, max_y: 20 });
    }

    #[test]
    fn test_empty_mask_has_no_contours() {
        let mask = mask_with_rects(10, 10, &[]);
        assert_eq!(external_contours(&mask).unwrap().len(), 0);
    }
}
