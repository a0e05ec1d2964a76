//! Message-shaped types shared between the locator and the host node

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point in 3D space (metres)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance from the origin
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Stamp and reference frame attached to outgoing messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub stamp: DateTime<Utc>,
    pub frame_id: String,
}

impl Header {
    pub fn new(stamp: DateTime<Utc>, frame_id: impl Into<String>) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }

    /// Header stamped with the current wall-clock time
    pub fn now(frame_id: impl Into<String>) -> Self {
        Self::new(Utc::now(), frame_id)
    }
}

/// A point with a header, the unit the spotter publishes per candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStamped {
    pub header: Header,
    pub point: Point3,
}

impl PointStamped {
    pub fn new(header: Header, point: Point3) -> Self {
        Self { header, point }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_norm_and_scale() {
        let p = Point3::new(3.0, 4.0, 0.0);
        assert_eq!(p.norm(), 5.0);
        assert_eq!(p.scale(2.0), Point3::new(6.0, 8.0, 0.0));
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point3::default().is_finite());
        assert!(!Point3::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Point3::new(0.0, f64::INFINITY, 0.0).is_finite());
    }

    #[test]
    fn test_point_stamped_json() {
        let msg = PointStamped::new(Header::now("/camera_link"), Point3::new(1.0, -0.5, 0.25));
        let json = serde_json::to_string(&msg).unwrap();
        let back: PointStamped = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.header.frame_id, "/camera_link");
    }
}
