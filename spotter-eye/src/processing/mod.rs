//! Segmentation pipeline stages

pub mod contours;
pub mod depth;
pub mod mask;

pub use contours::{Blob, BoundingBox, PixelPoint};
