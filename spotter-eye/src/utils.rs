//! Moving pixel data between frames and OpenCV matrices

use crate::error::{Result, VisionError};
use crate::frame::ColorFrame;
use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::prelude::*;

/// Allocate a matrix of the given type and copy `bytes` into it
pub fn mat_from_bytes(rows: i32, cols: i32, typ: i32, bytes: &[u8]) -> Result<Mat> {
    if rows <= 0 || cols <= 0 {
        return Err(VisionError::Frame("Matrix dimensions must be positive".to_string()));
    }

    let mut mat = Mat::new_rows_cols_with_default(rows, cols, typ, Scalar::all(0.0))?;
    let dst = mat.data_bytes_mut()?;
    if dst.len() != bytes.len() {
        return Err(VisionError::Frame(format!(
            "Matrix holds {} bytes but {} were supplied",
            dst.len(),
            bytes.len()
        )));
    }
    dst.copy_from_slice(bytes);
    Ok(mat)
}

/// Copy a color frame into an 8-bit, 3-channel matrix (channel order unchanged)
pub fn frame_to_mat(frame: &ColorFrame) -> Result<Mat> {
    mat_from_bytes(frame.height() as i32, frame.width() as i32, CV_8UC3, frame.data())
}

/// Raw bytes of a matrix, row-major
pub fn mat_to_bytes(mat: &Mat) -> Result<Vec<u8>> {
    if mat.empty() {
        return Ok(Vec::new());
    }
    if !mat.is_continuous() {
        return Err(VisionError::Processing("Matrix is not continuous".to_string()));
    }
    Ok(mat.data_bytes()?.to_vec())
}
