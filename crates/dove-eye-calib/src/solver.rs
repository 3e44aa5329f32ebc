use crate::{CameraIntrinsics, ImagePoints, ObjectPoints, PairExtrinsics};
use serde::{Deserialize, Serialize};

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl From<(usize, usize)> for ImageSize {
    fn from((width, height): (usize, usize)) -> Self {
        Self { width, height }
    }
}

/// Output of a single-camera solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleCalibration {
    pub intrinsics: CameraIntrinsics,
    /// RMS reprojection error in pixels.
    pub reprojection_error: f64,
}

/// Output of a stereo solve with fixed intrinsics.
#[derive(Clone, Debug, PartialEq)]
pub struct StereoCalibration {
    pub extrinsics: PairExtrinsics,
    /// RMS reprojection error in pixels.
    pub reprojection_error: f64,
}

/// Numeric calibration routines.
///
/// Both methods receive one entry per collected sample; `object_points[k]`
/// corresponds to `image_points[k]` point by point. The session calls each
/// routine exactly once per camera or pair and does not inspect the result
/// beyond storing it, so a degenerate solve is the implementation's concern.
pub trait CalibrationSolver {
    /// Estimate camera matrix and distortion from `image_points`.
    fn calibrate_single(
        &mut self,
        object_points: &[ObjectPoints],
        image_points: &[ImagePoints],
        image_size: ImageSize,
    ) -> SingleCalibration;

    /// Estimate the pose of the second camera relative to the first, keeping
    /// both intrinsics fixed.
    fn calibrate_stereo(
        &mut self,
        object_points: &[ObjectPoints],
        image_points1: &[ImagePoints],
        image_points2: &[ImagePoints],
        intrinsics1: &CameraIntrinsics,
        intrinsics2: &CameraIntrinsics,
    ) -> StereoCalibration;
}
