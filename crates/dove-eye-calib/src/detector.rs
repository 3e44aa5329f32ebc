use dove_eye_core::GrayImageView;
use nalgebra::{Point2, Point3};

/// Detected pattern points in image coordinates, ordered like [`ObjectPoints`].
pub type ImagePoints = Vec<Point2<f32>>;

/// Pattern points in the pattern's own metric frame.
pub type ObjectPoints = Vec<Point3<f32>>;

/// Calibration pattern detector.
///
/// Implementations wrap a concrete target detector (chessboard, ChArUco,
/// circle grid, ...). The session only relies on this contract:
/// - `detect` returns `None` when the full pattern is not visible,
/// - a successful detection has one image point per object point, in the same
///   order as [`PatternDetector::object_points`].
pub trait PatternDetector {
    fn detect(&self, image: &GrayImageView<'_>) -> Option<ImagePoints>;

    fn object_points(&self) -> ObjectPoints;
}
