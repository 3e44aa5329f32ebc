use dove_eye_core::Frame;
use nalgebra::Point2;

/// A single-point tracking algorithm for one camera stream.
///
/// Instances may keep private temporal state (templates, motion models, ...).
/// The tracking session creates one instance per camera with
/// [`TrackingAlgorithm::box_clone`] and never shares an instance between
/// cameras.
pub trait TrackingAlgorithm {
    /// Fresh, independent instance with the same configuration.
    fn box_clone(&self) -> Box<dyn TrackingAlgorithm>;

    /// Lock onto the point near `seed` in `frame`.
    ///
    /// Returns the refined position on success. On failure the caller retries
    /// with a later frame.
    fn initialize_tracking(&mut self, frame: &Frame, seed: Point2<f64>) -> Option<Point2<f64>>;

    /// Follow the locked point into `frame`. `None` means the point is lost.
    fn track(&mut self, frame: &Frame) -> Option<Point2<f64>>;
}

impl Clone for Box<dyn TrackingAlgorithm> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
