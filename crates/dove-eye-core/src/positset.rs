use crate::CameraIndex;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Per-camera 2D positions for one capture instant.
///
/// Values and validity are stored separately: a slot may hold a position that
/// is not (or no longer) valid, e.g. a user-supplied seed that the tracker has
/// not confirmed yet. Readers should go through [`Positset::get`], which hides
/// invalid slots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Positset {
    positions: Vec<Point2<f64>>,
    valid: Vec<bool>,
}

impl Positset {
    /// Positset with `arity` invalid slots at the origin.
    pub fn new(arity: usize) -> Self {
        Self {
            positions: vec![Point2::origin(); arity],
            valid: vec![false; arity],
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.positions.len()
    }

    /// Position of camera `cam` if the slot is valid.
    #[inline]
    pub fn get(&self, cam: CameraIndex) -> Option<Point2<f64>> {
        self.valid[cam].then_some(self.positions[cam])
    }

    /// Stored position regardless of validity.
    #[inline]
    pub fn raw(&self, cam: CameraIndex) -> Point2<f64> {
        self.positions[cam]
    }

    #[inline]
    pub fn is_valid(&self, cam: CameraIndex) -> bool {
        self.valid[cam]
    }

    /// Store `position` in slot `cam` without touching its validity.
    #[inline]
    pub fn set_position(&mut self, cam: CameraIndex, position: Point2<f64>) {
        self.positions[cam] = position;
    }

    #[inline]
    pub fn set_valid(&mut self, cam: CameraIndex, valid: bool) {
        self.valid[cam] = valid;
    }

    /// Iterate over all slots, `None` for invalid ones.
    pub fn iter(&self) -> impl Iterator<Item = Option<Point2<f64>>> + '_ {
        (0..self.arity()).map(|cam| self.get(cam))
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }
}
