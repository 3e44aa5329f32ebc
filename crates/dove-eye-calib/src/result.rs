use dove_eye_core::{pair_index, CameraIndex};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Intrinsic parameters of one camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// 3x3 pinhole camera matrix `K`.
    pub camera_matrix: Matrix3<f64>,
    /// Lens distortion coefficients, solver-defined layout (e.g. `k1 k2 p1 p2 k3`).
    pub distortion: Vec<f64>,
}

/// Relative pose of a camera pair: `x2 = R * x1 + t`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairExtrinsics {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// Fundamental matrix mapping points of the first camera to epipolar lines
    /// of the second.
    pub fundamental: Matrix3<f64>,
}

impl PairExtrinsics {
    /// Distance between the two camera centers, in pattern units.
    #[inline]
    pub fn baseline(&self) -> f64 {
        self.translation.norm()
    }
}

/// Complete calibration of a rig.
///
/// `pairs[k]` belongs to the camera pair with canonical index `k`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub cameras: Vec<CameraIntrinsics>,
    pub pairs: Vec<PairExtrinsics>,
}

impl CalibrationData {
    #[inline]
    pub fn arity(&self) -> usize {
        self.cameras.len()
    }

    /// Extrinsics of the unordered pair `{a, b}`.
    pub fn pair(&self, a: CameraIndex, b: CameraIndex) -> Option<&PairExtrinsics> {
        pair_index(a, b, self.arity()).and_then(|index| self.pairs.get(index))
    }
}

/// Snapshot of per-camera and per-pair progress, each value in `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProgress {
    pub cameras: Vec<f64>,
    pub pairs: Vec<f64>,
}

impl CalibrationProgress {
    /// Mean of all camera and pair progress values (1.0 for an empty rig).
    pub fn overall(&self) -> f64 {
        let count = self.cameras.len() + self.pairs.len();
        if count == 0 {
            return 1.0;
        }
        let sum: f64 = self.cameras.iter().chain(self.pairs.iter()).sum();
        sum / count as f64
    }

    pub fn is_complete(&self) -> bool {
        self.cameras.iter().chain(self.pairs.iter()).all(|p| *p >= 1.0)
    }
}
