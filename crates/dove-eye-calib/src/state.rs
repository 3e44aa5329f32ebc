use crate::{CameraIntrinsics, ImagePoints, PairExtrinsics};
use dove_eye_core::CameraPair;
use serde::{Deserialize, Serialize};

/// Acquisition state of one camera or one camera pair.
///
/// Within a session the state only moves forward:
/// `Uninitialized -> Collecting -> Ready`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationState {
    #[default]
    Uninitialized,
    Collecting,
    Ready,
}

/// Progress value for a state with `collected` of `threshold` samples.
pub(crate) fn progress(state: CalibrationState, collected: usize, threshold: usize) -> f64 {
    match state {
        CalibrationState::Uninitialized => 0.0,
        CalibrationState::Collecting => (collected as f64 / threshold as f64).min(1.0),
        CalibrationState::Ready => 1.0,
    }
}

#[derive(Debug, Default)]
pub(crate) struct CameraRecord {
    pub state: CalibrationState,
    pub samples: Vec<ImagePoints>,
    pub intrinsics: Option<CameraIntrinsics>,
    pub reprojection_error: Option<f64>,
}

impl CameraRecord {
    /// Intrinsics, only once the camera is `Ready`.
    #[inline]
    pub fn ready_intrinsics(&self) -> Option<&CameraIntrinsics> {
        match self.state {
            CalibrationState::Ready => self.intrinsics.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct PairRecord {
    pub pair: CameraPair,
    pub state: CalibrationState,
    // Lockstep buffers: samples_first[k] and samples_second[k] were detected in
    // the same frameset.
    pub samples_first: Vec<ImagePoints>,
    pub samples_second: Vec<ImagePoints>,
    pub extrinsics: Option<PairExtrinsics>,
    pub reprojection_error: Option<f64>,
}

impl PairRecord {
    pub fn new(pair: CameraPair) -> Self {
        Self {
            pair,
            state: CalibrationState::Uninitialized,
            samples_first: Vec::new(),
            samples_second: Vec::new(),
            extrinsics: None,
            reprojection_error: None,
        }
    }

    #[inline]
    pub fn collected(&self) -> usize {
        self.samples_first.len()
    }

    pub fn push(&mut self, first: ImagePoints, second: ImagePoints) {
        self.samples_first.push(first);
        self.samples_second.push(second);
        debug_assert_eq!(self.samples_first.len(), self.samples_second.len());
    }
}
