//! Incremental calibration of a multi-camera rig.
//!
//! A [`CalibrationSession`] consumes synchronized [`Frameset`]s and drives two
//! families of state machines to completion:
//! - one per camera, collecting pattern detections until the intrinsics can be
//!   solved,
//! - one per unordered camera pair, collecting simultaneous detections once both
//!   member cameras are calibrated, until the pair's relative pose is solved.
//!
//! Pattern detection and the numeric solvers are external capabilities, see
//! [`PatternDetector`] and [`CalibrationSolver`].
//!
//! [`Frameset`]: dove_eye_core::Frameset

mod detector;
mod error;
mod result;
mod session;
mod solver;
mod state;

pub use detector::{ImagePoints, ObjectPoints, PatternDetector};
pub use error::CalibrationError;
pub use result::{CalibrationData, CalibrationProgress, CameraIntrinsics, PairExtrinsics};
pub use session::CalibrationSession;
pub use solver::{CalibrationSolver, ImageSize, SingleCalibration, StereoCalibration};
pub use state::CalibrationState;
