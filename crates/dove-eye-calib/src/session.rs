//! Calibration session: per-camera and per-pair acquisition state machines.

use crate::state::{progress, CameraRecord, PairRecord};
use crate::{
    CalibrationData, CalibrationError, CalibrationProgress, CalibrationSolver, CalibrationState,
    CameraIntrinsics, PairExtrinsics, PatternDetector,
};
use dove_eye_core::{
    CameraIndex, CameraPair, Frameset, PairIndex, Parameter, ParameterSource,
};
use log::{debug, info, trace};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Drives intrinsic and pairwise stereo calibration of a rig.
///
/// The detector and the parameter source are borrowed for the session's
/// lifetime; the solver is owned. Every call runs to completion synchronously
/// and `&mut self` serializes calls on one instance.
pub struct CalibrationSession<'a, S> {
    arity: usize,
    detector: &'a dyn PatternDetector,
    params: &'a dyn ParameterSource,
    solver: S,
    cameras: Vec<CameraRecord>,
    pairs: Vec<PairRecord>,
    frames_to_collect: usize,
    frames_skip: usize,
    frame_no: u64,
    last_result: bool,
}

impl<'a, S: CalibrationSolver> CalibrationSession<'a, S> {
    /// Create a session for `arity` cameras.
    ///
    /// Fails when `arity == 0` or when `CALIBRATION_FRAMES` /
    /// `CALIBRATION_SKIP` are out of range.
    pub fn new(
        arity: usize,
        detector: &'a dyn PatternDetector,
        params: &'a dyn ParameterSource,
        solver: S,
    ) -> Result<Self, CalibrationError> {
        if arity == 0 {
            return Err(CalibrationError::ZeroArity);
        }

        let mut session = Self {
            arity,
            detector,
            params,
            solver,
            cameras: Vec::new(),
            pairs: Vec::new(),
            frames_to_collect: 0,
            frames_skip: 0,
            frame_no: 0,
            last_result: false,
        };
        session.reset()?;
        Ok(session)
    }

    /// Restart the session: re-read thresholds, zero the frame counter, drop all
    /// samples and results and return every camera and pair to `Uninitialized`.
    ///
    /// On error the session is left untouched.
    pub fn reset(&mut self) -> Result<(), CalibrationError> {
        let frames_to_collect = self.params.get_checked(Parameter::CalibrationFrames)? as usize;
        let frames_skip = self.params.get_checked(Parameter::CalibrationSkip)? as usize;

        self.frames_to_collect = frames_to_collect;
        self.frames_skip = frames_skip;
        self.frame_no = 0;
        self.last_result = false;
        self.cameras = (0..self.arity).map(|_| CameraRecord::default()).collect();
        self.pairs = CameraPair::generate_array(self.arity)
            .into_iter()
            .map(PairRecord::new)
            .collect();

        debug!(
            "calibration reset: arity={} frames={} skip={}",
            self.arity, self.frames_to_collect, self.frames_skip
        );
        Ok(())
    }

    /// Feed one synchronized frameset.
    ///
    /// Only every `(CALIBRATION_SKIP + 1)`-th call does detection work; the
    /// others return the previous result unchanged. Returns `true` once every
    /// camera and every pair is calibrated.
    ///
    /// # Panics
    ///
    /// Panics if `frameset.arity()` differs from the session arity.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frameset), fields(frame_no = self.frame_no))
    )]
    pub fn measure_frameset(&mut self, frameset: &Frameset) -> bool {
        assert_eq!(
            frameset.arity(),
            self.arity,
            "frameset arity does not match the calibration session"
        );

        let frame_no = self.frame_no;
        self.frame_no += 1;
        if frame_no % (self.frames_skip as u64 + 1) != 0 {
            trace!("frame {frame_no} skipped");
            return self.last_result;
        }

        for cam in 0..self.arity {
            self.measure_camera(cam, frameset);
        }
        // Runs after the camera pass so a camera solved on this frameset can
        // already contribute a pair sample.
        for index in 0..self.pairs.len() {
            self.measure_pair(index, frameset);
        }

        self.last_result = self.is_complete();
        self.last_result
    }

    fn measure_camera(&mut self, cam: CameraIndex, frameset: &Frameset) {
        let record = &mut self.cameras[cam];
        if record.state == CalibrationState::Ready {
            return;
        }
        let Some(frame) = frameset.get(cam) else {
            return;
        };

        if let Some(points) = self.detector.detect(&frame.image.view()) {
            record.samples.push(points);
            record.state = CalibrationState::Collecting;
            trace!(
                "camera {cam}: sample {}/{}",
                record.samples.len(),
                self.frames_to_collect
            );
        }

        if record.samples.len() < self.frames_to_collect {
            return;
        }

        let object_points = vec![self.detector.object_points(); record.samples.len()];
        let solved =
            self.solver
                .calibrate_single(&object_points, &record.samples, frame.image.size().into());
        debug!(
            "camera {cam} calibrated, reprojection error {:.4}",
            solved.reprojection_error
        );

        record.intrinsics = Some(solved.intrinsics);
        record.reprojection_error = Some(solved.reprojection_error);
        record.state = CalibrationState::Ready;
        record.samples = Vec::new();
        info!("camera {cam} ready");
    }

    fn measure_pair(&mut self, index: PairIndex, frameset: &Frameset) {
        let record = &mut self.pairs[index];
        if record.state == CalibrationState::Ready {
            return;
        }
        let CameraPair { cam1, cam2, .. } = record.pair;
        let (Some(intrinsics1), Some(intrinsics2)) = (
            self.cameras[cam1].ready_intrinsics(),
            self.cameras[cam2].ready_intrinsics(),
        ) else {
            return;
        };
        let (Some(frame1), Some(frame2)) = (frameset.get(cam1), frameset.get(cam2)) else {
            return;
        };

        let Some(points1) = self.detector.detect(&frame1.image.view()) else {
            return;
        };
        let Some(points2) = self.detector.detect(&frame2.image.view()) else {
            return;
        };
        record.push(points1, points2);
        record.state = CalibrationState::Collecting;
        trace!(
            "pair ({cam1}, {cam2}): sample {}/{}",
            record.collected(),
            self.frames_to_collect
        );

        if record.collected() < self.frames_to_collect {
            return;
        }

        debug!("calibrating pair ({cam1}, {cam2})");
        let object_points = vec![self.detector.object_points(); record.collected()];
        let solved = self.solver.calibrate_stereo(
            &object_points,
            &record.samples_first,
            &record.samples_second,
            intrinsics1,
            intrinsics2,
        );
        debug!(
            "pair ({cam1}, {cam2}) calibrated, reprojection error {:.4}",
            solved.reprojection_error
        );

        record.extrinsics = Some(solved.extrinsics);
        record.reprojection_error = Some(solved.reprojection_error);
        record.state = CalibrationState::Ready;
        record.samples_first = Vec::new();
        record.samples_second = Vec::new();
        info!("pair ({cam1}, {cam2}) ready");
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Canonical pair list of this rig.
    pub fn pairs(&self) -> impl ExactSizeIterator<Item = CameraPair> + '_ {
        self.pairs.iter().map(|record| record.pair)
    }

    /// Active `CALIBRATION_FRAMES` threshold.
    #[inline]
    pub fn frames_to_collect(&self) -> usize {
        self.frames_to_collect
    }

    /// Active `CALIBRATION_SKIP` value.
    #[inline]
    pub fn frames_skip(&self) -> usize {
        self.frames_skip
    }

    /// Number of `measure_frameset` calls since construction or the last reset.
    #[inline]
    pub fn frames_seen(&self) -> u64 {
        self.frame_no
    }

    /// # Panics
    ///
    /// Panics if `cam >= self.arity()`.
    pub fn camera_state(&self, cam: CameraIndex) -> CalibrationState {
        self.camera(cam).state
    }

    /// # Panics
    ///
    /// Panics if `index` is not a valid pair index.
    pub fn pair_state(&self, index: PairIndex) -> CalibrationState {
        self.pair(index).state
    }

    /// Fraction of camera `cam`'s calibration done, in `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `cam >= self.arity()`.
    pub fn camera_progress(&self, cam: CameraIndex) -> f64 {
        let record = self.camera(cam);
        progress(record.state, record.samples.len(), self.frames_to_collect)
    }

    /// Fraction of pair `index`'s calibration done, in `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid pair index.
    pub fn pair_progress(&self, index: PairIndex) -> f64 {
        let record = self.pair(index);
        progress(record.state, record.collected(), self.frames_to_collect)
    }

    /// Progress of every camera and pair.
    pub fn progress(&self) -> CalibrationProgress {
        CalibrationProgress {
            cameras: (0..self.arity).map(|cam| self.camera_progress(cam)).collect(),
            pairs: (0..self.pairs.len()).map(|index| self.pair_progress(index)).collect(),
        }
    }

    /// Whether every camera and every pair is `Ready`.
    pub fn is_complete(&self) -> bool {
        self.cameras
            .iter()
            .all(|c| c.state == CalibrationState::Ready)
            && self
                .pairs
                .iter()
                .all(|p| p.state == CalibrationState::Ready)
    }

    /// Intrinsics of camera `cam` once it is calibrated.
    pub fn camera_intrinsics(&self, cam: CameraIndex) -> Option<&CameraIntrinsics> {
        self.camera(cam).ready_intrinsics()
    }

    /// Extrinsics of pair `index` once it is calibrated.
    pub fn pair_extrinsics(&self, index: PairIndex) -> Option<&PairExtrinsics> {
        let record = self.pair(index);
        match record.state {
            CalibrationState::Ready => record.extrinsics.as_ref(),
            _ => None,
        }
    }

    /// Reprojection error reported by camera `cam`'s solve.
    pub fn camera_reprojection_error(&self, cam: CameraIndex) -> Option<f64> {
        self.camera(cam).reprojection_error
    }

    /// Reprojection error reported by pair `index`'s solve.
    pub fn pair_reprojection_error(&self, index: PairIndex) -> Option<f64> {
        self.pair(index).reprojection_error
    }

    /// Full rig calibration, available once [`Self::is_complete`] holds.
    pub fn calibration_data(&self) -> Option<CalibrationData> {
        let cameras = (0..self.arity)
            .map(|cam| self.camera_intrinsics(cam).cloned())
            .collect::<Option<Vec<_>>>()?;
        let pairs = (0..self.pairs.len())
            .map(|index| self.pair_extrinsics(index).cloned())
            .collect::<Option<Vec<_>>>()?;
        Some(CalibrationData { cameras, pairs })
    }

    /// Solver owned by the session.
    #[inline]
    pub fn solver(&self) -> &S {
        &self.solver
    }

    fn camera(&self, cam: CameraIndex) -> &CameraRecord {
        assert!(
            cam < self.arity,
            "camera index {cam} out of range for arity {}",
            self.arity
        );
        &self.cameras[cam]
    }

    fn pair(&self, index: PairIndex) -> &PairRecord {
        assert!(
            index < self.pairs.len(),
            "pair index {index} out of range ({} pairs)",
            self.pairs.len()
        );
        &self.pairs[index]
    }
}
