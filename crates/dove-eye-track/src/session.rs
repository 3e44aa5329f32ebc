use crate::{TrackingAlgorithm, TrackingError};
use dove_eye_core::{CameraIndex, Frame, Frameset, Positset};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tracking lifecycle of one camera.
///
/// `Uninitialized -> MarkSet -> Tracking -> Lost`. `Lost` is left only through
/// a new [`TrackingSession::set_mark`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackState {
    #[default]
    Uninitialized,
    MarkSet,
    Tracking,
    Lost,
}

struct CameraTracker {
    state: TrackState,
    algorithm: Box<dyn TrackingAlgorithm>,
}

/// Tracks one marked point independently in every camera of the rig.
///
/// The session owns its per-camera algorithm instances and the output
/// [`Positset`], which persists across calls: a slot keeps its last value until
/// it is overwritten or invalidated.
pub struct TrackingSession {
    cameras: Vec<CameraTracker>,
    positions: Positset,
}

impl TrackingSession {
    /// Create a session for `arity` cameras, cloning `prototype` once per camera.
    pub fn new(arity: usize, prototype: &dyn TrackingAlgorithm) -> Result<Self, TrackingError> {
        if arity == 0 {
            return Err(TrackingError::ZeroArity);
        }
        let cameras = (0..arity)
            .map(|_| CameraTracker {
                state: TrackState::Uninitialized,
                algorithm: prototype.box_clone(),
            })
            .collect();
        Ok(Self {
            cameras,
            positions: Positset::new(arity),
        })
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.cameras.len()
    }

    /// Seed camera `cam` with `mark`.
    ///
    /// The seed is a hint: the output slot stays invalid until the algorithm
    /// locks onto it in [`TrackingSession::track`].
    ///
    /// # Panics
    ///
    /// Panics if `cam` is out of range or if `project_other` is set;
    /// propagating a seed to the other cameras is not supported.
    pub fn set_mark(&mut self, cam: CameraIndex, mark: Point2<f64>, project_other: bool) {
        self.check_camera(cam);
        assert!(
            !project_other,
            "projecting a mark to other cameras is not supported"
        );

        self.positions.set_position(cam, mark);
        self.positions.set_valid(cam, false);
        self.cameras[cam].state = TrackState::MarkSet;
        debug!("camera {cam}: mark set at ({:.2}, {:.2})", mark.x, mark.y);
    }

    /// Advance every camera with its own frame and return the updated positions.
    ///
    /// An invalid frame slot leaves that camera untouched for this call.
    ///
    /// # Panics
    ///
    /// Panics if `frameset.arity()` differs from the session arity.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn track(&mut self, frameset: &Frameset) -> &Positset {
        assert_eq!(
            frameset.arity(),
            self.arity(),
            "frameset arity does not match the tracking session"
        );

        for (cam, frame) in frameset.iter().enumerate() {
            if let Some(frame) = frame {
                self.track_single(cam, frame);
            }
        }
        &self.positions
    }

    fn track_single(&mut self, cam: CameraIndex, frame: &Frame) {
        let tracker = &mut self.cameras[cam];
        match tracker.state {
            TrackState::Uninitialized | TrackState::Lost => {}
            TrackState::MarkSet => {
                let seed = self.positions.raw(cam);
                match tracker.algorithm.initialize_tracking(frame, seed) {
                    Some(position) => {
                        self.positions.set_position(cam, position);
                        self.positions.set_valid(cam, true);
                        tracker.state = TrackState::Tracking;
                        debug!("camera {cam}: tracking started");
                    }
                    // Stay in MarkSet and retry on the next frame.
                    None => self.positions.set_valid(cam, false),
                }
            }
            TrackState::Tracking => match tracker.algorithm.track(frame) {
                Some(position) => {
                    self.positions.set_position(cam, position);
                    self.positions.set_valid(cam, true);
                }
                None => {
                    self.positions.set_valid(cam, false);
                    tracker.state = TrackState::Lost;
                    debug!("camera {cam}: track lost");
                }
            },
        }
    }

    /// # Panics
    ///
    /// Panics if `cam` is out of range.
    pub fn track_state(&self, cam: CameraIndex) -> TrackState {
        self.check_camera(cam);
        self.cameras[cam].state
    }

    /// Latest positions of all cameras.
    #[inline]
    pub fn positions(&self) -> &Positset {
        &self.positions
    }

    fn check_camera(&self, cam: CameraIndex) {
        assert!(
            cam < self.arity(),
            "camera index {cam} out of range for arity {}",
            self.arity()
        );
    }
}
