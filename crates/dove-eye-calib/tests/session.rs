use dove_eye_calib::{
    CalibrationSession, CalibrationSolver, CalibrationState, CameraIntrinsics, ImagePoints,
    ImageSize, ObjectPoints, PairExtrinsics, PatternDetector, SingleCalibration,
    StereoCalibration,
};
use dove_eye_core::{Frame, Frameset, GrayImage, GrayImageView, Parameter, Parameters};
use nalgebra::{Matrix3, Point2, Point3, Vector3};
use std::cell::{Cell, RefCell};

const VISIBLE: u8 = 255;
const HIDDEN: u8 = 0;

/// Reports the pattern whenever the first pixel of the image is bright.
#[derive(Default)]
struct BrightPixelDetector {
    calls: Cell<usize>,
}

impl PatternDetector for BrightPixelDetector {
    fn detect(&self, image: &GrayImageView<'_>) -> Option<ImagePoints> {
        self.calls.set(self.calls.get() + 1);
        (image.data.first() == Some(&VISIBLE)).then(|| {
            vec![
                Point2::new(10.0, 10.0),
                Point2::new(20.0, 10.0),
                Point2::new(10.0, 20.0),
            ]
        })
    }

    fn object_points(&self) -> ObjectPoints {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StereoCall {
    samples: usize,
    focal1: f64,
    focal2: f64,
}

/// Solver returning camera matrices whose focal length encodes the solve order.
#[derive(Default)]
struct RecordingSolver {
    single: Vec<(usize, ImageSize)>,
    stereo: Vec<StereoCall>,
}

impl CalibrationSolver for RecordingSolver {
    fn calibrate_single(
        &mut self,
        object_points: &[ObjectPoints],
        image_points: &[ImagePoints],
        image_size: ImageSize,
    ) -> SingleCalibration {
        assert_eq!(object_points.len(), image_points.len());
        self.single.push((image_points.len(), image_size));
        let focal = 100.0 * self.single.len() as f64;
        SingleCalibration {
            intrinsics: CameraIntrinsics {
                camera_matrix: Matrix3::new(focal, 0.0, 4.0, 0.0, focal, 3.0, 0.0, 0.0, 1.0),
                distortion: vec![0.0; 5],
            },
            reprojection_error: 0.25,
        }
    }

    fn calibrate_stereo(
        &mut self,
        object_points: &[ObjectPoints],
        image_points1: &[ImagePoints],
        image_points2: &[ImagePoints],
        intrinsics1: &CameraIntrinsics,
        intrinsics2: &CameraIntrinsics,
    ) -> StereoCalibration {
        assert_eq!(object_points.len(), image_points1.len());
        assert_eq!(image_points1.len(), image_points2.len());
        self.stereo.push(StereoCall {
            samples: image_points1.len(),
            focal1: intrinsics1.camera_matrix[(0, 0)],
            focal2: intrinsics2.camera_matrix[(0, 0)],
        });
        StereoCalibration {
            extrinsics: PairExtrinsics {
                rotation: Matrix3::identity(),
                translation: Vector3::new(self.stereo.len() as f64, 0.0, 0.0),
                fundamental: Matrix3::zeros(),
            },
            reprojection_error: 0.5,
        }
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn params(frames: i64, skip: i64) -> Parameters {
    Parameters::default()
        .with(Parameter::CalibrationFrames, frames)
        .and_then(|p| p.with(Parameter::CalibrationSkip, skip))
        .expect("valid params")
}

/// Build a frameset from per-camera slots: `None` is an invalid slot,
/// `Some(true)` a frame showing the pattern, `Some(false)` a frame without it.
fn frameset(slots: &[Option<bool>]) -> Frameset {
    slots
        .iter()
        .map(|slot| {
            slot.map(|visible| {
                let value = if visible { VISIBLE } else { HIDDEN };
                Frame::new(0.0, GrayImage::filled(64, 48, value))
            })
        })
        .collect()
}

fn all_visible(arity: usize) -> Frameset {
    frameset(&vec![Some(true); arity])
}

#[test]
fn skip_policy_runs_detection_on_every_third_call() {
    let detector = BrightPixelDetector::default();
    let params = params(100, 2);
    let mut session = CalibrationSession::new(1, &detector, &params, RecordingSolver::default())
        .expect("session");
    let fs = all_visible(1);

    let mut detected_on = Vec::new();
    for call in 0..9 {
        let before = detector.calls.get();
        session.measure_frameset(&fs);
        if detector.calls.get() > before {
            detected_on.push(call);
        }
    }
    assert_eq!(detected_on, vec![0, 3, 6]);
    assert_eq!(session.frames_seen(), 9);
}

#[test]
fn skipped_calls_return_previous_result() {
    let detector = BrightPixelDetector::default();
    let params = params(1, 1);
    let mut session = CalibrationSession::new(1, &detector, &params, RecordingSolver::default())
        .expect("session");

    // Call 0 is processed and completes the single-camera rig.
    assert!(session.measure_frameset(&all_visible(1)));
    // Call 1 is skipped, the prior `true` is reported without detection.
    let calls = detector.calls.get();
    assert!(session.measure_frameset(&frameset(&[None])));
    assert_eq!(detector.calls.get(), calls);
}

#[test]
fn camera_collects_until_threshold_then_solves_once() {
    init_logging();
    let detector = BrightPixelDetector::default();
    let params = params(3, 0);
    let mut session = CalibrationSession::new(1, &detector, &params, RecordingSolver::default())
        .expect("session");
    let fs = all_visible(1);

    assert_eq!(session.camera_state(0), CalibrationState::Uninitialized);
    session.measure_frameset(&fs);
    assert_eq!(session.camera_state(0), CalibrationState::Collecting);
    assert!((session.camera_progress(0) - 1.0 / 3.0).abs() < 1e-12);
    session.measure_frameset(&fs);
    assert_eq!(session.camera_state(0), CalibrationState::Collecting);
    assert!(session.solver().single.is_empty());
    session.measure_frameset(&fs);
    assert_eq!(session.camera_state(0), CalibrationState::Ready);
    assert_eq!(
        session.solver().single,
        vec![(
            3,
            ImageSize {
                width: 64,
                height: 48
            }
        )]
    );

    // Further frames never trigger another solve.
    for _ in 0..5 {
        session.measure_frameset(&fs);
    }
    assert_eq!(session.solver().single.len(), 1);
    assert_eq!(session.camera_progress(0), 1.0);
}

#[test]
fn missed_detections_do_not_advance_progress() {
    let detector = BrightPixelDetector::default();
    let params = params(2, 0);
    let mut session = CalibrationSession::new(1, &detector, &params, RecordingSolver::default())
        .expect("session");

    session.measure_frameset(&frameset(&[Some(false)]));
    assert_eq!(session.camera_state(0), CalibrationState::Uninitialized);
    assert_eq!(session.camera_progress(0), 0.0);

    session.measure_frameset(&frameset(&[Some(true)]));
    session.measure_frameset(&frameset(&[Some(false)]));
    assert_eq!(session.camera_state(0), CalibrationState::Collecting);
    assert_eq!(session.camera_progress(0), 0.5);
}

#[test]
fn pair_waits_for_both_cameras() {
    init_logging();
    let detector = BrightPixelDetector::default();
    let params = params(2, 0);
    let mut session = CalibrationSession::new(2, &detector, &params, RecordingSolver::default())
        .expect("session");

    // Only camera 0 sees the pattern: camera 0 gets ready, the pair must not start.
    for _ in 0..4 {
        assert!(!session.measure_frameset(&frameset(&[Some(true), Some(false)])));
        assert_eq!(session.pair_state(0), CalibrationState::Uninitialized);
    }
    assert_eq!(session.camera_state(0), CalibrationState::Ready);
    assert_eq!(session.camera_state(1), CalibrationState::Uninitialized);

    // Camera 1 collects its first sample; still one camera short.
    session.measure_frameset(&all_visible(2));
    assert_eq!(session.camera_state(1), CalibrationState::Collecting);
    assert_eq!(session.pair_state(0), CalibrationState::Uninitialized);

    // Camera 1 is solved on this frameset and the pair takes its first sample.
    assert!(!session.measure_frameset(&all_visible(2)));
    assert_eq!(session.camera_state(1), CalibrationState::Ready);
    assert_eq!(session.pair_state(0), CalibrationState::Collecting);
    assert_eq!(session.pair_progress(0), 0.5);

    assert!(session.measure_frameset(&all_visible(2)));
    assert_eq!(session.pair_state(0), CalibrationState::Ready);
    assert_eq!(
        session.solver().stereo,
        vec![StereoCall {
            samples: 2,
            focal1: 100.0,
            focal2: 200.0
        }]
    );
}

#[test]
fn pair_needs_simultaneous_detection() {
    let detector = BrightPixelDetector::default();
    let params = params(1, 0);
    let mut session = CalibrationSession::new(2, &detector, &params, RecordingSolver::default())
        .expect("session");

    // Each camera is solved on its own frameset; the pair sees no joint view yet.
    session.measure_frameset(&frameset(&[Some(true), Some(false)]));
    session.measure_frameset(&frameset(&[Some(false), Some(true)]));
    assert_eq!(session.camera_state(0), CalibrationState::Ready);
    assert_eq!(session.camera_state(1), CalibrationState::Ready);
    assert_eq!(session.pair_state(0), CalibrationState::Uninitialized);

    // Pattern visible in one view only: no pair sample.
    session.measure_frameset(&frameset(&[Some(true), Some(false)]));
    assert_eq!(session.pair_state(0), CalibrationState::Uninitialized);

    assert!(session.measure_frameset(&all_visible(2)));
    assert_eq!(session.pair_state(0), CalibrationState::Ready);
}

#[test]
fn invalid_slots_hold_readiness() {
    let detector = BrightPixelDetector::default();
    let params = params(1, 0);
    let mut session = CalibrationSession::new(3, &detector, &params, RecordingSolver::default())
        .expect("session");

    assert!(session.measure_frameset(&all_visible(3)));
    assert!(session.is_complete());

    // A fully calibrated rig stays complete even when frames go missing.
    assert!(session.measure_frameset(&frameset(&[None, None, None])));
    assert!(session.measure_frameset(&frameset(&[Some(false), None, Some(true)])));
    assert_eq!(session.solver().single.len(), 3);
    assert_eq!(session.solver().stereo.len(), 3);
}

#[test]
fn invalid_slot_blocks_pair_sample() {
    let detector = BrightPixelDetector::default();
    let params = params(1, 0);
    let mut session = CalibrationSession::new(3, &detector, &params, RecordingSolver::default())
        .expect("session");

    // Camera 2 never delivers a frame.
    assert!(!session.measure_frameset(&frameset(&[Some(true), Some(true), None])));
    assert_eq!(session.camera_state(2), CalibrationState::Uninitialized);
    let pairs: Vec<_> = session.pairs().collect();
    assert_eq!((pairs[0].cam1, pairs[0].cam2), (0, 1));
    assert_eq!(session.pair_state(0), CalibrationState::Ready);
    assert_eq!(session.pair_state(1), CalibrationState::Uninitialized);
    assert_eq!(session.pair_state(2), CalibrationState::Uninitialized);
    assert!(session.calibration_data().is_none());
}

#[test]
fn progress_is_monotonic_and_bounded() {
    let detector = BrightPixelDetector::default();
    let params = params(4, 1);
    let mut session = CalibrationSession::new(3, &detector, &params, RecordingSolver::default())
        .expect("session");

    let pattern = [
        [Some(true), Some(false), None],
        [Some(true), Some(true), Some(true)],
        [None, Some(true), Some(true)],
    ];
    let mut previous = session.progress();
    for step in 0..80 {
        let fs = frameset(&pattern[step % pattern.len()]);
        session.measure_frameset(&fs);
        let current = session.progress();
        for (before, after) in previous
            .cameras
            .iter()
            .zip(&current.cameras)
            .chain(previous.pairs.iter().zip(&current.pairs))
        {
            assert!((0.0..=1.0).contains(after));
            assert!(after >= before, "progress regressed at step {step}");
        }
        previous = current;
    }
    assert!(previous.is_complete());
    assert!(session.is_complete());
}

#[test]
fn ready_pair_never_reverts() {
    let detector = BrightPixelDetector::default();
    let params = params(1, 0);
    let mut session = CalibrationSession::new(2, &detector, &params, RecordingSolver::default())
        .expect("session");
    assert!(session.measure_frameset(&all_visible(2)));
    for slots in [
        [Some(false), Some(false)],
        [None, Some(true)],
        [Some(true), Some(true)],
    ] {
        assert!(session.measure_frameset(&frameset(&slots)));
        assert_eq!(session.pair_state(0), CalibrationState::Ready);
    }
    assert_eq!(session.solver().stereo.len(), 1);
}

#[test]
fn calibration_data_bundles_all_results() {
    let detector = BrightPixelDetector::default();
    let params = params(1, 0);
    let mut session = CalibrationSession::new(3, &detector, &params, RecordingSolver::default())
        .expect("session");
    assert!(session.measure_frameset(&all_visible(3)));

    let data = session.calibration_data().expect("complete");
    assert_eq!(data.arity(), 3);
    assert_eq!(data.pairs.len(), 3);
    assert_eq!(data.cameras[2].camera_matrix[(0, 0)], 300.0);
    assert_eq!(data.pair(2, 1).map(|p| p.baseline()), Some(3.0));
    assert_eq!(session.pair_reprojection_error(1), Some(0.5));

    let json = serde_json::to_string(&data).expect("serialize");
    assert!(json.contains("camera_matrix"));
}

#[test]
fn reset_rereads_thresholds_and_clears_everything() {
    init_logging();
    let detector = BrightPixelDetector::default();
    let params = RefCell::new(params(1, 0));
    let mut session = CalibrationSession::new(2, &detector, &params, RecordingSolver::default())
        .expect("session");
    assert!(session.measure_frameset(&all_visible(2)));
    assert!(session.calibration_data().is_some());

    params
        .borrow_mut()
        .set(Parameter::CalibrationFrames, 2)
        .expect("set");
    session.reset().expect("reset");

    assert_eq!(session.frames_to_collect(), 2);
    assert_eq!(session.frames_seen(), 0);
    assert!(!session.is_complete());
    assert!(session.calibration_data().is_none());
    for cam in 0..2 {
        assert_eq!(session.camera_state(cam), CalibrationState::Uninitialized);
        assert_eq!(session.camera_progress(cam), 0.0);
        assert!(session.camera_intrinsics(cam).is_none());
    }
    assert_eq!(session.pair_state(0), CalibrationState::Uninitialized);
    assert!(session.pair_extrinsics(0).is_none());

    // New threshold applies: one frame is no longer enough.
    assert!(!session.measure_frameset(&all_visible(2)));
    assert_eq!(session.camera_state(0), CalibrationState::Collecting);
}

#[test]
fn reset_mid_collection_restarts_sample_counts() {
    let detector = BrightPixelDetector::default();
    let params = params(3, 0);
    let mut session = CalibrationSession::new(2, &detector, &params, RecordingSolver::default())
        .expect("session");

    // Cameras solve on the third frameset, which also gives the pair its first
    // sample; the fourth adds a second one.
    for _ in 0..4 {
        assert!(!session.measure_frameset(&all_visible(2)));
    }
    assert_eq!(session.camera_state(0), CalibrationState::Ready);
    assert_eq!(session.pair_state(0), CalibrationState::Collecting);
    assert_eq!(session.pair_progress(0), 2.0 / 3.0);
    assert!(session.solver().stereo.is_empty());

    session.reset().expect("reset");
    assert_eq!(session.pair_progress(0), 0.0);

    session.measure_frameset(&all_visible(2));
    assert_eq!(session.camera_progress(0), 1.0 / 3.0);
    assert_eq!(session.camera_progress(1), 1.0 / 3.0);
    assert_eq!(session.pair_state(0), CalibrationState::Uninitialized);

    session.measure_frameset(&all_visible(2));
    session.measure_frameset(&all_visible(2));
    assert_eq!(session.pair_progress(0), 1.0 / 3.0);
    session.measure_frameset(&all_visible(2));
    assert!(session.measure_frameset(&all_visible(2)));

    let single: Vec<usize> = session.solver().single.iter().map(|(n, _)| *n).collect();
    assert_eq!(single, vec![3, 3, 3, 3]);
    let stereo: Vec<usize> = session.solver().stereo.iter().map(|c| c.samples).collect();
    assert_eq!(stereo, vec![3]);
}

#[test]
fn invalid_parameters_are_rejected() {
    struct Broken;
    impl dove_eye_core::ParameterSource for Broken {
        fn get(&self, param: Parameter) -> i64 {
            match param {
                Parameter::CalibrationFrames => 0,
                Parameter::CalibrationSkip => 0,
            }
        }
    }

    let detector = BrightPixelDetector::default();
    let res = CalibrationSession::new(2, &detector, &Broken, RecordingSolver::default());
    assert!(matches!(
        res,
        Err(dove_eye_calib::CalibrationError::Parameter(_))
    ));
}

#[test]
#[should_panic(expected = "frameset arity")]
fn frameset_arity_mismatch_panics() {
    let detector = BrightPixelDetector::default();
    let params = params(1, 0);
    let mut session = CalibrationSession::new(2, &detector, &params, RecordingSolver::default())
        .expect("session");
    session.measure_frameset(&all_visible(3));
}
