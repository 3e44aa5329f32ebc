//! Calibrate and track on a synthetic three-camera rig.
//!
//! The "pattern" is a bright square; the toy solver derives a focal length
//! from its apparent size. Run with
//! `cargo run -p dove-eye --example synthetic_rig`.

use dove_eye::calib::{
    CameraIntrinsics, ImagePoints, ImageSize, ObjectPoints, PairExtrinsics, SingleCalibration,
    StereoCalibration,
};
use dove_eye::core::GrayImageView;
use dove_eye::nalgebra::{Matrix3, Point2, Point3, Vector3};
use dove_eye::{
    CalibrationSession, CalibrationSolver, Frame, Frameset, GrayImage, Parameter, Parameters,
    PatternDetector, TemplateTracker, TrackingSession,
};
use log::LevelFilter;

const WIDTH: usize = 96;
const HEIGHT: usize = 72;
const ARITY: usize = 3;

/// Finds the bounding box corners of all pixels above a threshold.
struct SquareDetector;

impl PatternDetector for SquareDetector {
    fn detect(&self, image: &GrayImageView<'_>) -> Option<ImagePoints> {
        let mut min = (usize::MAX, usize::MAX);
        let mut max = (0, 0);
        for y in 0..image.height {
            for x in 0..image.width {
                if image.data[y * image.width + x] > 200 {
                    min = (min.0.min(x), min.1.min(y));
                    max = (max.0.max(x), max.1.max(y));
                }
            }
        }
        if min.0 > max.0 {
            return None;
        }
        let (x0, y0, x1, y1) = (min.0 as f32, min.1 as f32, max.0 as f32, max.1 as f32);
        Some(vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ])
    }

    fn object_points(&self) -> ObjectPoints {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }
}

/// Focal length from the mean apparent square width, identity rotation,
/// translation along x by the camera index difference.
struct ToySolver;

impl CalibrationSolver for ToySolver {
    fn calibrate_single(
        &mut self,
        _object_points: &[ObjectPoints],
        image_points: &[ImagePoints],
        image_size: ImageSize,
    ) -> SingleCalibration {
        let widths: f64 = image_points
            .iter()
            .map(|pts| f64::from(pts[1].x - pts[0].x))
            .sum();
        let focal = 10.0 * widths / image_points.len() as f64;
        let (cx, cy) = (image_size.width as f64 / 2.0, image_size.height as f64 / 2.0);
        SingleCalibration {
            intrinsics: CameraIntrinsics {
                camera_matrix: Matrix3::new(focal, 0.0, cx, 0.0, focal, cy, 0.0, 0.0, 1.0),
                distortion: vec![0.0; 5],
            },
            reprojection_error: 0.1,
        }
    }

    fn calibrate_stereo(
        &mut self,
        _object_points: &[ObjectPoints],
        image_points1: &[ImagePoints],
        image_points2: &[ImagePoints],
        _intrinsics1: &CameraIntrinsics,
        _intrinsics2: &CameraIntrinsics,
    ) -> StereoCalibration {
        let shift = f64::from(image_points2[0][0].x - image_points1[0][0].x);
        StereoCalibration {
            extrinsics: PairExtrinsics {
                rotation: Matrix3::identity(),
                translation: Vector3::new(shift / 10.0, 0.0, 0.0),
                fundamental: Matrix3::zeros(),
            },
            reprojection_error: 0.2,
        }
    }
}

/// Frame with a bright square at `(x, y)`, or a dark frame when `None`.
fn square_frame(t: f64, at: Option<(usize, usize)>) -> Frame {
    let image = GrayImage::from_fn(WIDTH, HEIGHT, |x, y| match at {
        Some((sx, sy)) if (sx..sx + 12).contains(&x) && (sy..sy + 12).contains(&y) => 255,
        _ => 30,
    });
    Frame::new(t, image)
}

fn blob_frame(t: f64, cx: f64, cy: f64) -> Frame {
    let image = GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let d2 = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
        (20.0 + 200.0 * (-d2 / 18.0).exp()) as u8
    });
    Frame::new(t, image)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let params = Parameters::default()
        .with(Parameter::CalibrationFrames, 4)?
        .with(Parameter::CalibrationSkip, 1)?;
    let detector = SquareDetector;
    let mut session = CalibrationSession::new(ARITY, &detector, &params, ToySolver)?;

    let mut step = 0usize;
    while !session.is_complete() {
        let t = step as f64 / 30.0;
        // Camera 2 sees the pattern only every third step.
        let frameset: Frameset = (0..ARITY)
            .map(|cam| {
                let visible = cam < 2 || step % 3 == 0;
                let at = visible.then_some((10 + 8 * cam + step % 20, 20 + step % 10));
                Some(square_frame(t, at))
            })
            .collect();
        session.measure_frameset(&frameset);
        step += 1;
        if step % 10 == 0 {
            println!("step {step:>3}: {:.0}% done", 100.0 * session.progress().overall());
        }
    }
    println!("calibrated after {step} framesets");

    if let Some(data) = session.calibration_data() {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }

    let mut tracking = TrackingSession::new(ARITY, &TemplateTracker::default())?;
    for cam in 0..ARITY {
        tracking.set_mark(cam, Point2::new(40.0 + 4.0 * cam as f64, 36.0), false);
    }
    for k in 0..10 {
        let t = k as f64 / 30.0;
        let frameset: Frameset = (0..ARITY)
            .map(|cam| {
                let x = 40.0 + 4.0 * cam as f64 + k as f64;
                Some(blob_frame(t, x, 36.0 - 0.5 * k as f64))
            })
            .collect();
        let positions = tracking.track(&frameset);
        let line: Vec<String> = positions
            .iter()
            .map(|p| p.map_or("-".to_string(), |p| format!("({:.2}, {:.2})", p.x, p.y)))
            .collect();
        println!("t = {t:.3}: {}", line.join("  "));
    }
    Ok(())
}
