//! High-level facade crate for the `dove-eye-*` workspace.
//!
//! A multi-camera rig is handled through two independent sessions, both fed
//! with synchronized [`Frameset`]s:
//! - [`CalibrationSession`] collects pattern detections per camera and per
//!   camera pair and solves intrinsics and pairwise extrinsics once enough
//!   samples are available.
//! - [`TrackingSession`] follows one user-marked point in every camera.
//!
//! ## Quickstart
//!
//! ```no_run
//! use dove_eye::{Parameter, ParameterSource, Parameters, TemplateTracker, TrackingSession};
//! use dove_eye::nalgebra::Point2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = Parameters::load_json("rig_params.json")?;
//! let frames = params.get(Parameter::CalibrationFrames);
//! println!("collecting {frames} frames per camera");
//!
//! let mut tracking = TrackingSession::new(2, &TemplateTracker::default())?;
//! tracking.set_mark(0, Point2::new(320.0, 240.0), false);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dove_eye::core`: framesets, positsets, camera pairs, images, parameters.
//! - `dove_eye::calib`: detector/solver capabilities and the calibration session.
//! - `dove_eye::track`: tracking capability, tracking session, template tracker.

pub use dove_eye_calib as calib;
pub use dove_eye_core as core;
pub use dove_eye_track as track;
pub use nalgebra;

pub use dove_eye_calib::{
    CalibrationData, CalibrationError, CalibrationSession, CalibrationSolver, CalibrationState,
    PatternDetector,
};
pub use dove_eye_core::{
    CameraIndex, CameraPair, Frame, Frameset, GrayImage, Parameter, ParameterSource, Parameters,
    Positset,
};
pub use dove_eye_track::{
    TemplateTracker, TrackState, TrackingAlgorithm, TrackingError, TrackingSession,
};

/// Default filter for [`init_tracing`]: session events at `info`, everything
/// else at `warn`.
#[cfg(feature = "tracing")]
pub const DEFAULT_TRACING_FILTER: &str = "warn,dove_eye_calib=info,dove_eye_track=info";

/// Route `log` records and session spans to stderr.
///
/// The filter is read from `RUST_LOG` and falls back to
/// [`DEFAULT_TRACING_FILTER`]. Closing `measure_frameset` / `track` spans are
/// reported with their busy time, which gives per-frameset timings for both
/// sessions. A logger or subscriber installed earlier wins; later calls are
/// no-ops.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACING_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    // try_init also tries to install a LogTracer; that part fails harmlessly
    // once the bridge above is in place.
    let _ = if json {
        builder.json().with_current_span(true).finish().try_init()
    } else {
        builder.with_target(true).finish().try_init()
    };
}
