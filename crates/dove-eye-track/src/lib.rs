//! Single-point tracking across a multi-camera rig.
//!
//! A [`TrackingSession`] owns one [`TrackingAlgorithm`] instance per camera,
//! cloned from a caller-supplied prototype. Each camera is seeded with
//! [`TrackingSession::set_mark`] and then advanced independently by
//! [`TrackingSession::track`]; cameras never see each other's frames or
//! outcomes.
//!
//! [`TemplateTracker`] is the algorithm shipped with the crate.

mod algorithm;
mod error;
mod session;
mod template;

pub use algorithm::TrackingAlgorithm;
pub use error::TrackingError;
pub use session::{TrackState, TrackingSession};
pub use template::{TemplateTracker, TemplateTrackerParams};
