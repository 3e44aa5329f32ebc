//! Core types for multi-camera rig calibration and tracking.
//!
//! This crate is intentionally small. It does *not* depend on any concrete
//! camera source, pattern detector or numeric solver; those are plugged in by
//! the session crates (`dove-eye-calib`, `dove-eye-track`) through traits.

mod camera_pair;
mod frame;
mod image;
mod params;
mod positset;

/// Index of one camera stream in the rig, in `[0, arity)`.
pub type CameraIndex = usize;

/// Index of one unordered camera pair, in `[0, pairity(arity))`.
pub type PairIndex = usize;

pub use camera_pair::{pair_index, pairity, CameraPair};
pub use frame::{Frame, Frameset, Timestamp};
pub use image::{sample_bilinear, GrayImage, GrayImageView};
pub use params::{Parameter, ParameterError, ParameterSource, Parameters};
pub use positset::Positset;
