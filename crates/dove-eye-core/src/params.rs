//! Named integer options consumed by the sessions, with JSON load/save helpers.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::{fs, path::Path};

/// Errors produced while reading, writing or validating parameters.
#[derive(thiserror::Error, Debug)]
pub enum ParameterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{name} = {value} is out of range (minimum {min})")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
    },
}

/// Option names understood by the sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Parameter {
    /// Number of pattern samples collected before a camera or pair is solved.
    CalibrationFrames,
    /// Frames skipped between two detection attempts.
    CalibrationSkip,
}

impl Parameter {
    pub const ALL: [Parameter; 2] = [Parameter::CalibrationFrames, Parameter::CalibrationSkip];

    /// Name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Parameter::CalibrationFrames => "CALIBRATION_FRAMES",
            Parameter::CalibrationSkip => "CALIBRATION_SKIP",
        }
    }

    pub fn default_value(self) -> i64 {
        match self {
            Parameter::CalibrationFrames => 10,
            Parameter::CalibrationSkip => 5,
        }
    }

    /// Smallest accepted value.
    pub fn min_value(self) -> i64 {
        match self {
            Parameter::CalibrationFrames => 1,
            Parameter::CalibrationSkip => 0,
        }
    }

    /// Check `value` against [`Parameter::min_value`].
    pub fn check(self, value: i64) -> Result<i64, ParameterError> {
        if value < self.min_value() {
            return Err(ParameterError::OutOfRange {
                name: self.name(),
                value,
                min: self.min_value(),
            });
        }
        Ok(value)
    }
}

/// Read access to named options.
///
/// Sessions hold a shared borrow of a source for their whole lifetime and read
/// it at construction and on every `reset()`.
pub trait ParameterSource {
    fn get(&self, param: Parameter) -> i64;

    /// Read `param` and validate it against its minimum.
    fn get_checked(&self, param: Parameter) -> Result<i64, ParameterError> {
        param.check(self.get(param))
    }
}

fn default_frames() -> i64 {
    Parameter::CalibrationFrames.default_value()
}

fn default_skip() -> i64 {
    Parameter::CalibrationSkip.default_value()
}

/// In-memory parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(rename = "CALIBRATION_FRAMES", default = "default_frames")]
    calibration_frames: i64,
    #[serde(rename = "CALIBRATION_SKIP", default = "default_skip")]
    calibration_skip: i64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            calibration_frames: default_frames(),
            calibration_skip: default_skip(),
        }
    }
}

impl Parameters {
    /// Set `param` to `value` after validating it.
    pub fn set(&mut self, param: Parameter, value: i64) -> Result<(), ParameterError> {
        let value = param.check(value)?;
        match param {
            Parameter::CalibrationFrames => self.calibration_frames = value,
            Parameter::CalibrationSkip => self.calibration_skip = value,
        }
        Ok(())
    }

    /// Builder-style [`Parameters::set`].
    pub fn with(mut self, param: Parameter, value: i64) -> Result<Self, ParameterError> {
        self.set(param, value)?;
        Ok(self)
    }

    /// Validate every option.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for param in Parameter::ALL {
            self.get_checked(param)?;
        }
        Ok(())
    }

    /// Load parameters from a JSON file; missing options take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ParameterError> {
        let raw = fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&raw)?;
        params.validate()?;
        Ok(params)
    }

    /// Write these parameters to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ParameterError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl ParameterSource for Parameters {
    fn get(&self, param: Parameter) -> i64 {
        match param {
            Parameter::CalibrationFrames => self.calibration_frames,
            Parameter::CalibrationSkip => self.calibration_skip,
        }
    }
}

impl<P: ParameterSource> ParameterSource for RefCell<P> {
    fn get(&self, param: Parameter) -> i64 {
        self.borrow().get(param)
    }
}
