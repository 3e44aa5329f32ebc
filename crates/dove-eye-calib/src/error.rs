use dove_eye_core::ParameterError;

/// Errors returned when building or resetting a calibration session.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("a rig needs at least one camera")]
    ZeroArity,
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}
