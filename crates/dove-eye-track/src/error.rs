/// Errors returned when building a tracking session.
#[derive(thiserror::Error, Debug)]
pub enum TrackingError {
    #[error("a rig needs at least one camera")]
    ZeroArity,
}
