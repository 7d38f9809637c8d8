use thiserror::Error;

/// Failures surfaced by the pipeline controller.
///
/// None of these are fatal to the process; the caller restarts through
/// the control surface.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("frame source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("could not read frame {frame_index} from source")]
    SourceReadFailure { frame_index: usize },
    #[error("camera is not running")]
    CameraOff,
    #[error("display sink failed: {0}")]
    Sink(String),
}

/// Invalid values rejected at the control boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("blur control value must be between {min} and {max}, got {value}")]
    ControlOutOfRange { value: i32, min: i32, max: i32 },
    #[error("blur radius must be an odd integer >= 3, got {0}")]
    InvalidBlurRadius(i32),
}
