//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while stepping an oscillator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    /// A fixed step was rejected by the driver. Aborts the rest of the run.
    #[error("Step {step} failed at t={time}: {reason}")]
    StepFailure {
        step: usize,
        time: f64,
        reason: String,
    },

    #[error("Numeric error: {message}")]
    Numeric { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<osc_core::CoreError> for SimError {
    fn from(e: osc_core::CoreError) -> Self {
        match e {
            osc_core::CoreError::InvalidArg { what } => SimError::InvalidArg { what },
            other => SimError::Numeric {
                message: other.to_string(),
            },
        }
    }
}
