use fo_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("zone {zone} departs at step {step} but has no destination distribution")]
    NoDestination { zone: usize, step: usize },

    #[error("cannot build {what} distribution for zone {zone} at step {step}: {reason}")]
    Distribution {
        what:   &'static str,
        zone:   usize,
        step:   usize,
        reason: String,
    },

    #[error("step {step} is outside the horizon of {steps} steps")]
    StepOutOfRange { step: usize, steps: usize },

    /// Sampling left `tensor` (`"state"` or `"transition"`) at its default
    /// in the final step.
    #[error("final step {step} left the {tensor} tensor at its default after sampling")]
    StaleFinalStep { step: usize, tensor: &'static str },

    #[error("fleet not conserved: {got} vehicles at the final step, expected {expected}")]
    Conservation { expected: u64, got: u64 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type SampleResult<T> = Result<T, SampleError>;
