use fo_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbError {
    /// A built distribution breaks one of its invariants.  `zone` is `None`
    /// for checks over a whole time step.
    #[error("{what} violated at zone {zone:?}, step {step}: got {value}")]
    Invariant {
        what:  &'static str,
        zone:  Option<usize>,
        step:  usize,
        value: f64,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type ProbResult<T> = Result<T, ProbError>;
