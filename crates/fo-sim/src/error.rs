use fo_model::ModelError;
use fo_prob::ProbError;
use fo_props::PropsError;
use fo_sample::SampleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("probability engine error: {0}")]
    Prob(#[from] ProbError),

    #[error("sampling error: {0}")]
    Sample(#[from] SampleError),

    #[error("aggregation error: {0}")]
    Props(#[from] PropsError),
}

pub type SimResult<T> = Result<T, SimError>;
